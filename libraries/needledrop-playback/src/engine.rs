//! Audio output abstraction
//!
//! One [`PlaybackNode`] is created per play or seek. A node plays a shared
//! buffer from an offset at a rate, and reports natural completion through
//! an optional callback. Stopping a node may also fire that callback, so
//! callers detach it before any intentional stop.

use crate::error::{PlaybackError, Result};
use needledrop_core::AudioBuffer;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Completion callback attached to a node
pub type EndedCallback = Box<dyn FnMut() + Send>;

/// Single-use playback of one buffer
pub trait PlaybackNode: Send {
    /// Attach or detach (`None`) the completion callback
    fn set_on_ended(&mut self, callback: Option<EndedCallback>);

    /// Change playback rate in place
    fn set_rate(&mut self, rate: f64);

    /// Stop output
    ///
    /// Errors when the node already stopped; callers treat that as done.
    fn stop(&mut self) -> Result<()>;

    /// Release the node from the output graph
    fn disconnect(&mut self);
}

/// Factory for playback nodes
pub trait AudioEngine: Send {
    /// Wake a suspended output device
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    /// Start playing `buffer` from `offset` seconds at `rate`
    fn start(
        &mut self,
        buffer: Arc<AudioBuffer>,
        offset: f64,
        rate: f64,
    ) -> Result<Box<dyn PlaybackNode>>;
}

/// Observable state of one simulated node
#[derive(Default)]
struct NodeState {
    offset: f64,
    rate: f64,
    active: bool,
    connected: bool,
    on_ended: Option<EndedCallback>,
}

fn lock(node: &Mutex<NodeState>) -> MutexGuard<'_, NodeState> {
    node.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Take a node's callback, run it outside the lock, then put it back
fn fire(node: &Mutex<NodeState>) {
    let callback = lock(node).on_ended.take();
    if let Some(mut callback) = callback {
        callback();
        let mut state = lock(node);
        if state.on_ended.is_none() {
            state.on_ended = Some(callback);
        }
    }
}

/// Engine with no audio device
///
/// Nodes behave like browser buffer sources: `stop()` on a running node
/// fires its completion callback, and a second `stop()` is an error. Clones
/// share the same node list, so tests keep one handle and inspect it.
#[derive(Clone, Default)]
pub struct SimulatedEngine {
    nodes: Arc<Mutex<Vec<Arc<Mutex<NodeState>>>>>,
    resumes: Arc<Mutex<usize>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> Vec<Arc<Mutex<NodeState>>> {
        self.nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Nodes created so far
    pub fn started(&self) -> usize {
        self.nodes().len()
    }

    /// Nodes still producing sound
    pub fn active_nodes(&self) -> usize {
        self.nodes()
            .iter()
            .filter(|node| {
                let state = lock(node);
                state.active && state.connected
            })
            .count()
    }

    /// Offset and rate of the most recently started node
    pub fn last_start(&self) -> Option<(f64, f64)> {
        self.nodes().last().map(|node| {
            let state = lock(node);
            (state.offset, state.rate)
        })
    }

    /// Times the output was resumed
    pub fn resumes(&self) -> usize {
        *self.resumes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Let every active node reach the end of its buffer
    pub fn finish_active(&self) {
        for node in self.nodes() {
            let was_active = {
                let mut state = lock(&node);
                std::mem::replace(&mut state.active, false)
            };
            if was_active {
                fire(&node);
            }
        }
    }

    /// Fire every callback still attached, including on stopped nodes
    pub fn fire_all_callbacks(&self) {
        for node in self.nodes() {
            fire(&node);
        }
    }
}

impl AudioEngine for SimulatedEngine {
    fn resume(&mut self) -> Result<()> {
        *self.resumes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn start(
        &mut self,
        _buffer: Arc<AudioBuffer>,
        offset: f64,
        rate: f64,
    ) -> Result<Box<dyn PlaybackNode>> {
        let state = Arc::new(Mutex::new(NodeState {
            offset,
            rate,
            active: true,
            connected: true,
            on_ended: None,
        }));
        self.nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&state));
        Ok(Box::new(SimulatedNode { state }))
    }
}

struct SimulatedNode {
    state: Arc<Mutex<NodeState>>,
}

impl PlaybackNode for SimulatedNode {
    fn set_on_ended(&mut self, callback: Option<EndedCallback>) {
        lock(&self.state).on_ended = callback;
    }

    fn set_rate(&mut self, rate: f64) {
        lock(&self.state).rate = rate;
    }

    fn stop(&mut self) -> Result<()> {
        let was_active = std::mem::replace(&mut lock(&self.state).active, false);
        if !was_active {
            return Err(PlaybackError::Engine("node already stopped".to_string()));
        }
        fire(&self.state);
        Ok(())
    }

    fn disconnect(&mut self) {
        lock(&self.state).connected = false;
    }
}
