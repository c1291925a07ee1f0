//! Audio output through the default cpal device
//!
//! cpal streams are not `Send` on every platform, so a dedicated audio thread
//! owns them and nodes talk to it over a channel. Each node renders its
//! buffer with a fractional cursor; a rate above 1.0 plays faster and higher,
//! like a platter spun at 45.

use crate::engine::{AudioEngine, EndedCallback, PlaybackNode};
use crate::error::{PlaybackError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use needledrop_core::AudioBuffer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

enum Command {
    Start { id: u64, voice: Arc<Voice> },
    Stop { id: u64 },
    Shutdown,
}

/// Shared state between a node handle and its stream callback
struct Voice {
    buffer: Arc<AudioBuffer>,
    /// Read position in source frames
    cursor: Mutex<f64>,
    /// Playback rate as `f64` bits
    rate: AtomicU64,
    stopped: AtomicBool,
    on_ended: Mutex<Option<EndedCallback>>,
}

/// Engine playing through the system's default output device
pub struct CpalEngine {
    commands: Sender<Command>,
    next_id: u64,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalEngine {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::Engine("No output device found".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Engine(e.to_string()))?;
        let device_rate = supported.sample_rate();
        let config = supported.config();

        debug!(
            sample_rate = device_rate,
            channels = config.channels,
            "Opened output device"
        );

        let (commands, command_rx) = bounded::<Command>(32);
        let audio_thread = thread::spawn(move || {
            run_audio_thread(&device, &config, device_rate, &command_rx);
        });

        Ok(Self {
            commands,
            next_id: 0,
            audio_thread: Some(audio_thread),
        })
    }
}

impl AudioEngine for CpalEngine {
    fn start(
        &mut self,
        buffer: Arc<AudioBuffer>,
        offset: f64,
        rate: f64,
    ) -> Result<Box<dyn PlaybackNode>> {
        let source_rate = f64::from(buffer.format.sample_rate.as_hz());
        let voice = Arc::new(Voice {
            cursor: Mutex::new(offset.max(0.0) * source_rate),
            buffer,
            rate: AtomicU64::new(rate.to_bits()),
            stopped: AtomicBool::new(false),
            on_ended: Mutex::new(None),
        });

        self.next_id += 1;
        let id = self.next_id;
        self.commands
            .send(Command::Start {
                id,
                voice: Arc::clone(&voice),
            })
            .map_err(|_| PlaybackError::Engine("Audio thread is gone".to_string()))?;

        Ok(Box::new(CpalNode {
            id,
            voice,
            commands: self.commands.clone(),
        }))
    }
}

impl Drop for CpalEngine {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}

struct CpalNode {
    id: u64,
    voice: Arc<Voice>,
    commands: Sender<Command>,
}

impl PlaybackNode for CpalNode {
    fn set_on_ended(&mut self, callback: Option<EndedCallback>) {
        *self
            .voice
            .on_ended
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = callback;
    }

    fn set_rate(&mut self, rate: f64) {
        self.voice.rate.store(rate.to_bits(), Ordering::Relaxed);
    }

    fn stop(&mut self) -> Result<()> {
        if self.voice.stopped.swap(true, Ordering::AcqRel) {
            return Err(PlaybackError::Engine("node already stopped".to_string()));
        }
        let _ = self.commands.send(Command::Stop { id: self.id });
        Ok(())
    }

    fn disconnect(&mut self) {
        let _ = self.commands.send(Command::Stop { id: self.id });
    }
}

fn run_audio_thread(
    device: &Device,
    config: &StreamConfig,
    device_rate: u32,
    commands: &Receiver<Command>,
) {
    let mut streams: HashMap<u64, Stream> = HashMap::new();
    let channels = usize::from(config.channels);

    while let Ok(command) = commands.recv() {
        match command {
            Command::Start { id, voice } => {
                let callback_voice = Arc::clone(&voice);
                let stream = device.build_output_stream(
                    config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        render(data, &callback_voice, channels, device_rate);
                    },
                    |err| error!(error = %err, "Audio stream error"),
                    None,
                );
                match stream {
                    Ok(stream) => match stream.play() {
                        Ok(()) => {
                            streams.insert(id, stream);
                        }
                        Err(e) => warn!(error = %e, "Failed to start stream"),
                    },
                    Err(e) => warn!(error = %e, "Failed to build stream"),
                }
            }
            Command::Stop { id } => {
                streams.remove(&id);
            }
            Command::Shutdown => break,
        }
    }
}

/// Fill one device callback from the voice's buffer
fn render(output: &mut [f32], voice: &Voice, channels: usize, device_rate: u32) {
    if channels == 0 || voice.stopped.load(Ordering::Acquire) {
        output.fill(0.0);
        return;
    }

    let width = usize::from(voice.buffer.format.channels.max(1));
    let frames = voice.buffer.frames();
    let source_rate = f64::from(voice.buffer.format.sample_rate.as_hz());
    let rate = f64::from_bits(voice.rate.load(Ordering::Relaxed));
    let step = rate * source_rate / f64::from(device_rate.max(1));

    let finished = {
        let mut cursor = voice.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        for frame in output.chunks_mut(channels) {
            let index = *cursor as usize;
            if index >= frames {
                frame.fill(0.0);
                continue;
            }
            let next = (index + 1).min(frames - 1);
            let frac = (*cursor - index as f64) as f32;
            for (channel, sample) in frame.iter_mut().enumerate() {
                let channel = channel.min(width - 1);
                let a = voice.buffer.samples[index * width + channel];
                let b = voice.buffer.samples[next * width + channel];
                *sample = a + (b - a) * frac;
            }
            *cursor += step;
        }
        *cursor as usize >= frames
    };

    if finished && !voice.stopped.swap(true, Ordering::AcqRel) {
        let callback = voice
            .on_ended
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut callback) = callback {
            callback();
        }
    }
}
