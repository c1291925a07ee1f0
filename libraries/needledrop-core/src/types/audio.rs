/// Decoded audio and its layout
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    pub const CD_QUALITY: Self = Self(44_100);

    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Channel layout and rate of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: SampleRate,
    /// Interleaved channels per frame
    pub channels: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: SampleRate, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Interleaved stereo at the given rate, the layout every decoded
    /// buffer uses
    pub fn stereo(sample_rate: SampleRate) -> Self {
        Self::new(sample_rate, 2)
    }
}

/// Fully decoded, ready-to-play audio
///
/// Samples are stored as f32 in the range [-1.0, 1.0], interleaved
/// (`[L, R, L, R, ...]` for stereo).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub format: AudioFormat,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        match self.format.channels {
            0 => 0,
            channels => self.samples.len() / channels as usize,
        }
    }

    /// Playable length at normal speed, zero for a degenerate format
    pub fn duration_secs(&self) -> f64 {
        match self.format.sample_rate.as_hz() {
            0 => 0.0,
            hz => self.frames() as f64 / f64::from(hz),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved sample count
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}
