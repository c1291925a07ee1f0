/// Whole-file audio decoding using Symphonia
use crate::error::{PlaybackError, Result};
use needledrop_core::{AudioBuffer, AudioFormat, SampleRate};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Turns encoded bytes into a playable buffer
pub trait AudioDecoder: Send + Sync {
    /// Decode a complete file
    ///
    /// `extension` is a format hint such as `"mp3"`.
    fn decode(&self, bytes: &[u8], extension: Option<&str>) -> Result<AudioBuffer>;
}

/// Decoder for MP3, OGG, FLAC, WAV and M4A
///
/// Output is always interleaved stereo f32.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], extension: Option<&str>) -> Result<AudioBuffer> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlaybackError::Decode(format!("Failed to probe audio: {e}")))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| PlaybackError::Decode("No audio tracks found".to_string()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::Decode(format!("Failed to create decoder: {e}")))?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(PlaybackError::Decode(format!("Error reading packet: {e}")));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);

                    let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    interleaved.copy_interleaved_ref(decoded);
                    fold_to_stereo(interleaved.samples(), spec.channels.count(), &mut samples);
                }
                // Corrupt frames are common in archive rips
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(error = e, "Skipping undecodable packet");
                }
                Err(e) => return Err(PlaybackError::Decode(format!("Decode error: {e}"))),
            }
        }

        if samples.is_empty() {
            return Err(PlaybackError::Decode("No audio frames decoded".to_string()));
        }

        let sample_rate = SampleRate::new(sample_rate.unwrap_or(44_100));
        let buffer = AudioBuffer::new(samples, AudioFormat::stereo(sample_rate));
        debug!(
            frames = buffer.frames(),
            duration_secs = buffer.duration_secs(),
            "Decoded audio"
        );
        Ok(buffer)
    }
}

/// ITU-R BS.775 coefficient for centre and surround channels (-3 dB)
const CENTER_MIX: f32 = 0.707;

/// Append interleaved frames of any width as interleaved stereo
fn fold_to_stereo(input: &[f32], channels: usize, output: &mut Vec<f32>) {
    match channels {
        0 => {}
        1 => {
            for &sample in input {
                output.push(sample);
                output.push(sample);
            }
        }
        2 => output.extend_from_slice(input),
        _ => {
            // L, R, then centre/LFE/surrounds folded into both sides
            for frame in input.chunks_exact(channels) {
                let mut left = frame[0];
                let mut right = frame[1];
                for (index, &extra) in frame[2..].iter().enumerate() {
                    let mixed = extra * CENTER_MIX;
                    match index {
                        0 | 1 => {
                            left += mixed;
                            right += mixed;
                        }
                        n if n % 2 == 0 => left += mixed,
                        _ => right += mixed,
                    }
                }
                output.push(left.clamp(-1.0, 1.0));
                output.push(right.clamp(-1.0, 1.0));
            }
        }
    }
}

/// Lower-cased file extension of a URL's last path segment
pub(crate) fn extension_hint(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}
