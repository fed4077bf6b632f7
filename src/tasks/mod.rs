//! Concrete [`AudioTask`](crate::runner::AudioTask) implementations.
//!
//! Every result carries the timestamp and resolved sample rate the runner
//! handed to the task, so callers can line results up with their clips.

use crate::audio::{resample, MAX_RATE, MIN_RATE, SPEECH_RATE};
use crate::error::InputError;
use anyhow::{bail, Result};

mod any;
mod level;
mod speech;
#[cfg(test)]
mod tests;
#[cfg(feature = "whisper")]
mod transcribe;

pub use any::{AnyTask, TaskOutput};
pub use level::{ClipLevels, LevelMeterTask};
pub use speech::{
    SpeechClassification, SpeechDetectorConfig, SpeechDetectorTask, SpeechLabel, SpeechSegment,
};
#[cfg(feature = "whisper")]
pub use transcribe::{Transcript, TranscriptionConfig, TranscriptionTask};

/// Check a clip for speech recognition and bring it to [`SPEECH_RATE`].
///
/// [`SPEECH_RATE`]: crate::audio::SPEECH_RATE
#[cfg_attr(not(feature = "whisper"), allow(dead_code))]
pub(crate) fn speech_input(audio: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
    if audio.is_empty() {
        return Err(InputError::EmptyClip.into());
    }
    if sample_rate != SPEECH_RATE && !(MIN_RATE..=MAX_RATE).contains(&sample_rate) {
        bail!("cannot resample {sample_rate}Hz audio for speech recognition");
    }
    Ok(resample(audio, sample_rate, SPEECH_RATE))
}

/// Duration of `samples` at `sample_rate`, in milliseconds.
pub(crate) fn samples_to_ms(samples: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    samples as f64 * 1000.0 / sample_rate as f64
}
