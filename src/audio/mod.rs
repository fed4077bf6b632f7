//! DSP helpers shared by the audio tasks.
//!
//! Sample-rate conversion, level metering, and voice activity detection on
//! mono `f32` clips. Nothing here keeps state between clips except the VAD
//! engines, which the caller resets.

/// Sample rate expected by Whisper and by the Earshot detector.
pub const SPEECH_RATE: u32 = 16_000;

#[cfg(feature = "vad_earshot")]
mod earshot_vad;
mod meter;
mod resample;
mod vad;

#[cfg(feature = "vad_earshot")]
pub use earshot_vad::EarshotVad;
pub use meter::{peak_db, rms_db, METER_FLOOR_DB};
pub use resample::{resample, MAX_RATE, MIN_RATE};
pub use vad::{SimpleThresholdVad, VadDecision, VadEngine, VadSmoother};
