use super::samples_to_ms;
use crate::audio::{peak_db, rms_db};
use crate::runner::AudioTask;
use anyhow::Result;
use serde::Serialize;

/// Loudness summary for one clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipLevels {
    pub timestamp_ms: f64,
    pub sample_rate: u32,
    pub samples: usize,
    pub duration_ms: f64,
    pub rms_db: f32,
    pub peak_db: f32,
}

/// Measures RMS and peak level of a clip. Never fails.
#[derive(Debug, Clone, Default)]
pub struct LevelMeterTask;

impl LevelMeterTask {
    pub fn new() -> Self {
        Self
    }
}

impl AudioTask for LevelMeterTask {
    type Output = ClipLevels;

    fn process(
        &mut self,
        audio: &[f32],
        sample_rate: u32,
        timestamp_ms: f64,
    ) -> Result<ClipLevels> {
        Ok(ClipLevels {
            timestamp_ms,
            sample_rate,
            samples: audio.len(),
            duration_ms: samples_to_ms(audio.len(), sample_rate),
            rms_db: rms_db(audio),
            peak_db: peak_db(audio),
        })
    }

    fn name(&self) -> &'static str {
        "level_meter"
    }
}
