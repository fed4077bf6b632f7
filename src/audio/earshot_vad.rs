//! Earshot-powered detector implementing `VadEngine`.

use super::{VadDecision, VadEngine, SPEECH_RATE};
use earshot::{VoiceActivityDetector, VoiceActivityProfile};

/// Adapts `earshot` to [`VadEngine`]. Frames must already be at 16 kHz.
pub struct EarshotVad {
    detector: VoiceActivityDetector,
    frame_samples: usize,
    scratch: Vec<i16>,
}

impl EarshotVad {
    /// Map a dB threshold onto Earshot's aggressiveness profiles.
    pub fn new(threshold_db: f32, frame_ms: u64) -> Self {
        let profile = match threshold_db {
            t if t <= -50.0 => VoiceActivityProfile::VERY_AGGRESSIVE,
            t if t <= -40.0 => VoiceActivityProfile::AGGRESSIVE,
            t if t <= -30.0 => VoiceActivityProfile::LBR,
            _ => VoiceActivityProfile::QUALITY,
        };
        Self {
            detector: VoiceActivityDetector::new(profile),
            frame_samples: Self::frame_samples(frame_ms),
            scratch: Vec::new(),
        }
    }

    /// Samples per frame at 16 kHz, with `frame_ms` clamped to 10..=30.
    pub fn frame_samples(frame_ms: u64) -> usize {
        let frame_ms = frame_ms.clamp(10, 30) as usize;
        (SPEECH_RATE as usize * frame_ms) / 1000
    }
}

impl VadEngine for EarshotVad {
    fn process_frame(&mut self, samples: &[f32]) -> VadDecision {
        if samples.is_empty() {
            return VadDecision::Uncertain;
        }
        self.scratch.clear();
        self.scratch.reserve(self.frame_samples);
        for sample in samples.iter().copied() {
            let clamped = sample.clamp(-1.0, 1.0);
            self.scratch.push((clamped * 32_767.0) as i16);
        }
        self.scratch.resize(self.frame_samples, 0);
        match self.detector.predict_16khz(&self.scratch) {
            Ok(true) => VadDecision::Speech,
            Ok(false) => VadDecision::Silence,
            Err(_) => VadDecision::Uncertain,
        }
    }

    fn reset(&mut self) {
        self.detector.reset();
    }

    fn name(&self) -> &'static str {
        "earshot_vad"
    }
}
