//! Voice Activity Detection (VAD) for speech/silence classification.

use super::meter::rms_db;
use std::cmp::Ordering as CmpOrdering;
use std::collections::VecDeque;

/// Voice Activity Detection engine that processes audio frames.
///
/// # Frame Size Contract
/// Implementations may require specific frame sizes. Earshot expects frames
/// of 10ms, 20ms, or 30ms at 16kHz.
///
/// Frame size in samples = (sample_rate * frame_duration_ms) / 1000
/// Example: 20ms @ 16kHz = 320 samples
pub trait VadEngine {
    fn process_frame(&mut self, samples: &[f32]) -> VadDecision;
    fn reset(&mut self);
    fn name(&self) -> &'static str {
        "unknown_vad"
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VadDecision {
    Speech,
    Silence,
    Uncertain,
}

/// Smooths VAD decisions using a sliding window majority vote.
///
/// Brief noise spikes need several agreeing frames before they flip the
/// speech/silence state. Ties keep the incoming decision.
pub struct VadSmoother {
    window: VecDeque<VadDecision>,
    window_size: usize,
}

impl VadSmoother {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: VecDeque::new(),
            window_size: window_size.max(1),
        }
    }

    pub fn smooth(&mut self, decision: VadDecision) -> VadDecision {
        if self.window_size <= 1 {
            return decision;
        }
        self.window.push_back(decision);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        let mut speech = 0usize;
        let mut silence = 0usize;
        for item in &self.window {
            match item {
                VadDecision::Speech => speech += 1,
                VadDecision::Silence => silence += 1,
                VadDecision::Uncertain => {}
            }
        }
        match speech.cmp(&silence) {
            CmpOrdering::Greater => VadDecision::Speech,
            CmpOrdering::Less => VadDecision::Silence,
            CmpOrdering::Equal => decision,
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Energy-threshold VAD. Works at any sample rate.
#[derive(Debug, Clone)]
pub struct SimpleThresholdVad {
    threshold_db: f32,
}

impl SimpleThresholdVad {
    pub fn new(threshold_db: f32) -> Self {
        Self { threshold_db }
    }
}

impl VadEngine for SimpleThresholdVad {
    fn process_frame(&mut self, samples: &[f32]) -> VadDecision {
        if samples.is_empty() {
            return VadDecision::Uncertain;
        }
        if rms_db(samples) >= self.threshold_db {
            VadDecision::Speech
        } else {
            VadDecision::Silence
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "simple_threshold_vad"
    }
}
