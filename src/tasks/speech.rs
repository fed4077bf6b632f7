//! Speech/silence classification of a whole clip.
//!
//! The clip is cut into fixed frames, each frame goes through a VAD engine,
//! decisions are smoothed by majority vote, and runs of speech frames are
//! merged into segments.

use super::samples_to_ms;
#[cfg(feature = "vad_earshot")]
use crate::audio::EarshotVad;
use crate::audio::{
    resample, SimpleThresholdVad, VadDecision, VadEngine, VadSmoother, MAX_RATE, MIN_RATE,
    SPEECH_RATE,
};
use crate::config::{
    default_vad_engine, AppConfig, VadEngineKind, DEFAULT_MIN_SPEECH_RATIO, DEFAULT_VAD_FRAME_MS,
    DEFAULT_VAD_SMOOTHING_FRAMES, DEFAULT_VAD_THRESHOLD_DB, EARSHOT_FRAME_MS, MAX_VAD_FRAME_MS,
    MIN_VAD_FRAME_MS,
};
use crate::runner::AudioTask;
use anyhow::{bail, Result};
use serde::Serialize;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechLabel {
    Speech,
    Silence,
}

impl SpeechLabel {
    pub fn label(self) -> &'static str {
        match self {
            SpeechLabel::Speech => "speech",
            SpeechLabel::Silence => "silence",
        }
    }
}

/// A run of speech, in milliseconds on the runner's clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeechSegment {
    pub start_ms: f64,
    pub end_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechClassification {
    pub timestamp_ms: f64,
    pub sample_rate: u32,
    pub label: SpeechLabel,
    pub speech_ms: f64,
    pub silence_ms: f64,
    pub speech_ratio: f64,
    pub segments: Vec<SpeechSegment>,
}

#[derive(Debug, Clone)]
pub struct SpeechDetectorConfig {
    pub engine: VadEngineKind,
    pub threshold_db: f32,
    pub frame_ms: u64,
    pub smoothing_frames: usize,
    /// Share of the clip that must be speech for the clip to be labelled speech.
    pub min_speech_ratio: f64,
}

impl Default for SpeechDetectorConfig {
    fn default() -> Self {
        Self {
            engine: default_vad_engine(),
            threshold_db: DEFAULT_VAD_THRESHOLD_DB,
            frame_ms: DEFAULT_VAD_FRAME_MS,
            smoothing_frames: DEFAULT_VAD_SMOOTHING_FRAMES,
            min_speech_ratio: DEFAULT_MIN_SPEECH_RATIO,
        }
    }
}

impl SpeechDetectorConfig {
    /// Reject frame sizes the engines would silently pad or truncate.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_VAD_FRAME_MS..=MAX_VAD_FRAME_MS).contains(&self.frame_ms) {
            bail!(
                "VAD frame must be between {MIN_VAD_FRAME_MS} and {MAX_VAD_FRAME_MS} ms, got {}",
                self.frame_ms
            );
        }
        if self.engine == VadEngineKind::Earshot && !EARSHOT_FRAME_MS.contains(&self.frame_ms) {
            bail!(
                "earshot VAD frame must be 10, 20, or 30 ms, got {}",
                self.frame_ms
            );
        }
        if !(0.0..=1.0).contains(&self.min_speech_ratio) {
            bail!(
                "minimum speech ratio must be between 0.0 and 1.0, got {}",
                self.min_speech_ratio
            );
        }
        Ok(())
    }
}

impl From<&AppConfig> for SpeechDetectorConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            engine: cfg.vad_engine,
            threshold_db: cfg.vad_threshold_db,
            frame_ms: cfg.vad_frame_ms,
            smoothing_frames: cfg.vad_smoothing_frames,
            min_speech_ratio: cfg.min_speech_ratio,
        }
    }
}

pub struct SpeechDetectorTask {
    config: SpeechDetectorConfig,
    vad: Box<dyn VadEngine>,
    smoother: VadSmoother,
}

impl SpeechDetectorTask {
    /// # Errors
    ///
    /// Fails for a config rejected by [`SpeechDetectorConfig::validate`], or
    /// when the Earshot engine is requested in a build without the
    /// `vad_earshot` feature.
    pub fn new(config: SpeechDetectorConfig) -> Result<Self> {
        config.validate()?;
        let vad = build_vad_engine(&config)?;
        tracing::debug!(
            engine = config.engine.label(),
            vad = vad.name(),
            frame_ms = config.frame_ms,
            threshold_db = config.threshold_db,
            "speech detector ready"
        );
        Ok(Self {
            smoother: VadSmoother::new(config.smoothing_frames),
            vad,
            config,
        })
    }

    /// Earshot only understands 16 kHz; the energy detector runs at the clip's own rate.
    fn prepare<'a>(&self, audio: &'a [f32], sample_rate: u32) -> Result<(Cow<'a, [f32]>, u32)> {
        match self.config.engine {
            VadEngineKind::Simple => {
                if sample_rate > MAX_RATE {
                    bail!("cannot classify {sample_rate}Hz audio (max {MAX_RATE}Hz)");
                }
                Ok((Cow::Borrowed(audio), sample_rate))
            }
            VadEngineKind::Earshot => {
                if sample_rate == SPEECH_RATE {
                    return Ok((Cow::Borrowed(audio), sample_rate));
                }
                if !(MIN_RATE..=MAX_RATE).contains(&sample_rate) {
                    bail!("cannot resample {sample_rate}Hz audio for the earshot detector");
                }
                Ok((Cow::Owned(resample(audio, sample_rate, SPEECH_RATE)), SPEECH_RATE))
            }
        }
    }
}

impl AudioTask for SpeechDetectorTask {
    type Output = SpeechClassification;

    fn process(
        &mut self,
        audio: &[f32],
        sample_rate: u32,
        timestamp_ms: f64,
    ) -> Result<SpeechClassification> {
        let (frames, rate) = self.prepare(audio, sample_rate)?;
        let frame_samples = ((rate as u64 * self.config.frame_ms) / 1000).max(1) as usize;
        self.vad.reset();
        self.smoother.reset();

        let mut speech_ms = 0.0;
        let mut silence_ms = 0.0;
        let mut segments: Vec<SpeechSegment> = Vec::new();
        let mut in_speech = false;
        let mut frame = Vec::with_capacity(frame_samples);

        for (index, chunk) in frames.chunks(frame_samples).enumerate() {
            frame.clear();
            frame.extend_from_slice(chunk);
            frame.resize(frame_samples, 0.0);
            let decision = self.smoother.smooth(self.vad.process_frame(&frame));

            let start_ms = timestamp_ms + samples_to_ms(index * frame_samples, rate);
            let chunk_ms = samples_to_ms(chunk.len(), rate);
            if decision == VadDecision::Speech {
                speech_ms += chunk_ms;
                let end_ms = start_ms + chunk_ms;
                if !in_speech {
                    segments.push(SpeechSegment { start_ms, end_ms });
                } else if let Some(segment) = segments.last_mut() {
                    segment.end_ms = end_ms;
                }
                in_speech = true;
            } else {
                // Uncertain frames count as silence.
                silence_ms += chunk_ms;
                in_speech = false;
            }
        }

        let total_ms = speech_ms + silence_ms;
        let speech_ratio = if total_ms > 0.0 { speech_ms / total_ms } else { 0.0 };
        let label = if speech_ms > 0.0 && speech_ratio >= self.config.min_speech_ratio {
            SpeechLabel::Speech
        } else {
            SpeechLabel::Silence
        };
        tracing::debug!(
            engine = self.config.engine.label(),
            label = label.label(),
            speech_ms,
            silence_ms,
            segments = segments.len(),
            "speech classification complete"
        );

        Ok(SpeechClassification {
            timestamp_ms,
            sample_rate,
            label,
            speech_ms,
            silence_ms,
            speech_ratio,
            segments,
        })
    }

    fn name(&self) -> &'static str {
        "speech_detector"
    }
}

fn build_vad_engine(config: &SpeechDetectorConfig) -> Result<Box<dyn VadEngine>> {
    match config.engine {
        VadEngineKind::Simple => Ok(Box::new(SimpleThresholdVad::new(config.threshold_db))),
        VadEngineKind::Earshot => {
            #[cfg(feature = "vad_earshot")]
            {
                Ok(Box::new(EarshotVad::new(config.threshold_db, config.frame_ms)))
            }
            #[cfg(not(feature = "vad_earshot"))]
            {
                bail!("--vad-engine earshot requires building with the 'vad_earshot' feature")
            }
        }
    }
}
