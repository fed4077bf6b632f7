use super::defaults::{
    EARSHOT_FRAME_MS, ISO_639_1_CODES, MAX_VAD_FRAME_MS, MAX_WHISPER_BEAM_SIZE, MIN_VAD_FRAME_MS,
};
use super::{AppConfig, TaskKind, VadEngineKind};
use crate::audio::{MAX_RATE, MIN_RATE};
use anyhow::{bail, Result};
use clap::Parser;
use std::path::Path;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the language code.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(rate) = self.sample_rate {
            if !(MIN_RATE..=MAX_RATE).contains(&rate) {
                bail!("--sample-rate must be between {MIN_RATE} and {MAX_RATE} Hz, got {rate}");
            }
        }
        if !(MIN_RATE..=MAX_RATE).contains(&self.default_sample_rate) {
            bail!(
                "--default-sample-rate must be between {MIN_RATE} and {MAX_RATE} Hz, got {}",
                self.default_sample_rate
            );
        }
        if !(-120.0..=0.0).contains(&self.vad_threshold_db) {
            bail!(
                "--vad-threshold-db must be between -120.0 and 0.0 dB, got {}",
                self.vad_threshold_db
            );
        }
        if !(MIN_VAD_FRAME_MS..=MAX_VAD_FRAME_MS).contains(&self.vad_frame_ms) {
            bail!(
                "--vad-frame-ms must be between {MIN_VAD_FRAME_MS} and {MAX_VAD_FRAME_MS}, got {}",
                self.vad_frame_ms
            );
        }
        if self.vad_engine == VadEngineKind::Earshot
            && !EARSHOT_FRAME_MS.contains(&self.vad_frame_ms)
        {
            bail!(
                "--vad-frame-ms must be 10, 20, or 30 with --vad-engine earshot, got {}",
                self.vad_frame_ms
            );
        }
        if !(1..=10).contains(&self.vad_smoothing_frames) {
            bail!(
                "--vad-smoothing-frames must be between 1 and 10, got {}",
                self.vad_smoothing_frames
            );
        }
        if !(0.0..=1.0).contains(&self.min_speech_ratio) {
            bail!(
                "--min-speech-ratio must be between 0.0 and 1.0, got {}",
                self.min_speech_ratio
            );
        }
        ensure_vad_engine_supported(self.vad_engine)?;

        if self.whisper_beam_size > MAX_WHISPER_BEAM_SIZE {
            bail!(
                "--whisper-beam-size must be between 0 and {MAX_WHISPER_BEAM_SIZE}, got {}",
                self.whisper_beam_size
            );
        }
        if !(0.0..=1.0).contains(&self.whisper_temperature) {
            bail!(
                "--whisper-temperature must be between 0.0 and 1.0, got {}",
                self.whisper_temperature
            );
        }
        if self.task == TaskKind::Transcribe {
            match self.whisper_model_path.as_deref() {
                None => bail!("--task transcribe requires --whisper-model-path"),
                Some(path) if !Path::new(path).is_file() => {
                    bail!("--whisper-model-path does not point to a file: {path}")
                }
                Some(_) => {}
            }
        }

        self.lang = validate_lang(&self.lang)?;
        Ok(())
    }
}

/// Accepts `auto` or a locale-style value whose leading code is ISO-639-1.
pub(super) fn validate_lang(lang: &str) -> Result<String> {
    let lang = lang.trim();
    if lang.is_empty() {
        bail!("--lang must not be empty");
    }
    if lang.eq_ignore_ascii_case("auto") {
        return Ok("auto".to_string());
    }
    if !lang
        .chars()
        .all(|ch| ch.is_ascii_alphabetic() || ch == '-' || ch == '_')
    {
        bail!("--lang must contain only alphabetic characters or '-'/'_' separators");
    }
    // Whisper only needs the primary code; region suffixes are dropped.
    let primary = lang
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if !ISO_639_1_CODES.contains(&primary.as_str()) {
        bail!("--lang must start with a valid ISO-639-1 code or be 'auto', got '{lang}'");
    }
    Ok(primary)
}

#[cfg(not(feature = "vad_earshot"))]
fn ensure_vad_engine_supported(engine: VadEngineKind) -> Result<()> {
    if engine == VadEngineKind::Earshot {
        bail!("--vad-engine earshot requires building with the 'vad_earshot' feature");
    }
    Ok(())
}

#[cfg(feature = "vad_earshot")]
fn ensure_vad_engine_supported(_engine: VadEngineKind) -> Result<()> {
    Ok(())
}
