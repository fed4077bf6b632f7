//! Whisper speech-to-text as an audio task.
//!
//! The model is loaded once when the task is built and reused for every clip.

use super::speech_input;
use crate::config::AppConfig;
use crate::runner::AudioTask;
use anyhow::{anyhow, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub timestamp_ms: f64,
    pub sample_rate: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub model_path: String,
    /// ISO 639-1 code or `auto`.
    pub lang: String,
    /// Values above 1 switch from greedy decoding to beam search.
    pub beam_size: u32,
    pub temperature: f32,
}

impl TryFrom<&AppConfig> for TranscriptionConfig {
    type Error = anyhow::Error;

    fn try_from(cfg: &AppConfig) -> Result<Self> {
        let model_path = cfg
            .whisper_model_path
            .clone()
            .ok_or_else(|| anyhow!("--task transcribe requires --whisper-model-path"))?;
        Ok(Self {
            model_path,
            lang: cfg.lang.clone(),
            beam_size: cfg.whisper_beam_size,
            temperature: cfg.whisper_temperature,
        })
    }
}

pub struct TranscriptionTask {
    config: TranscriptionConfig,
    transcriber: platform::Transcriber,
}

impl TranscriptionTask {
    /// Load the Whisper model named by `config.model_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or the platform has no
    /// Whisper support.
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        let transcriber = platform::Transcriber::new(&config.model_path)?;
        tracing::info!(model = %config.model_path, "whisper model loaded");
        Ok(Self {
            config,
            transcriber,
        })
    }
}

impl AudioTask for TranscriptionTask {
    type Output = Transcript;

    fn process(
        &mut self,
        audio: &[f32],
        sample_rate: u32,
        timestamp_ms: f64,
    ) -> Result<Transcript> {
        let speech = speech_input(audio, sample_rate)?;
        let text = self.transcriber.transcribe(&speech, &self.config)?;
        Ok(Transcript {
            timestamp_ms,
            sample_rate,
            text: text.trim().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "whisper_transcriber"
    }
}

#[cfg(unix)]
mod platform {
    use super::TranscriptionConfig;
    use anyhow::{anyhow, Context, Result};
    use std::io;
    use std::os::raw::{c_char, c_uint, c_void};
    use std::os::unix::io::AsRawFd;
    use std::sync::Once;
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    /// Loaded GGML model.
    pub struct Transcriber {
        ctx: WhisperContext,
    }

    impl Transcriber {
        /// Stderr is pointed at `/dev/null` while loading because whisper.cpp
        /// prints its initialization chatter there.
        pub fn new(model_path: &str) -> Result<Self> {
            install_whisper_log_silencer();

            let null = std::fs::OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .context("failed to open /dev/null")?;
            let null_fd = null.as_raw_fd();

            // SAFETY: dup(2) copies the stderr descriptor so it can be restored
            // below; we own the copy and close it before returning.
            let orig_stderr = unsafe { libc::dup(2) };
            if orig_stderr < 0 {
                return Err(anyhow!(
                    "failed to dup stderr: {}",
                    io::Error::last_os_error()
                ));
            }

            let dup_result = unsafe { libc::dup2(null_fd, 2) };
            if dup_result < 0 {
                unsafe {
                    libc::close(orig_stderr);
                }
                return Err(anyhow!(
                    "failed to redirect stderr: {}",
                    io::Error::last_os_error()
                ));
            }

            let ctx_result =
                WhisperContext::new_with_params(model_path, WhisperContextParameters::default());

            let restore_result = unsafe { libc::dup2(orig_stderr, 2) };
            unsafe {
                libc::close(orig_stderr);
            }
            if restore_result < 0 {
                return Err(anyhow!(
                    "failed to restore stderr: {}",
                    io::Error::last_os_error()
                ));
            }

            let ctx = ctx_result.context("failed to load whisper model")?;
            Ok(Self { ctx })
        }

        pub fn transcribe(&self, samples: &[f32], config: &TranscriptionConfig) -> Result<String> {
            let mut state = self
                .ctx
                .create_state()
                .context("failed to create whisper state")?;
            let mut params = if config.beam_size > 1 {
                FullParams::new(SamplingStrategy::BeamSearch {
                    beam_size: config.beam_size as i32,
                    patience: -1.0,
                })
            } else {
                FullParams::new(SamplingStrategy::Greedy { best_of: 1 })
            };
            if config.lang.eq_ignore_ascii_case("auto") {
                params.set_language(None);
                params.set_detect_language(true);
            } else {
                params.set_language(Some(&config.lang));
                params.set_detect_language(false);
            }
            params.set_temperature(config.temperature);
            // Leave headroom on laptops.
            params.set_n_threads(num_cpus::get().min(8) as i32);
            params.set_print_progress(false);
            params.set_print_timestamps(false);
            params.set_print_special(false);
            params.set_print_realtime(false);
            params.set_translate(false);
            params.set_token_timestamps(false);
            state.full(params, samples)?;

            let mut transcript = String::new();
            let num_segments = match state.full_n_segments() {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(%err, "whisper failed to report segment count");
                    return Ok(transcript);
                }
            };
            for i in 0..num_segments.max(0) {
                match state.full_get_segment_text_lossy(i) {
                    Ok(text) => transcript.push_str(&text),
                    Err(err) => tracing::warn!(%err, segment = i, "failed to read whisper segment"),
                }
            }
            Ok(transcript.replace("[BLANK_AUDIO]", ""))
        }
    }

    fn install_whisper_log_silencer() {
        static INSTALL_LOG_CALLBACK: Once = Once::new();
        INSTALL_LOG_CALLBACK.call_once(|| unsafe {
            whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
        });
    }

    unsafe extern "C" fn whisper_log_callback(
        _level: c_uint,
        _text: *const c_char,
        _user_data: *mut c_void,
    ) {
    }
}

#[cfg(not(unix))]
mod platform {
    use super::TranscriptionConfig;
    use anyhow::{anyhow, Result};

    pub struct Transcriber;

    impl Transcriber {
        pub fn new(_: &str) -> Result<Self> {
            Err(anyhow!(
                "Whisper transcription is currently supported only on Unix-like platforms"
            ))
        }

        pub fn transcribe(&self, _: &[f32], _: &TranscriptionConfig) -> Result<String> {
            Err(anyhow!(
                "Whisper transcription is currently supported only on Unix-like platforms"
            ))
        }
    }
}
