//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::runner::DEFAULT_SAMPLE_RATE;
pub use defaults::{
    default_vad_engine, DEFAULT_LANG, DEFAULT_MIN_SPEECH_RATIO, DEFAULT_VAD_FRAME_MS,
    DEFAULT_VAD_SMOOTHING_FRAMES, DEFAULT_VAD_THRESHOLD_DB, EARSHOT_FRAME_MS, MAX_VAD_FRAME_MS,
    MAX_WHISPER_BEAM_SIZE, MIN_VAD_FRAME_MS,
};

/// CLI options for `voxtask`. Values are checked by [`AppConfig::validate`]
/// before any task is built.
#[derive(Debug, Parser, Clone)]
#[command(about = "VoxTask: run an audio task over a single clip", author, version)]
pub struct AppConfig {
    /// Raw mono clip: little-endian 32-bit float samples
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Task to run on the clip
    #[arg(long, value_enum, default_value_t = TaskKind::Level)]
    pub task: TaskKind,

    /// Sample rate of the clip (Hz); falls back to --default-sample-rate
    #[arg(long = "sample-rate")]
    pub sample_rate: Option<u32>,

    /// Sample rate assumed for clips without an explicit rate (Hz)
    #[arg(long = "default-sample-rate", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub default_sample_rate: u32,

    /// Voice activity detector used by the speech task
    #[arg(long = "vad-engine", value_enum, default_value_t = default_vad_engine())]
    pub vad_engine: VadEngineKind,

    /// Voice activity detection threshold (decibels)
    #[arg(
        long = "vad-threshold-db",
        default_value_t = DEFAULT_VAD_THRESHOLD_DB,
        allow_negative_numbers = true
    )]
    pub vad_threshold_db: f32,

    /// Voice activity detection frame size (milliseconds)
    #[arg(long = "vad-frame-ms", default_value_t = DEFAULT_VAD_FRAME_MS)]
    pub vad_frame_ms: u64,

    /// VAD smoothing window (frames)
    #[arg(long = "vad-smoothing-frames", default_value_t = DEFAULT_VAD_SMOOTHING_FRAMES)]
    pub vad_smoothing_frames: usize,

    /// Share of speech frames needed to label the clip as speech (0.0-1.0)
    #[arg(long = "min-speech-ratio", default_value_t = DEFAULT_MIN_SPEECH_RATIO)]
    pub min_speech_ratio: f64,

    /// Whisper model path (required for --task transcribe)
    #[arg(long = "whisper-model-path", env = "VOXTASK_WHISPER_MODEL")]
    pub whisper_model_path: Option<String>,

    /// Language passed to Whisper
    #[arg(long, default_value = DEFAULT_LANG)]
    pub lang: String,

    /// Whisper beam size (>1 enables beam search)
    #[arg(long = "whisper-beam-size", default_value_t = 0)]
    pub whisper_beam_size: u32,

    /// Whisper temperature
    #[arg(long = "whisper-temperature", default_value_t = 0.0)]
    pub whisper_temperature: f32,

    /// Print the result as JSON instead of a summary line
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Enable trace logging to a JSON lines file
    #[arg(long = "logs", env = "VOXTASK_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs)
    #[arg(long = "no-logs", env = "VOXTASK_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

/// Tasks selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    Level,
    Speech,
    Transcribe,
}

impl TaskKind {
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Level => "level",
            TaskKind::Speech => "speech",
            TaskKind::Transcribe => "transcribe",
        }
    }
}

/// Available runtime-selectable VAD implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VadEngineKind {
    Earshot,
    Simple,
}

impl VadEngineKind {
    pub fn label(self) -> &'static str {
        match self {
            VadEngineKind::Earshot => "earshot",
            VadEngineKind::Simple => "simple",
        }
    }
}
