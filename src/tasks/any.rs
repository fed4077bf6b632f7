use super::{
    ClipLevels, LevelMeterTask, SpeechClassification, SpeechDetectorConfig, SpeechDetectorTask,
};
#[cfg(feature = "whisper")]
use super::{Transcript, TranscriptionConfig, TranscriptionTask};
use crate::config::{AppConfig, TaskKind};
use crate::runner::AudioTask;
#[cfg(not(feature = "whisper"))]
use anyhow::bail;
use anyhow::Result;
use serde::Serialize;

/// Run-time choice between the built-in tasks.
pub enum AnyTask {
    Level(LevelMeterTask),
    Speech(SpeechDetectorTask),
    #[cfg(feature = "whisper")]
    Transcribe(TranscriptionTask),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskOutput {
    Level(ClipLevels),
    Speech(SpeechClassification),
    #[cfg(feature = "whisper")]
    Transcribe(Transcript),
}

impl AnyTask {
    /// Build the task selected by `--task`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.task {
            TaskKind::Level => Ok(AnyTask::Level(LevelMeterTask::new())),
            TaskKind::Speech => {
                let detector = SpeechDetectorTask::new(SpeechDetectorConfig::from(config))?;
                Ok(AnyTask::Speech(detector))
            }
            TaskKind::Transcribe => {
                #[cfg(feature = "whisper")]
                {
                    let task = TranscriptionTask::new(TranscriptionConfig::try_from(config)?)?;
                    Ok(AnyTask::Transcribe(task))
                }
                #[cfg(not(feature = "whisper"))]
                {
                    bail!("--task transcribe requires building with the 'whisper' feature")
                }
            }
        }
    }
}

impl AudioTask for AnyTask {
    type Output = TaskOutput;

    fn process(
        &mut self,
        audio: &[f32],
        sample_rate: u32,
        timestamp_ms: f64,
    ) -> Result<TaskOutput> {
        match self {
            AnyTask::Level(task) => task
                .process(audio, sample_rate, timestamp_ms)
                .map(TaskOutput::Level),
            AnyTask::Speech(task) => task
                .process(audio, sample_rate, timestamp_ms)
                .map(TaskOutput::Speech),
            #[cfg(feature = "whisper")]
            AnyTask::Transcribe(task) => task
                .process(audio, sample_rate, timestamp_ms)
                .map(TaskOutput::Transcribe),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyTask::Level(task) => task.name(),
            AnyTask::Speech(task) => task.name(),
            #[cfg(feature = "whisper")]
            AnyTask::Transcribe(task) => task.name(),
        }
    }
}

impl TaskOutput {
    /// One-line, pipe-separated summary for terminal output.
    pub fn summary(&self) -> String {
        match self {
            TaskOutput::Level(levels) => format!(
                "level|timestamp_ms={:.3}|sample_rate={}|samples={}|duration_ms={:.1}|rms_db={:.1}|peak_db={:.1}",
                levels.timestamp_ms,
                levels.sample_rate,
                levels.samples,
                levels.duration_ms,
                levels.rms_db,
                levels.peak_db
            ),
            TaskOutput::Speech(speech) => format!(
                "speech|timestamp_ms={:.3}|sample_rate={}|label={}|speech_ms={:.1}|silence_ms={:.1}|segments={}",
                speech.timestamp_ms,
                speech.sample_rate,
                speech.label.label(),
                speech.speech_ms,
                speech.silence_ms,
                speech.segments.len()
            ),
            #[cfg(feature = "whisper")]
            TaskOutput::Transcribe(transcript) => format!(
                "transcribe|timestamp_ms={:.3}|sample_rate={}|text={}",
                transcript.timestamp_ms, transcript.sample_rate, transcript.text
            ),
        }
    }
}
