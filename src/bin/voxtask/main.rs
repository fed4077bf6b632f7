//! `voxtask` entrypoint: run one audio task over one clip.
//!
//! The clip is read from a raw `f32le` file, handed to the selected task
//! through `AudioTaskRunner`, and the result is printed as a summary line or
//! as JSON.

use anyhow::{Context, Result};
use voxtask::config::AppConfig;
use voxtask::pcm::read_pcm_f32le;
use voxtask::tasks::{AnyTask, TaskOutput};
use voxtask::telemetry::init_tracing;
use voxtask::AudioTaskRunner;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_tracing(&config);
    tracing::info!(
        task = config.task.label(),
        input = %config.input.display(),
        "voxtask starting"
    );

    let output = run(&config)?;
    println!("{}", render(&output, config.json)?);
    Ok(())
}

fn run(config: &AppConfig) -> Result<TaskOutput> {
    let clip = read_pcm_f32le(&config.input)?;
    let task = AnyTask::from_config(config)
        .with_context(|| format!("failed to set up the {} task", config.task.label()))?;
    let mut runner = AudioTaskRunner::new(task);
    runner.set_default_sample_rate(config.default_sample_rate)?;
    runner.process_audio_clip(&clip, config.sample_rate)
}

fn render(output: &TaskOutput, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string(output).context("failed to encode result as JSON");
    }
    Ok(output.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::{SystemTime, UNIX_EPOCH};
    use voxtask::pcm::encode_pcm_f32le;

    fn temp_clip(label: &str, samples: &[f32]) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("voxtask_{label}_{nanos}.f32"));
        std::fs::write(&path, encode_pcm_f32le(samples)).unwrap();
        path
    }

    #[test]
    fn run_uses_default_rate_unless_overridden() {
        let path = temp_clip("rates", &[0.1; 441]);
        let input = path.to_string_lossy().into_owned();

        let mut cfg =
            AppConfig::parse_from(["voxtask", input.as_str(), "--default-sample-rate", "44100"]);
        cfg.validate().unwrap();
        let defaulted = run(&cfg).unwrap();

        let mut cfg =
            AppConfig::parse_from(["voxtask", input.as_str(), "--sample-rate", "22050"]);
        cfg.validate().unwrap();
        let explicit = run(&cfg).unwrap();
        let _ = std::fs::remove_file(&path);

        match (defaulted, explicit) {
            (TaskOutput::Level(a), TaskOutput::Level(b)) => {
                assert_eq!(a.sample_rate, 44_100);
                assert_eq!(a.duration_ms, 10.0);
                assert_eq!(b.sample_rate, 22_050);
                assert_eq!(b.duration_ms, 20.0);
            }
            other => panic!("unexpected outputs: {other:?}"),
        }
    }

    #[test]
    fn render_switches_between_summary_and_json() {
        let path = temp_clip("render", &[0.0; 16]);
        let cfg = AppConfig::parse_from(["voxtask", path.to_str().unwrap()]);
        let output = run(&cfg).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(render(&output, false).unwrap().starts_with("level|"));
        let json = render(&output, true).unwrap();
        assert!(json.starts_with("{\"task\":\"level\""));
    }
}
