use super::{
    speech_input, AnyTask, ClipLevels, LevelMeterTask, SpeechDetectorConfig, SpeechDetectorTask, SpeechLabel,
    SpeechSegment, TaskOutput,
};
use crate::audio::{MAX_RATE, METER_FLOOR_DB, SPEECH_RATE};
use crate::config::{AppConfig, VadEngineKind};
use crate::error::InputError;
use crate::runner::{AudioTask, AudioTaskRunner};
use clap::Parser;
use std::f32::consts::PI;

const RATE: u32 = 16_000;

fn tone(ms: u64, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let samples = (ms * sample_rate as u64 / 1000) as usize;
    (0..samples)
        .map(|n| amplitude * (2.0 * PI * 440.0 * n as f32 / sample_rate as f32).sin())
        .collect()
}

fn silence(ms: u64, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (ms * sample_rate as u64 / 1000) as usize]
}

/// 500ms silence, 500ms tone, 500ms silence.
fn speech_in_the_middle(sample_rate: u32) -> Vec<f32> {
    let mut clip = silence(500, sample_rate);
    clip.extend(tone(500, sample_rate, 0.5));
    clip.extend(silence(500, sample_rate));
    clip
}

fn simple_detector(smoothing_frames: usize) -> SpeechDetectorTask {
    SpeechDetectorTask::new(SpeechDetectorConfig {
        engine: VadEngineKind::Simple,
        threshold_db: -45.0,
        frame_ms: 20,
        smoothing_frames,
        min_speech_ratio: 0.1,
    })
    .unwrap()
}

#[test]
fn level_meter_reports_clip_shape_and_levels() {
    let mut task = LevelMeterTask::new();
    let clip = tone(250, RATE, 0.5);
    let levels = task.process(&clip, RATE, 42.0).unwrap();
    assert_eq!(levels.timestamp_ms, 42.0);
    assert_eq!(levels.sample_rate, RATE);
    assert_eq!(levels.samples, 4_000);
    assert_eq!(levels.duration_ms, 250.0);
    assert!((levels.peak_db + 6.02).abs() < 0.1, "peak {}", levels.peak_db);
    assert!((levels.rms_db + 9.03).abs() < 0.1, "rms {}", levels.rms_db);
}

#[test]
fn level_meter_handles_empty_clip() {
    let levels = LevelMeterTask::new().process(&[], RATE, 0.0).unwrap();
    assert_eq!(levels.samples, 0);
    assert_eq!(levels.duration_ms, 0.0);
    assert_eq!(levels.rms_db, METER_FLOOR_DB);
    assert_eq!(levels.peak_db, METER_FLOOR_DB);
}

#[test]
fn level_meter_duration_follows_runner_default_rate() {
    let mut runner = AudioTaskRunner::new(LevelMeterTask::new());
    let clip = vec![0.1f32; 4_800];
    let at_48k = runner.process_audio_clip(&clip, None).unwrap();
    assert_eq!(at_48k.sample_rate, 48_000);
    assert_eq!(at_48k.duration_ms, 100.0);

    runner.set_default_sample_rate(24_000).unwrap();
    let at_24k = runner.process_audio_clip(&clip, None).unwrap();
    assert_eq!(at_24k.duration_ms, 200.0);
    assert!(at_24k.timestamp_ms >= at_48k.timestamp_ms);
}

#[test]
fn speech_detector_finds_the_speech_segment() {
    let mut task = simple_detector(1);
    let result = task
        .process(&speech_in_the_middle(RATE), RATE, 1_000.0)
        .unwrap();
    assert_eq!(result.label, SpeechLabel::Speech);
    assert_eq!(result.speech_ms, 500.0);
    assert_eq!(result.silence_ms, 1_000.0);
    assert!((result.speech_ratio - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(
        result.segments,
        vec![SpeechSegment {
            start_ms: 1_500.0,
            end_ms: 2_000.0,
        }]
    );
}

#[test]
fn smoothing_delays_segment_edges_by_one_frame() {
    let mut task = simple_detector(3);
    let result = task.process(&speech_in_the_middle(RATE), RATE, 0.0).unwrap();
    assert_eq!(result.speech_ms, 500.0);
    assert_eq!(
        result.segments,
        vec![SpeechSegment {
            start_ms: 520.0,
            end_ms: 1_020.0,
        }]
    );
}

#[test]
fn speech_detector_state_does_not_leak_between_clips() {
    let mut task = simple_detector(3);
    let first = task.process(&tone(200, RATE, 0.5), RATE, 0.0).unwrap();
    assert_eq!(first.label, SpeechLabel::Speech);
    let second = task.process(&silence(200, RATE), RATE, 200.0).unwrap();
    assert_eq!(second.label, SpeechLabel::Silence);
    assert!(second.segments.is_empty());
}

#[test]
fn silence_is_labelled_silence() {
    let mut task = simple_detector(3);
    let result = task.process(&silence(400, RATE), RATE, 0.0).unwrap();
    assert_eq!(result.label, SpeechLabel::Silence);
    assert_eq!(result.speech_ms, 0.0);
    assert_eq!(result.speech_ratio, 0.0);
}

#[test]
fn short_speech_below_ratio_is_silence() {
    let mut task = SpeechDetectorTask::new(SpeechDetectorConfig {
        engine: VadEngineKind::Simple,
        min_speech_ratio: 0.5,
        smoothing_frames: 1,
        ..SpeechDetectorConfig::default()
    })
    .unwrap();
    let result = task.process(&speech_in_the_middle(RATE), RATE, 0.0).unwrap();
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.label, SpeechLabel::Silence);
}

#[test]
fn empty_clip_produces_empty_classification() {
    let result = simple_detector(3).process(&[], RATE, 5.0).unwrap();
    assert_eq!(result.label, SpeechLabel::Silence);
    assert_eq!(result.timestamp_ms, 5.0);
    assert!(result.segments.is_empty());
}

#[test]
fn partial_last_frame_counts_its_real_duration() {
    let mut task = simple_detector(1);
    // 30ms of tone: one full 20ms frame plus a 10ms tail.
    let result = task.process(&tone(30, RATE, 0.5), RATE, 0.0).unwrap();
    assert_eq!(result.speech_ms, 30.0);
    assert_eq!(result.segments[0].end_ms, 30.0);
}

#[cfg(feature = "vad_earshot")]
#[test]
fn earshot_detector_resamples_to_speech_rate() {
    let mut task = SpeechDetectorTask::new(SpeechDetectorConfig {
        engine: VadEngineKind::Earshot,
        ..SpeechDetectorConfig::default()
    })
    .unwrap();
    let clip = tone(1_000, 48_000, 0.5);
    let result = task.process(&clip, 48_000, 0.0).unwrap();
    assert_eq!(result.sample_rate, 48_000);
    assert!((result.speech_ms + result.silence_ms - 1_000.0).abs() < 1e-6);
}

#[cfg(feature = "vad_earshot")]
#[test]
fn earshot_detector_rejects_unresamplable_rates() {
    let mut task = SpeechDetectorTask::new(SpeechDetectorConfig {
        engine: VadEngineKind::Earshot,
        ..SpeechDetectorConfig::default()
    })
    .unwrap();
    let err = task.process(&[0.0; 100], 1_000, 0.0).unwrap_err();
    assert!(err.to_string().contains("1000Hz"));
}

#[cfg(not(feature = "vad_earshot"))]
#[test]
fn earshot_detector_requires_feature() {
    let result = SpeechDetectorTask::new(SpeechDetectorConfig {
        engine: VadEngineKind::Earshot,
        ..SpeechDetectorConfig::default()
    });
    assert!(result.is_err());
}

#[test]
fn any_task_builds_from_config() {
    let cfg = AppConfig::parse_from(["test-app", "clip.f32"]);
    let mut task = AnyTask::from_config(&cfg).unwrap();
    assert_eq!(task.name(), "level_meter");
    let output = task.process(&[0.5, -0.5], 8_000, 3.0).unwrap();
    assert!(matches!(output, TaskOutput::Level(ClipLevels { samples: 2, .. })));

    let cfg = AppConfig::parse_from([
        "test-app",
        "clip.f32",
        "--task",
        "speech",
        "--vad-engine",
        "simple",
    ]);
    let task = AnyTask::from_config(&cfg).unwrap();
    assert_eq!(task.name(), "speech_detector");
}

#[cfg(not(feature = "whisper"))]
#[test]
fn transcribe_task_requires_feature() {
    let cfg = AppConfig::parse_from(["test-app", "clip.f32", "--task", "transcribe"]);
    let err = AnyTask::from_config(&cfg).err().unwrap();
    assert!(err.to_string().contains("'whisper' feature"));
}

#[test]
fn task_output_serializes_with_task_tag() {
    let output = LevelMeterTask::new()
        .process(&[0.0; 160], RATE, 12.5)
        .map(TaskOutput::Level)
        .unwrap();
    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["task"], "level");
    assert_eq!(value["timestamp_ms"], 12.5);
    assert_eq!(value["sample_rate"], 16_000);
    assert_eq!(value["samples"], 160);
}

#[test]
fn speech_output_serializes_label_lowercase() {
    let output = simple_detector(1)
        .process(&speech_in_the_middle(RATE), RATE, 0.0)
        .map(TaskOutput::Speech)
        .unwrap();
    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["task"], "speech");
    assert_eq!(value["label"], "speech");
    assert_eq!(value["segments"][0]["start_ms"], 500.0);
}

#[test]
fn summary_lines_are_pipe_separated() {
    let output = TaskOutput::Level(LevelMeterTask::new().process(&[], RATE, 0.0).unwrap());
    let summary = output.summary();
    assert!(summary.starts_with("level|timestamp_ms=0.000|sample_rate=16000|samples=0"));
}

#[test]
fn speech_detector_rejects_frames_out_of_range() {
    for frame_ms in [0, 4, 121] {
        let result = SpeechDetectorTask::new(SpeechDetectorConfig {
            engine: VadEngineKind::Simple,
            frame_ms,
            ..SpeechDetectorConfig::default()
        });
        let err = result.err().expect("frame size should be rejected");
        assert!(err.to_string().contains("VAD frame must be between"), "{err}");
    }
}

#[test]
fn speech_detector_rejects_ratio_out_of_range() {
    let result = SpeechDetectorTask::new(SpeechDetectorConfig {
        engine: VadEngineKind::Simple,
        min_speech_ratio: 1.5,
        ..SpeechDetectorConfig::default()
    });
    assert!(result.is_err());
}

#[test]
fn earshot_config_requires_supported_frame_size() {
    let config = SpeechDetectorConfig {
        engine: VadEngineKind::Earshot,
        frame_ms: 40,
        ..SpeechDetectorConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("10, 20, or 30"), "{err}");
    assert!(SpeechDetectorTask::new(config).is_err());
}

#[cfg(feature = "vad_earshot")]
#[test]
fn earshot_detector_builds_for_supported_frames() {
    for frame_ms in [10, 20, 30] {
        let task = SpeechDetectorTask::new(SpeechDetectorConfig {
            engine: VadEngineKind::Earshot,
            frame_ms,
            ..SpeechDetectorConfig::default()
        });
        assert!(task.is_ok(), "frame {frame_ms}ms should be accepted");
    }
}

#[test]
fn simple_detector_rejects_rates_above_max() {
    let mut runner = AudioTaskRunner::new(simple_detector(1));
    let err = runner
        .process_audio_clip(&[0.1], Some(u32::MAX))
        .unwrap_err();
    assert!(err.to_string().contains("cannot classify"), "{err}");

    let ok = runner.process_audio_clip(&[0.1], Some(MAX_RATE)).unwrap();
    assert_eq!(ok.sample_rate, MAX_RATE);
}

#[test]
fn speech_input_rejects_empty_clip() {
    let err = speech_input(&[], SPEECH_RATE).unwrap_err();
    assert_eq!(err.downcast_ref::<InputError>(), Some(&InputError::EmptyClip));
}

#[test]
fn speech_input_rejects_unresamplable_rate() {
    let err = speech_input(&[0.1; 16], 1_000).unwrap_err();
    assert!(err.to_string().contains("1000Hz"), "{err}");
    assert!(err.downcast_ref::<InputError>().is_none());
}

#[test]
fn speech_input_resamples_to_speech_rate() {
    let at_speech_rate = vec![0.25f32; 160];
    assert_eq!(speech_input(&at_speech_rate, SPEECH_RATE).unwrap(), at_speech_rate);
    let at_48k = speech_input(&[0.25; 4_800], 48_000).unwrap();
    assert!((1_590..=1_610).contains(&at_48k.len()), "{}", at_48k.len());
}
