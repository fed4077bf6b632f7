//! Single-clip audio task runner.
//!
//! Normalizes clip submissions into one call on an [`AudioTask`]: the sample
//! rate falls back to a stored default when the caller omits it, and every
//! call is stamped with a monotonic millisecond timestamp before it is handed
//! to the task.

mod clock;
mod shared;

pub use clock::{Clock, MonotonicClock};
pub use shared::SharedAudioTaskRunner;

use crate::error::InputError;
use anyhow::Result;

/// Sample rate used for calls that omit one, until the caller configures another.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// One audio task: consumes a timestamped clip and produces a typed result.
///
/// Implementations do the real work (metering, classification, speech
/// recognition). The runner never inspects or wraps what they return, so
/// both `Ok` values and errors reach the caller exactly as produced here.
pub trait AudioTask {
    type Output;

    fn process(
        &mut self,
        audio: &[f32],
        sample_rate: u32,
        timestamp_ms: f64,
    ) -> Result<Self::Output>;

    fn name(&self) -> &'static str {
        "unknown_task"
    }
}

impl<T: AudioTask + ?Sized> AudioTask for Box<T> {
    type Output = T::Output;

    fn process(
        &mut self,
        audio: &[f32],
        sample_rate: u32,
        timestamp_ms: f64,
    ) -> Result<Self::Output> {
        (**self).process(audio, sample_rate, timestamp_ms)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Pick the sample rate for a call: an explicit rate always wins over the default.
pub fn resolve_sample_rate(explicit: Option<u32>, default: u32) -> u32 {
    explicit.unwrap_or(default)
}

pub(crate) fn validate_sample_rate(sample_rate: u32) -> Result<(), InputError> {
    if sample_rate == 0 {
        return Err(InputError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

/// Feeds single audio clips into an [`AudioTask`].
///
/// Holds the only piece of state the calling convention needs: the default
/// sample rate. It changes only through [`set_default_sample_rate`].
///
/// [`set_default_sample_rate`]: AudioTaskRunner::set_default_sample_rate
pub struct AudioTaskRunner<P, C = MonotonicClock> {
    task: P,
    clock: C,
    default_sample_rate: u32,
}

impl<P: AudioTask> AudioTaskRunner<P> {
    /// Runner with a monotonic clock whose epoch is the moment of construction.
    pub fn new(task: P) -> Self {
        Self::with_clock(task, MonotonicClock::new())
    }
}

impl<P: AudioTask, C: Clock> AudioTaskRunner<P, C> {
    pub fn with_clock(task: P, clock: C) -> Self {
        Self {
            task,
            clock,
            default_sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn default_sample_rate(&self) -> u32 {
        self.default_sample_rate
    }

    /// Sets the sample rate for calls that omit an explicit one.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidSampleRate`] for `0`; the stored default
    /// is left untouched in that case.
    pub fn set_default_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        validate_sample_rate(sample_rate)?;
        tracing::debug!(
            task = self.task.name(),
            previous = self.default_sample_rate,
            sample_rate,
            "default sample rate updated"
        );
        self.default_sample_rate = sample_rate;
        Ok(())
    }

    /// Sends one complete clip to the task and returns its result.
    ///
    /// `sample_rate` of `None` falls back to the configured default. The
    /// task's result, success or failure, is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidSampleRate`] for an explicit rate of `0`
    /// without invoking the task, otherwise whatever the task returns.
    pub fn process_audio_clip(
        &mut self,
        audio: &[f32],
        sample_rate: Option<u32>,
    ) -> Result<P::Output> {
        if let Some(rate) = sample_rate {
            validate_sample_rate(rate)?;
        }
        let sample_rate = resolve_sample_rate(sample_rate, self.default_sample_rate);
        let timestamp_ms = self.clock.now_ms();
        tracing::debug!(
            task = self.task.name(),
            samples = audio.len(),
            sample_rate,
            timestamp_ms,
            "processing audio clip"
        );
        self.task.process(audio, sample_rate, timestamp_ms)
    }

    pub fn task(&self) -> &P {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut P {
        &mut self.task
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_task(self) -> P {
        self.task
    }
}
