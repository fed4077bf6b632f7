use super::{AudioTask, AudioTaskRunner, Clock, MonotonicClock};
use crate::lock_or_recover;
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Thread-safe handle around an [`AudioTaskRunner`].
///
/// Each operation holds the lock for its whole duration, so a default-rate
/// update never interleaves with a clip that is mid-flight: the clip sees
/// either the old default or the new one.
pub struct SharedAudioTaskRunner<P, C = MonotonicClock> {
    inner: Arc<Mutex<AudioTaskRunner<P, C>>>,
}

impl<P, C> Clone for SharedAudioTaskRunner<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: AudioTask, C: Clock> SharedAudioTaskRunner<P, C> {
    pub fn new(runner: AudioTaskRunner<P, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(runner)),
        }
    }

    pub fn default_sample_rate(&self) -> u32 {
        lock_or_recover(&*self.inner, "default_sample_rate").default_sample_rate()
    }

    pub fn set_default_sample_rate(&self, sample_rate: u32) -> Result<()> {
        lock_or_recover(&*self.inner, "set_default_sample_rate")
            .set_default_sample_rate(sample_rate)
    }

    pub fn process_audio_clip(&self, audio: &[f32], sample_rate: Option<u32>) -> Result<P::Output> {
        lock_or_recover(&*self.inner, "process_audio_clip")
            .process_audio_clip(audio, sample_rate)
    }

    /// Run `f` with exclusive access to the task, e.g. to read accumulated state.
    pub fn with_task<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let mut runner = lock_or_recover(&*self.inner, "with_task");
        f(runner.task_mut())
    }
}
