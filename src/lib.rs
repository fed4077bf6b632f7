pub mod audio;
pub mod config;
pub mod error;
mod lock;
pub mod pcm;
pub mod runner;
pub mod tasks;
pub mod telemetry;

pub(crate) use lock::lock_or_recover;
pub use error::InputError;
pub use runner::{
    AudioTask, AudioTaskRunner, Clock, MonotonicClock, SharedAudioTaskRunner, DEFAULT_SAMPLE_RATE,
};
