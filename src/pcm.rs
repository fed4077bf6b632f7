//! Raw PCM clip loading.
//!
//! Clips are headerless little-endian `f32` mono samples, the format most
//! audio tools can export directly (e.g. `ffmpeg -f f32le -ac 1`).

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// Read a whole clip from disk.
pub fn read_pcm_f32le(path: &Path) -> Result<Vec<f32>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read clip {}", path.display()))?;
    decode_pcm_f32le(&bytes).with_context(|| format!("invalid clip {}", path.display()))
}

/// Decode little-endian `f32` samples. A trailing partial sample is an error.
pub fn decode_pcm_f32le(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % SAMPLE_BYTES != 0 {
        bail!(
            "clip length {} is not a multiple of {SAMPLE_BYTES} bytes",
            bytes.len()
        );
    }
    Ok(bytes
        .chunks_exact(SAMPLE_BYTES)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Inverse of [`decode_pcm_f32le`]; used to write fixtures.
pub fn encode_pcm_f32le(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
