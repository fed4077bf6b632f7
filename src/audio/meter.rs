/// Level reported for silence and empty clips.
pub const METER_FLOOR_DB: f32 = -60.0;

/// Root-mean-square level in dBFS, floored at [`METER_FLOOR_DB`].
pub fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return METER_FLOOR_DB;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    amplitude_to_db(energy.sqrt())
}

/// Absolute peak level in dBFS, floored at [`METER_FLOOR_DB`].
pub fn peak_db(samples: &[f32]) -> f32 {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    amplitude_to_db(peak)
}

fn amplitude_to_db(amplitude: f32) -> f32 {
    let db = 20.0 * amplitude.max(1e-6).log10();
    db.max(METER_FLOOR_DB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_db_handles_empty() {
        assert_eq!(rms_db(&[]), METER_FLOOR_DB);
        assert_eq!(peak_db(&[]), METER_FLOOR_DB);
    }

    #[test]
    fn full_scale_reads_zero_db() {
        let square = [1.0f32, -1.0, 1.0, -1.0];
        assert!(rms_db(&square).abs() < 1e-4);
        assert!(peak_db(&square).abs() < 1e-4);
    }

    #[test]
    fn half_scale_peak_is_about_minus_six() {
        let db = peak_db(&[0.0, -0.5, 0.25]);
        assert!((db + 6.02).abs() < 0.01, "got {db}");
    }

    #[test]
    fn silence_clamps_to_floor() {
        assert_eq!(rms_db(&[0.0; 64]), METER_FLOOR_DB);
    }
}
