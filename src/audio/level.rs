//! Audio level monitoring
//!
//! Converts raw capture buffers into bounded loudness values for the
//! visualizer feed. Pure functions, no state.

/// RMS reference treated as full scale when normalizing for display.
const LEVEL_FULL_SCALE: f32 = 10_000.0;

/// Root mean square energy of a raw sample buffer
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: i64 = samples.iter().map(|&s| (s as i64).pow(2)).sum();
    (sum as f32 / samples.len() as f32).sqrt()
}

/// Bounded loudness in 0.0..=1.0 for visualization
pub fn normalized_level(samples: &[i16]) -> f32 {
    (rms(samples) / LEVEL_FULL_SCALE).clamp(0.0, 1.0)
}
