//! Synthetic signals for tests, benches and demos.
//!
//! Every generator is deterministic so rendered output can be compared
//! across runs.

use std::f32::consts::PI;

use super::{AudioError, PlanarBuffer};

fn frame_count(sample_rate: u32, seconds: f32) -> usize {
    (seconds * sample_rate as f32) as usize
}

/// A constant-amplitude sine wave.
pub fn sine(frequency: f32, sample_rate: u32, seconds: f32, amplitude: f32) -> Vec<f32> {
    (0..frame_count(sample_rate, seconds))
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// A sine whose amplitude rises linearly from 0 to `peak`.
///
/// Peak envelopes of this signal grow monotonically, which makes column
/// ordering easy to check.
pub fn swell(frequency: f32, sample_rate: u32, seconds: f32, peak: f32) -> Vec<f32> {
    let n = frame_count(sample_rate, seconds);
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let gain = peak * i as f32 / n.max(1) as f32;
            gain * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Uniform noise from a seeded LCG.
pub fn white_noise(sample_rate: u32, seconds: f32, amplitude: f32, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..frame_count(sample_rate, seconds))
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
            amplitude * (unit * 2.0 - 1.0)
        })
        .collect()
}

/// Short decaying clicks every `60 / bpm` seconds, silence in between.
pub fn click_track(bpm: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    let n = frame_count(sample_rate, seconds);
    let interval = ((60.0 / bpm * sample_rate as f32) as usize).max(1);
    let click_len = ((sample_rate as f32 * 0.01) as usize).max(1);

    let mut samples = vec![0.0; n];
    for start in (0..n).step_by(interval) {
        for (i, sample) in samples[start..n.min(start + click_len)].iter_mut().enumerate() {
            let t = i as f32 / sample_rate as f32;
            let decay = (1.0 - i as f32 / click_len as f32).powi(2);
            *sample = decay * (2.0 * PI * 1000.0 * t).sin();
        }
    }
    samples
}

/// Stereo test buffer: a swell on the left, noise on the right.
pub fn stereo_fixture(sample_rate: u32, seconds: f32) -> Result<PlanarBuffer, AudioError> {
    PlanarBuffer::new(
        vec![
            swell(220.0, sample_rate, seconds, 0.9),
            white_noise(sample_rate, seconds, 0.4, 7),
        ],
        sample_rate,
    )
}
