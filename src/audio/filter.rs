//! Speech-band conditioning: Butterworth band-pass and peak normalization.

use std::f64::consts::PI;

/// Lowest usable high-pass corner in Hz.
pub const MIN_LOW_HZ: f64 = 20.0;
/// Upper corner never exceeds this fraction of Nyquist.
pub const NYQUIST_FRACTION: f64 = 0.99;

/// Section Q values of a 4th-order Butterworth response.
const BUTTERWORTH_Q: [f64; 2] = [0.541_196_100_146_197, 1.306_562_964_876_376_8];

#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn low_pass(cutoff: f64, sample_rate: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self::normalized(
            (1.0 - cos) / 2.0,
            1.0 - cos,
            (1.0 - cos) / 2.0,
            a0,
            -2.0 * cos,
            1.0 - alpha,
        )
    }

    fn high_pass(cutoff: f64, sample_rate: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self::normalized(
            (1.0 + cos) / 2.0,
            -(1.0 + cos),
            (1.0 + cos) / 2.0,
            a0,
            -2.0 * cos,
            1.0 - alpha,
        )
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    // transposed direct form II
    fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// Clamp the requested band to what the sample rate supports.
///
/// Returns `None` when the band collapses (`low >= high` after clamping).
pub fn clamp_band(sample_rate: u32, low: f64, high: f64) -> Option<(f64, f64)> {
    let nyquist = 0.5 * sample_rate as f64;
    let low = low.max(MIN_LOW_HZ);
    let high = high.min(nyquist * NYQUIST_FRACTION);
    (low < high).then_some((low, high))
}

/// 4th-order Butterworth band-pass between `low` and `high` Hz.
///
/// A collapsed band is not an error: the input comes back unmodified.
pub fn band_pass(signal: &[f32], sample_rate: u32, low: f64, high: f64) -> Vec<f32> {
    let Some((low, high)) = clamp_band(sample_rate, low, high) else {
        return signal.to_vec();
    };
    let rate = sample_rate as f64;
    let mut sections: Vec<Biquad> = BUTTERWORTH_Q
        .iter()
        .map(|&q| Biquad::high_pass(low, rate, q))
        .chain(BUTTERWORTH_Q.iter().map(|&q| Biquad::low_pass(high, rate, q)))
        .collect();

    signal
        .iter()
        .map(|&sample| {
            sections
                .iter_mut()
                .fold(sample as f64, |acc, section| section.process(acc)) as f32
        })
        .collect()
}

/// Scale so the peak absolute sample is 1.0. An all-zero signal is left alone.
pub fn normalize_peak(signal: &mut [f32]) {
    let peak = super::trim::peak(signal);
    if peak == 0.0 || !peak.is_finite() {
        return;
    }
    let gain = 1.0 / peak;
    signal.iter_mut().for_each(|s| *s *= gain);
}
