use anyhow::{ensure, Result};

/// Linearly interpolate `samples` from `source_rate` onto a `target_rate` grid.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let step = source_rate as f64 / target_rate as f64;
    let output_len = ((samples.len() as f64) / step).ceil().max(1.0) as usize;
    let last = samples.len() - 1;

    let output = (0..output_len)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let t = (position - left as f64) as f32;
            samples[left] + (samples[right] - samples[left]) * t
        })
        .collect();
    Ok(output)
}
