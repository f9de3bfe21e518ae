use ndarray::{Array1, Array2, Axis};

/// Frames on each side of the regression window.
pub(crate) const DELTA_WINDOW: usize = 2;

/// Time derivative of a `(frames, coeffs)` matrix by linear regression over
/// `±window` frames, replicating edge frames.
pub(crate) fn delta(input: &Array2<f32>, window: usize) -> Array2<f32> {
    let frames = input.len_of(Axis(0));
    let coeffs = input.len_of(Axis(1));
    if frames == 0 || window == 0 {
        return Array2::zeros((frames, coeffs));
    }
    let denominator = 2.0_f32 * (1..=window).map(|n| (n * n) as f32).sum::<f32>();

    let mut output = Array2::zeros((frames, coeffs));
    for (t, mut row) in output.axis_iter_mut(Axis(0)).enumerate() {
        let mut numerator = Array1::<f32>::zeros(coeffs);
        for n in 1..=window {
            let prev = input.row(t.saturating_sub(n));
            let next = input.row((t + n).min(frames - 1));
            numerator.scaled_add(n as f32, &(&next - &prev));
        }
        row.assign(&(numerator / denominator));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn linear_ramp_has_unit_slope_away_from_edges() {
        let ramp = Array2::from_shape_fn((9, 2), |(t, c)| (t * (c + 1)) as f32);
        let d = delta(&ramp, DELTA_WINDOW);
        assert!((d[[4, 0]] - 1.0).abs() < 1e-6);
        assert!((d[[4, 1]] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn constant_input_has_zero_delta() {
        let flat = array![[3.0_f32, -1.0], [3.0, -1.0], [3.0, -1.0]];
        assert!(delta(&flat, DELTA_WINDOW).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_input_stays_empty() {
        let empty = Array2::<f32>::zeros((0, 4));
        assert_eq!(delta(&empty, DELTA_WINDOW).shape(), &[0, 4]);
    }
}
