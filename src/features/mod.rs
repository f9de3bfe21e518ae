mod delta;
mod mfcc;

use ndarray::{concatenate, s, Array2, Axis};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::types::ConditionedSignal;

/// Fixed-shape `(rows, max_len)` feature matrix, coefficients by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTensor(Array2<f32>);

impl FeatureTensor {
    pub fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.0
    }

    pub fn into_array(self) -> Array2<f32> {
        self.0
    }
}

/// Turns conditioned signals into model-ready cepstral tensors.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: PipelineConfig,
}

impl FeatureExtractor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Row count of every tensor this extractor produces.
    pub fn rows(&self) -> usize {
        self.config.feature_rows()
    }

    pub fn extract(&self, signal: &ConditionedSignal) -> FeatureTensor {
        let mfcc = mfcc::compute_mfcc(&signal.samples, signal.sample_rate, &self.config);
        let stacked = if self.config.include_deltas {
            let deltas = delta::delta(&mfcc, delta::DELTA_WINDOW);
            let delta_deltas = delta::delta(&deltas, delta::DELTA_WINDOW);
            // same frame count by construction
            concatenate(Axis(1), &[mfcc.view(), deltas.view(), delta_deltas.view()])
                .unwrap_or_else(|_| Array2::zeros((0, self.rows())))
        } else {
            mfcc
        };
        FeatureTensor(fit_time_axis(&stacked.t().to_owned(), self.rows(), self.config.max_len))
    }
}

/// Zero-pad on the right or truncate so the time axis is exactly `max_len`.
pub(crate) fn fit_time_axis(features: &Array2<f32>, rows: usize, max_len: usize) -> Array2<f32> {
    let mut fitted = Array2::zeros((rows, max_len));
    let keep_rows = rows.min(features.nrows());
    let keep_cols = max_len.min(features.ncols());
    fitted
        .slice_mut(s![..keep_rows, ..keep_cols])
        .assign(&features.slice(s![..keep_rows, ..keep_cols]));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_inputs_on_the_right() {
        let features = Array2::from_elem((3, 5), 1.0_f32);
        let fitted = fit_time_axis(&features, 3, 8);
        assert_eq!(fitted.dim(), (3, 8));
        assert!(fitted.slice(s![.., ..5]).iter().all(|&v| v == 1.0));
        assert!(fitted.slice(s![.., 5..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn truncates_long_inputs_to_leading_frames() {
        let features = Array2::from_shape_fn((2, 10), |(_, t)| t as f32);
        let fitted = fit_time_axis(&features, 2, 4);
        assert_eq!(fitted.dim(), (2, 4));
        assert_eq!(fitted[[1, 3]], 3.0);
    }

    #[test]
    fn empty_signal_gives_zero_tensor() {
        let extractor = FeatureExtractor::new(PipelineConfig::rich());
        let tensor = extractor.extract(&ConditionedSignal {
            samples: Vec::new(),
            sample_rate: 16_000,
        });
        assert_eq!(tensor.shape(), (120, 200));
        assert!(tensor.as_array().iter().all(|&v| v == 0.0));
    }
}
