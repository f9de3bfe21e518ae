use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;
use ndarray::Array2;

use crate::config::PipelineConfig;

const MIN_FREQ: f64 = 20.0;

/// Cepstral coefficients per frame, shape `(frames, n_mfcc)`.
///
/// Frames are centered: the signal is zero-padded by `n_fft / 2` on both
/// sides, so any non-empty input yields at least one frame.
pub(crate) fn compute_mfcc(samples: &[f32], sample_rate: u32, config: &PipelineConfig) -> Array2<f32> {
    if samples.is_empty() {
        return Array2::zeros((0, config.n_mfcc));
    }
    let padding = config.n_fft / 2;
    let mut audio = vec![0.0_f64; samples.len() + 2 * padding];
    for (dst, &src) in audio[padding..].iter_mut().zip(samples) {
        *dst = src as f64;
    }

    let stft = spectrum::rstft(&audio, config.n_fft, config.hop_length, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    let power = analysis::make_power_spectrogram(&magnitude);

    let freqs = spectrum::rfftfreq(config.n_fft, sample_rate);
    let filterbank = MelFilterbank::new(
        MIN_FREQ,
        (sample_rate as f64) / 2.0,
        config.n_mels,
        &freqs,
        true,
    );
    let mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);
    let mfcc = analysis::mel::mfcc_spectrogram(&mel, config.n_mfcc, None);

    frames_to_array(&mfcc, config.n_mfcc)
}

/// Pack frame-major rows into an array, zero-filling short rows and
/// replacing non-finite values (log of silent frames) with 0.
fn frames_to_array(frames: &[Vec<f64>], width: usize) -> Array2<f32> {
    Array2::from_shape_fn((frames.len(), width), |(t, c)| {
        frames[t]
            .get(c)
            .map(|&v| v as f32)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    })
}
