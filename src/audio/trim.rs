//! Signal statistics and boundary-silence trimming.

/// Analysis frame used for boundary trimming.
pub const TRIM_FRAME_LENGTH: usize = 2048;
pub const TRIM_HOP_LENGTH: usize = 512;

/// Floor applied to frame power before converting to dB.
const POWER_FLOOR: f64 = 1e-10;

/// Root-mean-square amplitude. Zero for an empty signal.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / signal.len() as f64).sqrt() as f32
}

/// Largest absolute sample value.
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
}

/// Strip leading and trailing frames quieter than `top_db` below the loudest frame.
///
/// Interior pauses are never touched: only the span between the first and last
/// non-silent frame is kept.
pub fn trim_edges(signal: &[f32], top_db: f32) -> &[f32] {
    let (start, end) = non_silent_span(signal, top_db, TRIM_FRAME_LENGTH, TRIM_HOP_LENGTH);
    &signal[start..end]
}

/// Sample range `[start, end)` covering every non-silent frame.
///
/// Frames are centered: frame `t` spans `t * hop ± frame_length / 2`, with the
/// signal zero-padded at both ends. The span runs from the first loud frame's
/// center to one hop past the last loud frame's center.
pub fn non_silent_span(
    signal: &[f32],
    top_db: f32,
    frame_length: usize,
    hop_length: usize,
) -> (usize, usize) {
    if signal.is_empty() {
        return (0, 0);
    }
    let hop = hop_length.max(1);
    let half = frame_length / 2;
    let frame_power: Vec<f64> = frame_centers(signal.len(), hop)
        .map(|center| {
            let start = center.saturating_sub(half);
            let end = (center + frame_length - half).min(signal.len());
            let window = &signal[start..end];
            window.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / frame_length.max(1) as f64
        })
        .collect();

    let reference = frame_power
        .iter()
        .copied()
        .fold(0.0_f64, f64::max)
        .max(POWER_FLOOR);
    let threshold = -(top_db as f64);
    let is_loud = |power: f64| 10.0 * (power.max(POWER_FLOOR) / reference).log10() > threshold;

    let first = frame_power.iter().position(|&p| is_loud(p));
    let last = frame_power.iter().rposition(|&p| is_loud(p));
    match (first, last) {
        (Some(first), Some(last)) => {
            let start = (first * hop).min(signal.len());
            let end = ((last + 1) * hop).min(signal.len());
            (start, end.max(start))
        }
        _ => (0, 0),
    }
}

/// Centers of the `1 + len / hop` frames covering a padded signal.
fn frame_centers(len: usize, hop: usize) -> impl Iterator<Item = usize> {
    (0..=len / hop).map(move |t| t * hop)
}
