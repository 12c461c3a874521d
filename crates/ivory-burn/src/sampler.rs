//! Temperature sampling over next-note distributions.

/// Added to every probability before taking its logarithm.
pub const PROBABILITY_FLOOR: f64 = 1e-10;

/// Rescales a distribution by `temperature` and renormalizes it.
///
/// Computes `exp(ln(p + 1e-10) / T)` for each entry. Below 1.0 the
/// distribution sharpens toward its mode, above 1.0 it flattens.
pub fn apply_temperature(probs: &[f32], temperature: f64) -> Vec<f64> {
    let scaled: Vec<f64> = probs
        .iter()
        .map(|&p| (p.max(0.0) as f64 + PROBABILITY_FLOOR).ln() / temperature)
        .collect();

    // Shift by the max so that exp() cannot overflow at low temperatures.
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scaled.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return vec![0.0; probs.len()];
    }
    exp.into_iter().map(|e| e / sum).collect()
}

/// Picks the first index whose cumulative probability reaches `draw`.
///
/// `draw` is a uniform number in `[0, 1)`. If rounding leaves the total just
/// under `draw`, the last index with non-zero probability is returned. `None`
/// only for an all-zero distribution.
pub fn sample_index(probs: &[f64], draw: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if draw <= cumulative && p > 0.0 {
            return Some(i);
        }
    }
    probs.iter().rposition(|&p| p > 0.0)
}
