//! Column statistics used for imputation.

/// Median of a set of values. Even counts average the two central elements.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Binarize a severity label: anything strictly above zero means present.
pub fn binarize_target(value: f64) -> u8 {
    if value > 0.0 {
        1
    } else {
        0
    }
}
