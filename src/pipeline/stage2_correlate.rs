/// Smallest number of jointly present samples for a defined correlation.
pub const MIN_PAIRED_SAMPLES: usize = 3;

/// Index of the vector with the most non-missing values; ties keep the first.
pub fn select_representative(vectors: &[&[f64]]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, v) in vectors.iter().enumerate() {
        let present = v.iter().filter(|x| !x.is_nan()).count();
        match best {
            Some((_, count)) if count >= present => {}
            _ => best = Some((idx, present)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Number of samples present in both vectors.
pub fn paired_sample_count(a: &[f64], b: &[f64]) -> usize {
    if a.len() != b.len() {
        return 0;
    }
    a.iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .count()
}

/// Pearson correlation over pairwise-complete samples.
///
/// Returns NaN when the lengths differ, when fewer than `min_samples`
/// (never below [`MIN_PAIRED_SAMPLES`]) samples are present in both
/// vectors, or when either side has zero variance over those samples.
pub fn pearson_pairwise(a: &[f64], b: &[f64], min_samples: usize) -> f64 {
    if a.len() != b.len() {
        return f64::NAN;
    }
    let mut n = 0usize;
    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        n += 1;
        sum_a += x;
        sum_b += y;
    }
    if n < min_samples.max(MIN_PAIRED_SAMPLES) {
        return f64::NAN;
    }
    let mean_a = sum_a / n as f64;
    let mean_b = sum_b / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        let dx = x - mean_a;
        let dy = y - mean_b;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    let denom = (sxx * syy).sqrt();
    if !denom.is_finite() || denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Correlation of two genes given all of their probe vectors in one experiment.
pub fn correlate(vectors_a: &[&[f64]], vectors_b: &[&[f64]], min_samples: usize) -> f64 {
    let (Some(ia), Some(ib)) = (
        select_representative(vectors_a),
        select_representative(vectors_b),
    ) else {
        return f64::NAN;
    };
    pearson_pairwise(vectors_a[ia], vectors_b[ib], min_samples)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_correlate.rs"]
mod tests;
