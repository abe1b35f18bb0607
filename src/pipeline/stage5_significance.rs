use rand::Rng;
use thiserror::Error;

use crate::model::matrix::LabeledMatrix;
use crate::pipeline::stage4_background::Cohort;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignificanceError {
    #[error("k_max {k_max} needs more than {cohort} experiments with a background distribution")]
    InsufficientCohort { k_max: usize, cohort: usize },
}

/// Null samples of the k-th largest correlation across a cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledStatistic {
    pub k_max: usize,
    pub experiments: Vec<String>,
    pub values: Vec<f64>,
}

/// `k` counts from zero: 0 is the maximum.
pub fn kth_largest(draws: &[f64], k: usize) -> Option<f64> {
    let n = draws.len();
    if k >= n {
        return None;
    }
    let mut sorted = draws.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[n - 1 - k])
}

pub fn sample_kth_largest<R: Rng + ?Sized>(
    cohort: &Cohort,
    k_max: usize,
    num_samples: usize,
    rng: &mut R,
) -> Result<SampledStatistic, SignificanceError> {
    if k_max >= cohort.len() {
        return Err(SignificanceError::InsufficientCohort {
            k_max,
            cohort: cohort.len(),
        });
    }
    let mut draws = vec![0.0; cohort.len()];
    let mut values = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        for (slot, sampler) in draws.iter_mut().zip(&cohort.samplers) {
            *slot = sampler.sample(rng);
        }
        match kth_largest(&draws, k_max) {
            Some(v) => values.push(v),
            None => {
                return Err(SignificanceError::InsufficientCohort {
                    k_max,
                    cohort: cohort.len(),
                });
            }
        }
    }
    tracing::info!(k_max, samples = values.len(), cohort = cohort.len(), "null statistic sampled");
    Ok(SampledStatistic {
        k_max,
        experiments: cohort.names.clone(),
        values,
    })
}

/// Fraction of `sorted_null` (ascending, finite) that is `>= observed`.
pub fn empirical_p_value(observed: f64, sorted_null: &[f64]) -> f64 {
    if observed.is_nan() || sorted_null.is_empty() {
        return f64::NAN;
    }
    let below = sorted_null.partition_point(|&v| v < observed);
    (sorted_null.len() - below) as f64 / sorted_null.len() as f64
}

pub fn p_value_matrix(observed: &LabeledMatrix, null: &[f64]) -> LabeledMatrix {
    let mut sorted: Vec<f64> = null.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    if sorted.len() < null.len() {
        tracing::warn!(
            dropped = null.len() - sorted.len(),
            "ignoring NaN values in the null distribution"
        );
    }
    observed.map_values(|v| empirical_p_value(v, &sorted))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_significance.rs"]
mod tests;
