use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::gene::Experiment;
use crate::model::params::AnalysisParams;
use crate::pipeline::stage2_correlate::pearson_pairwise;
use crate::source::ExpressionVectorSource;

/// Discretized distribution of correlations over `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSampler {
    cumulative: Vec<u64>,
    total: u64,
}

impl HistogramSampler {
    /// `None` when `values` holds nothing finite or `bins` is zero.
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let mut counts = vec![0u64; bins];
        for &v in values {
            if !v.is_finite() {
                continue;
            }
            counts[bin_index(v, bins)] += 1;
        }
        let mut cumulative = Vec::with_capacity(bins);
        let mut total = 0u64;
        for c in counts {
            total += c;
            cumulative.push(total);
        }
        if total == 0 {
            return None;
        }
        Some(Self { cumulative, total })
    }

    pub fn bins(&self) -> usize {
        self.cumulative.len()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Picks a bin by inverse CDF, then a uniform point inside it.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = rng.gen_range(0..self.total);
        let bin = self.cumulative.partition_point(|&c| c <= u);
        let width = 2.0 / self.bins() as f64;
        let lo = -1.0 + bin as f64 * width;
        (lo + rng.r#gen::<f64>() * width).clamp(-1.0, 1.0)
    }
}

fn bin_index(v: f64, bins: usize) -> usize {
    let pos = (v.clamp(-1.0, 1.0) + 1.0) / 2.0 * bins as f64;
    (pos.floor() as usize).min(bins - 1)
}

/// Correlations between probe vectors of one experiment, all probes included.
pub fn background_correlations<R: Rng + ?Sized>(
    source: &dyn ExpressionVectorSource,
    experiment: &Experiment,
    params: &AnalysisParams,
    rng: &mut R,
) -> Vec<f64> {
    let vectors: Vec<&[f64]> = source
        .all_vectors(experiment.id)
        .into_iter()
        .filter(|p| params.min_rank <= 0.0 || p.rank > params.min_rank)
        .map(|p| p.values)
        .collect();
    let n = vectors.len();
    if n < 2 {
        return Vec::new();
    }
    let possible = n * (n - 1) / 2;
    let mut out = Vec::with_capacity(possible.min(params.max_background_pairs));

    if possible <= params.max_background_pairs {
        for i in 0..n {
            for j in (i + 1)..n {
                let r = pearson_pairwise(vectors[i], vectors[j], params.min_paired_samples);
                if r.is_finite() {
                    out.push(r);
                }
            }
        }
    } else {
        tracing::debug!(
            experiment = %experiment.short_name,
            possible,
            drawn = params.max_background_pairs,
            "sampling background probe pairs"
        );
        let mut drawn = 0usize;
        while drawn < params.max_background_pairs {
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            if a == b {
                continue;
            }
            drawn += 1;
            let r = pearson_pairwise(vectors[a], vectors[b], params.min_paired_samples);
            if r.is_finite() {
                out.push(r);
            }
        }
    }
    out
}

/// Experiments that contribute one sampler each to the null draws.
#[derive(Debug, Clone, Default)]
pub struct Cohort {
    pub samplers: Vec<HistogramSampler>,
    pub names: Vec<String>,
    pub excluded: Vec<String>,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}

pub fn build_cohort<R: Rng + ?Sized>(
    source: &dyn ExpressionVectorSource,
    experiments: &[Experiment],
    params: &AnalysisParams,
    rng: &mut R,
) -> Cohort {
    let mut cohort = Cohort::default();
    for experiment in experiments {
        let values = background_correlations(source, experiment, params, rng);
        match HistogramSampler::from_values(&values, params.histogram_bins) {
            Some(sampler) => {
                tracing::info!(
                    experiment = %experiment.short_name,
                    correlations = sampler.total(),
                    "background histogram built"
                );
                cohort.samplers.push(sampler);
                cohort.names.push(experiment.short_name.clone());
            }
            None => {
                tracing::warn!(
                    experiment = %experiment.short_name,
                    "no background correlations; experiment left out of the cohort"
                );
                cohort.excluded.push(experiment.short_name.clone());
            }
        }
    }
    cohort
}

/// Seeded generator plus the seed in use, so a run can be replayed.
pub fn make_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_background.rs"]
mod tests;
