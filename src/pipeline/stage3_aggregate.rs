use std::collections::{HashMap, HashSet};

use statrs::distribution::{ContinuousCDF, Normal};

use crate::model::gene::{Experiment, GeneId, GeneNames};
use crate::model::matrix::{CoexpressionMatrix, LabeledMatrix};
use crate::model::pair::{CorrelationResult, EffectSize, GenePair, nan_max, nan_mean};
use crate::model::params::AnalysisParams;
use crate::pipeline::stage1_pairs::PairCatalog;
use crate::pipeline::stage2_correlate::{correlate, paired_sample_count, select_representative};
use crate::source::ExpressionVectorSource;

/// Cubes filled by one calculate pass; all share the same axes.
#[derive(Debug, Clone)]
pub struct CoexpressionMatrices {
    pub correlation: CoexpressionMatrix,
    pub sample_sizes: CoexpressionMatrix,
    pub expression_levels: CoexpressionMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldAxis {
    Query,
    Target,
    Experiment,
}

struct GeneVectors<'a> {
    vectors: Vec<&'a [f64]>,
    representative: usize,
    rank: f64,
}

impl GeneVectors<'_> {
    fn representative(&self) -> &[f64] {
        self.vectors[self.representative]
    }
}

/// Fills every query x target cell in every experiment.
pub fn calculate_coexpression_matrices(
    source: &dyn ExpressionVectorSource,
    experiments: &[Experiment],
    query: &[GeneId],
    target: &[GeneId],
    params: &AnalysisParams,
) -> CoexpressionMatrices {
    let mut cells = Vec::with_capacity(query.len() * target.len());
    for (q, qid) in query.iter().enumerate() {
        for (t, tid) in target.iter().enumerate() {
            if qid != tid {
                cells.push((q, t));
            }
        }
    }
    fill_cells(source, experiments, query, target, &cells, params)
}

/// Fills only the cells of the listed pairs; the rest of the grid stays missing.
pub fn calculate_pair_matrices(
    source: &dyn ExpressionVectorSource,
    experiments: &[Experiment],
    query: &[GeneId],
    target: &[GeneId],
    pairs: &[GenePair],
    params: &AnalysisParams,
) -> CoexpressionMatrices {
    let axes = CoexpressionMatrix::new_missing(query.to_vec(), target.to_vec(), Vec::new(), Vec::new());
    let mut cells = Vec::with_capacity(pairs.len());
    for pair in pairs.iter().filter(|p| !p.is_self_pair()) {
        match (axes.query_index(pair.first), axes.target_index(pair.second)) {
            (Some(q), Some(t)) => cells.push((q, t)),
            _ => match (axes.query_index(pair.second), axes.target_index(pair.first)) {
                (Some(q), Some(t)) => cells.push((q, t)),
                _ => tracing::debug!(pair = ?pair, "pair genes not on the query/target axes"),
            },
        }
    }
    fill_cells(source, experiments, query, target, &cells, params)
}

/// Dispatches on how the catalog was built: listed pairs or a full grid.
pub fn calculate_catalog_matrices(
    source: &dyn ExpressionVectorSource,
    experiments: &[Experiment],
    catalog: &PairCatalog,
    params: &AnalysisParams,
) -> CoexpressionMatrices {
    if catalog.listed {
        calculate_pair_matrices(
            source,
            experiments,
            &catalog.query,
            &catalog.target,
            &catalog.pairs,
            params,
        )
    } else {
        calculate_coexpression_matrices(source, experiments, &catalog.query, &catalog.target, params)
    }
}

fn fill_cells(
    source: &dyn ExpressionVectorSource,
    experiments: &[Experiment],
    query: &[GeneId],
    target: &[GeneId],
    cells: &[(usize, usize)],
    params: &AnalysisParams,
) -> CoexpressionMatrices {
    let experiment_ids: Vec<_> = experiments.iter().map(|e| e.id).collect();
    let experiment_names: Vec<_> = experiments.iter().map(|e| e.short_name.clone()).collect();
    let blank = CoexpressionMatrix::new_missing(
        query.to_vec(),
        target.to_vec(),
        experiment_ids,
        experiment_names,
    );
    let mut correlation = blank.clone();
    let mut sample_sizes = blank.clone();
    let mut expression_levels = blank;

    let mut genes: Vec<GeneId> = Vec::with_capacity(query.len() + target.len());
    let mut seen = HashSet::new();
    for &(q, t) in cells {
        for id in [query[q], target[t]] {
            if seen.insert(id) {
                genes.push(id);
            }
        }
    }

    for (e, experiment) in experiments.iter().enumerate() {
        let mut by_gene: HashMap<GeneId, GeneVectors<'_>> = HashMap::with_capacity(genes.len());
        for &gene in &genes {
            let probes: Vec<_> = source
                .gene_vectors(experiment.id, gene)
                .into_iter()
                .filter(|p| params.min_rank <= 0.0 || p.rank > params.min_rank)
                .collect();
            let vectors: Vec<&[f64]> = probes.iter().map(|p| p.values).collect();
            if let Some(representative) = select_representative(&vectors) {
                tracing::trace!(
                    gene = %gene,
                    probe = probes[representative].probe,
                    candidates = probes.len(),
                    "representative probe"
                );
                by_gene.insert(
                    gene,
                    GeneVectors {
                        rank: probes[representative].rank,
                        vectors,
                        representative,
                    },
                );
            }
        }

        let mut filled = 0usize;
        for &(q, t) in cells {
            let (Some(qv), Some(tv)) = (by_gene.get(&query[q]), by_gene.get(&target[t])) else {
                continue;
            };
            let r = correlate(&qv.vectors, &tv.vectors, params.min_paired_samples);
            if r.is_nan() {
                continue;
            }
            correlation.set(q, t, e, r);
            let n = paired_sample_count(qv.representative(), tv.representative());
            sample_sizes.set(q, t, e, n as f64);
            expression_levels.set(q, t, e, (qv.rank + tv.rank) / 2.0);
            filled += 1;
        }

        tracing::info!(
            experiment = %experiment.short_name,
            index = e + 1,
            total = experiments.len(),
            samples = experiment.n_samples,
            genes_with_data = by_gene.len(),
            cells = cells.len(),
            correlations = filled,
            "computed correlations"
        );
    }

    CoexpressionMatrices {
        correlation,
        sample_sizes,
        expression_levels,
    }
}

/// Maximum (signed) over `axis`, ignoring missing cells.
pub fn max_fold(matrix: &CoexpressionMatrix, axis: FoldAxis, names: &GeneNames) -> LabeledMatrix {
    let query_labels: Vec<String> = matrix.query.iter().map(|&g| names.name(g)).collect();
    let target_labels: Vec<String> = matrix.target.iter().map(|&g| names.name(g)).collect();
    let (nq, nt, ne) = (matrix.n_query(), matrix.n_target(), matrix.n_experiments());

    match axis {
        FoldAxis::Experiment => {
            let mut out = LabeledMatrix::new_missing(query_labels, target_labels);
            for q in 0..nq {
                for t in 0..nt {
                    out.set(q, t, nan_max(matrix.experiment_slice(q, t).iter().copied()));
                }
            }
            out
        }
        FoldAxis::Target => {
            let mut out =
                LabeledMatrix::new_missing(query_labels, matrix.experiment_names.clone());
            for q in 0..nq {
                for e in 0..ne {
                    out.set(q, e, nan_max((0..nt).map(|t| matrix.get(q, t, e))));
                }
            }
            out
        }
        FoldAxis::Query => {
            let mut out =
                LabeledMatrix::new_missing(target_labels, matrix.experiment_names.clone());
            for t in 0..nt {
                for e in 0..ne {
                    out.set(t, e, nan_max((0..nq).map(|q| matrix.get(q, t, e))));
                }
            }
            out
        }
    }
}

/// Reshapes the cube into one row per pair and one column per experiment.
pub fn flatten_experiments(
    matrix: &CoexpressionMatrix,
    pairs: &[GenePair],
    names: &GeneNames,
    drop_empty: bool,
) -> LabeledMatrix {
    let rows: Vec<Vec<f64>> = pairs
        .iter()
        .map(|p| pair_values(matrix, p))
        .collect();

    let keep: Vec<usize> = (0..matrix.n_experiments())
        .filter(|&e| !drop_empty || rows.iter().any(|r| !r[e].is_nan()))
        .collect();
    if keep.len() < matrix.n_experiments() {
        tracing::info!(
            dropped = matrix.n_experiments() - keep.len(),
            "experiments without data for any pair left out of the report"
        );
    }

    let row_labels = pairs.iter().map(|p| names.pair_label(p)).collect();
    let col_labels = keep
        .iter()
        .map(|&e| matrix.experiment_names[e].clone())
        .collect();
    let rows = rows
        .into_iter()
        .map(|r| keep.iter().map(|&e| r[e]).collect())
        .collect();
    LabeledMatrix::from_rows(row_labels, col_labels, rows)
        .unwrap_or_else(|| LabeledMatrix::new_missing(Vec::new(), Vec::new()))
}

fn pair_values(matrix: &CoexpressionMatrix, pair: &GenePair) -> Vec<f64> {
    matrix
        .pair_slice(pair.first, pair.second)
        .map(<[f64]>::to_vec)
        .unwrap_or_else(|| vec![f64::NAN; matrix.n_experiments()])
}

pub fn collect_results(
    matrices: &CoexpressionMatrices,
    catalog: &PairCatalog,
    params: &AnalysisParams,
) -> Vec<CorrelationResult> {
    catalog
        .pairs
        .iter()
        .zip(&catalog.link_counts)
        .map(|(pair, link_count)| {
            let correlations = pair_values(&matrices.correlation, pair);
            let sizes = pair_values(&matrices.sample_sizes, pair);
            let levels = pair_values(&matrices.expression_levels, pair);
            let n_experiments = correlations.iter().filter(|v| !v.is_nan()).count();
            CorrelationResult {
                pair: *pair,
                max_correlation: nan_max(correlations.iter().copied()),
                n_experiments,
                mean_expression_level: nan_mean(levels),
                effect_size: fixed_effect_size(
                    &correlations,
                    &sizes,
                    params.min_experiments_for_effect,
                ),
                link_count: *link_count,
                correlations,
            }
        })
        .collect()
}

/// Fixed-effects combination of per-experiment correlations via Fisher's z,
/// weighting each experiment by `n - 3`.
pub fn fixed_effect_size(correlations: &[f64], sample_sizes: &[f64], min_experiments: usize) -> EffectSize {
    const R_LIMIT: f64 = 1.0 - 1e-12;
    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    let mut used = 0usize;
    for (&r, &n) in correlations.iter().zip(sample_sizes) {
        if !r.is_finite() || !n.is_finite() || n <= 3.0 {
            continue;
        }
        let w = n - 3.0;
        sum_w += w;
        sum_wz += w * r.clamp(-R_LIMIT, R_LIMIT).atanh();
        used += 1;
    }
    if used == 0 || used < min_experiments || sum_w <= 0.0 {
        return EffectSize::missing();
    }
    let z = sum_wz / sum_w;
    let z_score = z * sum_w.sqrt();
    let p_value = match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * normal.sf(z_score.abs())).min(1.0),
        Err(_) => f64::NAN,
    };
    EffectSize {
        value: z.tanh(),
        p_value,
        n_experiments: used,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_aggregate.rs"]
mod tests;
