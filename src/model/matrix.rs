use std::collections::HashMap;

use crate::model::gene::{ExperimentId, GeneId};

/// (query, target, experiment) cube stored per filled (query, target) cell.
/// Cells never written read as NaN, so memory follows the computed pairs.
#[derive(Debug, Clone)]
pub struct CoexpressionMatrix {
    pub query: Vec<GeneId>,
    pub target: Vec<GeneId>,
    pub experiments: Vec<ExperimentId>,
    pub experiment_names: Vec<String>,
    query_pos: HashMap<GeneId, usize>,
    target_pos: HashMap<GeneId, usize>,
    cells: HashMap<(usize, usize), Vec<f64>>,
    missing: Vec<f64>,
}

impl CoexpressionMatrix {
    pub fn new_missing(
        query: Vec<GeneId>,
        target: Vec<GeneId>,
        experiments: Vec<ExperimentId>,
        experiment_names: Vec<String>,
    ) -> Self {
        let query_pos = first_positions(&query);
        let target_pos = first_positions(&target);
        let missing = vec![f64::NAN; experiments.len()];
        Self {
            query,
            target,
            experiments,
            experiment_names,
            query_pos,
            target_pos,
            cells: HashMap::new(),
            missing,
        }
    }

    pub fn n_query(&self) -> usize {
        self.query.len()
    }

    pub fn n_target(&self) -> usize {
        self.target.len()
    }

    pub fn n_experiments(&self) -> usize {
        self.experiments.len()
    }

    /// Number of (query, target) cells holding at least one written value.
    pub fn n_filled_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, q: usize, t: usize, e: usize) -> f64 {
        self.experiment_slice(q, t)[e]
    }

    pub fn set(&mut self, q: usize, t: usize, e: usize, value: f64) {
        let missing = &self.missing;
        let cell = self.cells.entry((q, t)).or_insert_with(|| missing.clone());
        cell[e] = value;
    }

    /// Values of one (query, target) cell along the experiment axis.
    pub fn experiment_slice(&self, q: usize, t: usize) -> &[f64] {
        self.cells.get(&(q, t)).unwrap_or(&self.missing)
    }

    pub fn query_index(&self, id: GeneId) -> Option<usize> {
        self.query_pos.get(&id).copied()
    }

    pub fn target_index(&self, id: GeneId) -> Option<usize> {
        self.target_pos.get(&id).copied()
    }

    /// Looks up a pair in either orientation.
    pub fn pair_slice(&self, first: GeneId, second: GeneId) -> Option<&[f64]> {
        if let (Some(q), Some(t)) = (self.query_index(first), self.target_index(second)) {
            return Some(self.experiment_slice(q, t));
        }
        if let (Some(q), Some(t)) = (self.query_index(second), self.target_index(first)) {
            return Some(self.experiment_slice(q, t));
        }
        None
    }
}

fn first_positions(ids: &[GeneId]) -> HashMap<GeneId, usize> {
    let mut pos = HashMap::with_capacity(ids.len());
    for (i, &id) in ids.iter().enumerate() {
        pos.entry(id).or_insert(i);
    }
    pos
}

/// Row-major 2-D matrix with string labels on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    values: Vec<f64>,
}

impl LabeledMatrix {
    pub fn new_missing(row_labels: Vec<String>, col_labels: Vec<String>) -> Self {
        let len = row_labels.len() * col_labels.len();
        Self {
            row_labels,
            col_labels,
            values: vec![f64::NAN; len],
        }
    }

    pub fn from_rows(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Option<Self> {
        if rows.len() != row_labels.len() || rows.iter().any(|r| r.len() != col_labels.len()) {
            return None;
        }
        Some(Self {
            row_labels,
            col_labels,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.col_labels.len() + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let n_cols = self.col_labels.len();
        self.values[row * n_cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let n_cols = self.col_labels.len();
        &self.values[row * n_cols..(row + 1) * n_cols]
    }

    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/matrix.rs"]
mod tests;
