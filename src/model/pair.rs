use crate::model::gene::{GeneId, GeneNames};

/// An ordered gene pair. Correlations are kept in [`CorrelationResult`], never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenePair {
    pub first: GeneId,
    pub second: GeneId,
}

impl GenePair {
    pub fn new(first: GeneId, second: GeneId) -> Self {
        Self { first, second }
    }

    /// Orientation-free key used for deduplication.
    pub fn unordered_key(&self) -> (GeneId, GeneId) {
        if self.first <= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSize {
    pub value: f64,
    pub p_value: f64,
    pub n_experiments: usize,
}

impl EffectSize {
    pub fn missing() -> Self {
        Self {
            value: f64::NAN,
            p_value: f64::NAN,
            n_experiments: 0,
        }
    }
}

/// Per-pair outcome of the calculate phase. Read-only once built.
#[derive(Debug, Clone)]
pub struct CorrelationResult {
    pub pair: GenePair,
    pub correlations: Vec<f64>,
    pub max_correlation: f64,
    pub n_experiments: usize,
    pub mean_expression_level: f64,
    pub effect_size: EffectSize,
    pub link_count: Option<u32>,
}

impl CorrelationResult {
    pub fn label(&self, names: &GeneNames) -> String {
        names.pair_label(&self.pair)
    }
}

/// Maximum ignoring NaN; NaN when nothing is finite.
pub fn nan_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut best = f64::NAN;
    for v in values {
        if v.is_nan() {
            continue;
        }
        if best.is_nan() || v > best {
            best = v;
        }
    }
    best
}

/// Mean ignoring NaN; NaN when nothing is finite.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        if v.is_nan() {
            continue;
        }
        sum += v;
        n += 1;
    }
    if n == 0 { f64::NAN } else { sum / n as f64 }
}
