use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::pipeline::stage2_correlate::MIN_PAIRED_SAMPLES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisParams {
    /// Jointly present samples required for a correlation.
    pub min_paired_samples: usize,
    /// Probes with an expression rank at or below this are ignored.
    pub min_rank: f64,
    pub include_nonspecific: bool,
    pub histogram_bins: usize,
    pub max_background_pairs: usize,
    pub min_experiments_for_effect: usize,
    pub nan_placeholder: String,
    pub seed: Option<u64>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self::default_v1()
    }
}

impl AnalysisParams {
    pub fn default_v1() -> Self {
        Self {
            min_paired_samples: MIN_PAIRED_SAMPLES,
            min_rank: 0.0,
            include_nonspecific: false,
            histogram_bins: 2000,
            max_background_pairs: 100_000,
            min_experiments_for_effect: 1,
            nan_placeholder: String::new(),
            seed: None,
        }
    }

    /// Gemma's effect-size defaults: low-expressed probes are dropped.
    pub fn effect_size_v1() -> Self {
        let mut base = Self::default_v1();
        base.min_rank = 0.3;
        base
    }

    /// Reads a JSON params file; keys it sets replace those of `base`.
    pub fn from_json_file(path: &Path, base: &Self) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        let parse_err = |e: serde_json::Error| {
            InputError::Parse(format!("params file {}: {e}", path.display()))
        };
        let overrides: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(parse_err)?;
        let mut merged = match serde_json::to_value(base).map_err(parse_err)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        merged.extend(overrides);
        let params: AnalysisParams =
            serde_json::from_value(serde_json::Value::Object(merged)).map_err(parse_err)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.min_paired_samples < MIN_PAIRED_SAMPLES {
            return Err(InputError::InvalidInput(format!(
                "min_paired_samples must be at least {MIN_PAIRED_SAMPLES}"
            )));
        }
        if !(0.0..1.0).contains(&self.min_rank) {
            return Err(InputError::InvalidInput(
                "min_rank must be in [0, 1)".to_string(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(InputError::InvalidInput(
                "histogram_bins must be positive".to_string(),
            ));
        }
        if self.max_background_pairs == 0 {
            return Err(InputError::InvalidInput(
                "max_background_pairs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
