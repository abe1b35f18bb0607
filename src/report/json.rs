use serde::Serialize;

use crate::model::params::AnalysisParams;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub taxon: String,
    pub input: InputSummary,
    pub seed: u64,
    pub params: AnalysisParams,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub data_dir: String,
    pub pair_source: String,
    pub n_pairs: usize,
    pub n_query: usize,
    pub n_target: usize,
    pub n_experiments: usize,
    pub n_pairs_with_data: usize,
    pub missing_genes: Vec<String>,
}

pub fn render_summary_json(summary: &RunSummary) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(summary)?;
    out.push('\n');
    Ok(out)
}
