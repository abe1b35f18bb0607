use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod annotations;
pub mod experiments;
pub mod expression;
pub mod genes;
pub mod lists;
pub mod matrix;
pub mod reader;

use annotations::parse_go_annotations;
use experiments::{ExperimentEntry, parse_experiments};
use expression::{ExpressionTable, parse_expression_table};
use genes::parse_genes;
use reader::find_table;

use crate::model::gene::{Gene, GeneId};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Everything loaded from a data directory.
#[derive(Debug, Clone)]
pub struct DataBundle {
    pub genes: Vec<Gene>,
    pub experiments: Vec<LoadedExperiment>,
    pub go_annotations: Vec<(GeneId, String)>,
}

#[derive(Debug, Clone)]
pub struct LoadedExperiment {
    pub entry: ExperimentEntry,
    pub table: ExpressionTable,
}

pub fn load_data_dir(
    root: &Path,
    taxon: Option<&str>,
    include_nonspecific: bool,
) -> Result<DataBundle, InputError> {
    let genes_path = find_table(root, "genes.tsv")
        .ok_or_else(|| InputError::MissingInput("missing genes.tsv(.gz)".to_string()))?;
    let experiments_path = find_table(root, "experiments.tsv").ok_or_else(|| {
        InputError::MissingInput("missing experiments.tsv(.gz)".to_string())
    })?;

    tracing::info!(
        genes = %genes_path.display(),
        experiments = %experiments_path.display(),
        "discovered input tables"
    );

    let genes = parse_genes(&genes_path)?;
    let entries = parse_experiments(&experiments_path)?;

    let mut experiments = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(taxon) = taxon {
            if !entry.taxon.eq_ignore_ascii_case(taxon) {
                tracing::debug!(
                    experiment = %entry.short_name,
                    taxon = %entry.taxon,
                    "skipping experiment from another taxon"
                );
                continue;
            }
        }
        let matrix_path = root.join(&entry.matrix);
        let table = parse_expression_table(&matrix_path, include_nonspecific)?;
        tracing::info!(
            experiment = %entry.short_name,
            probes = table.probes.len(),
            samples = table.sample_names.len(),
            "loaded expression table"
        );
        experiments.push(LoadedExperiment { entry, table });
    }

    let go_annotations = match find_table(root, "go_annotations.tsv") {
        Some(path) => parse_go_annotations(&path)?,
        None => Vec::new(),
    };

    Ok(DataBundle {
        genes,
        experiments,
        go_annotations,
    })
}

pub fn parse_gene_id(raw: &str, what: &str, line_no: usize) -> Result<GeneId, InputError> {
    raw.trim()
        .parse::<u64>()
        .map(GeneId)
        .map_err(|_| InputError::Parse(format!("{what} line {line_no}: invalid gene id '{raw}'")))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
