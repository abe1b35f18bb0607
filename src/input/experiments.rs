use std::collections::HashSet;
use std::path::Path;

use crate::input::InputError;
use crate::input::reader::TableReader;
use crate::model::gene::ExperimentId;

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentEntry {
    pub id: ExperimentId,
    pub short_name: String,
    pub taxon: String,
    pub matrix: String,
}

pub fn parse_experiments(path: &Path) -> Result<Vec<ExperimentEntry>, InputError> {
    let mut reader = TableReader::open(path)?;
    reader.expect_header(
        "experiments.tsv",
        &["experiment_id", "short_name", "taxon", "matrix"],
    )?;

    let mut out = Vec::new();
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    while let Some(cols) = reader.next_fields()? {
        let line_no = reader.line_no();
        if cols.len() < 4 {
            return Err(InputError::Parse(format!(
                "experiments line {} has <4 columns",
                line_no
            )));
        }
        let id = cols[0].parse::<u64>().map(ExperimentId).map_err(|_| {
            InputError::Parse(format!(
                "experiments line {}: invalid experiment id '{}'",
                line_no, cols[0]
            ))
        })?;
        if cols[1].is_empty() || cols[3].is_empty() {
            return Err(InputError::Parse(format!(
                "experiments line {}: short_name and matrix are required",
                line_no
            )));
        }
        if !ids.insert(id) || !names.insert(cols[1].clone()) {
            return Err(InputError::InvalidInput(format!(
                "experiments line {}: duplicate experiment '{}'",
                line_no, cols[1]
            )));
        }
        out.push(ExperimentEntry {
            id,
            short_name: cols[1].clone(),
            taxon: cols[2].clone(),
            matrix: cols[3].clone(),
        });
    }

    if out.is_empty() {
        return Err(InputError::Parse("experiments file is empty".to_string()));
    }
    Ok(out)
}
