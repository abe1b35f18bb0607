use std::path::Path;

use crate::input::reader::{TableReader, parse_missing_f64};
use crate::input::{InputError, parse_gene_id};
use crate::model::gene::GeneId;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRow {
    pub name: String,
    pub genes: Vec<GeneId>,
    pub values: Vec<f64>,
    /// Rank of the probe's mean expression within its experiment, in (0, 1].
    pub rank: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTable {
    pub sample_names: Vec<String>,
    pub probes: Vec<ProbeRow>,
}

pub fn parse_expression_table(
    path: &Path,
    include_nonspecific: bool,
) -> Result<ExpressionTable, InputError> {
    let mut reader = TableReader::open(path)?;
    let header = reader.expect_header("expression matrix", &["probe", "genes"])?;
    let sample_names: Vec<String> = header[2..].to_vec();
    if sample_names.is_empty() {
        return Err(InputError::Parse(format!(
            "{}: expression matrix has no sample columns",
            path.display()
        )));
    }

    let mut probes = Vec::new();
    let mut dropped_nonspecific = 0usize;
    while let Some(cols) = reader.next_fields()? {
        let line_no = reader.line_no();
        if cols.len() != sample_names.len() + 2 {
            return Err(InputError::Parse(format!(
                "{} line {}: expected {} columns, found {}",
                path.display(),
                line_no,
                sample_names.len() + 2,
                cols.len()
            )));
        }
        let mut genes = Vec::new();
        for raw in cols[1].split(',').filter(|s| !s.trim().is_empty()) {
            let id = parse_gene_id(raw, "expression matrix", line_no)?;
            if !genes.contains(&id) {
                genes.push(id);
            }
        }
        if genes.len() > 1 && !include_nonspecific {
            dropped_nonspecific += 1;
            continue;
        }
        let mut values = Vec::with_capacity(sample_names.len());
        for raw in &cols[2..] {
            let v = parse_missing_f64(raw).map_err(|_| {
                InputError::Parse(format!(
                    "{} line {}: invalid value '{}'",
                    path.display(),
                    line_no,
                    raw
                ))
            })?;
            values.push(v);
        }
        probes.push(ProbeRow {
            name: cols[0].clone(),
            genes,
            values,
            rank: 0.0,
        });
    }

    if dropped_nonspecific > 0 {
        tracing::debug!(
            file = %path.display(),
            dropped = dropped_nonspecific,
            "dropped probes mapped to more than one gene"
        );
    }

    assign_expression_ranks(&mut probes);
    Ok(ExpressionTable {
        sample_names,
        probes,
    })
}

/// Rank k/n of each probe's mean expression; probes without data get 0.
pub fn assign_expression_ranks(probes: &mut [ProbeRow]) {
    let means: Vec<f64> = probes.iter().map(|p| finite_mean(&p.values)).collect();
    let mut order: Vec<usize> = (0..probes.len()).filter(|&i| means[i].is_finite()).collect();
    order.sort_by(|&a, &b| means[a].total_cmp(&means[b]).then(a.cmp(&b)));
    let n = order.len();
    for probe in probes.iter_mut() {
        probe.rank = 0.0;
    }
    for (pos, &idx) in order.iter().enumerate() {
        probes[idx].rank = (pos + 1) as f64 / n as f64;
    }
}

fn finite_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 { f64::NAN } else { sum / n as f64 }
}
