use std::collections::HashSet;
use std::path::Path;

use crate::input::reader::TableReader;
use crate::input::{InputError, parse_gene_id};
use crate::model::gene::Gene;

pub fn parse_genes(path: &Path) -> Result<Vec<Gene>, InputError> {
    let mut reader = TableReader::open(path)?;
    reader.expect_header("genes.tsv", &["gene_id", "symbol"])?;

    let mut genes = Vec::new();
    let mut seen = HashSet::new();
    while let Some(cols) = reader.next_fields()? {
        let line_no = reader.line_no();
        if cols.len() < 4 {
            return Err(InputError::Parse(format!(
                "genes line {} has <4 columns",
                line_no
            )));
        }
        let id = parse_gene_id(&cols[0], "genes", line_no)?;
        if !seen.insert(id) {
            tracing::warn!(gene_id = %id, line = line_no, "duplicate gene id; keeping first");
            continue;
        }
        let official_name = if cols[2].is_empty() {
            None
        } else {
            Some(cols[2].clone())
        };
        genes.push(Gene {
            id,
            symbol: cols[1].clone(),
            official_name,
            taxon: cols[3].clone(),
        });
    }

    if genes.is_empty() {
        return Err(InputError::Parse("genes file is empty".to_string()));
    }
    Ok(genes)
}

/// Case-insensitive lookup key for symbols and names; Ensembl version suffixes are dropped.
pub fn normalize_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let upper = trimmed.to_ascii_uppercase();
    if let Some((left, right)) = upper.rsplit_once('.') {
        if left.starts_with("ENS") && right.chars().all(|c| c.is_ascii_digit()) {
            return left.to_string();
        }
    }
    upper
}
