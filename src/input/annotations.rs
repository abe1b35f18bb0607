use std::path::Path;

use crate::input::reader::TableReader;
use crate::input::{InputError, parse_gene_id};
use crate::model::gene::GeneId;

pub fn parse_go_annotations(path: &Path) -> Result<Vec<(GeneId, String)>, InputError> {
    let mut reader = TableReader::open(path)?;
    reader.expect_header("go_annotations.tsv", &["gene_id", "go_term"])?;

    let mut out = Vec::new();
    while let Some(cols) = reader.next_fields()? {
        let line_no = reader.line_no();
        if cols.len() < 2 || cols[1].is_empty() {
            tracing::warn!(line = line_no, "GO annotation line has no term; skipping");
            continue;
        }
        let gene = parse_gene_id(&cols[0], "go_annotations", line_no)?;
        out.push((gene, normalize_go_term(&cols[1])));
    }
    Ok(out)
}

/// `GO_0008150` and `go:0008150` both become `GO:0008150`.
pub fn normalize_go_term(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    match upper.strip_prefix("GO_") {
        Some(rest) => format!("GO:{rest}"),
        None => upper,
    }
}
