use std::io::BufRead;
use std::path::Path;

use crate::input::InputError;
use crate::input::reader::open_maybe_gz;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairLine {
    pub first: String,
    pub second: String,
    pub link_count: Option<u32>,
    pub line_no: usize,
}

/// One gene name per line; blank and `#` lines are skipped.
pub fn read_name_list(path: &Path) -> Result<Vec<String>, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut out = Vec::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let name = line.split('\t').next().unwrap_or(line).trim();
        out.push(name.to_string());
    }
    Ok(out)
}

/// Two names per line, tab-delimited when a tab is present, otherwise
/// whitespace-delimited. An optional third column is an integer link count.
pub fn read_pair_lines(path: &Path) -> Result<Vec<PairLine>, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut out = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cols: Vec<&str> = if line.contains('\t') {
            line.split('\t').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };
        if cols.len() < 2 || cols[0].is_empty() || cols[1].is_empty() {
            tracing::warn!(line = line_no, "pair line has fewer than two names; skipping");
            continue;
        }
        let link_count = match cols.get(2) {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<u32>().map_err(|_| {
                InputError::Parse(format!(
                    "pair file line {}: invalid link count '{}'",
                    line_no, raw
                ))
            })?),
            _ => None,
        };
        out.push(PairLine {
            first: cols[0].to_string(),
            second: cols[1].to_string(),
            link_count,
            line_no,
        });
    }
    Ok(out)
}
