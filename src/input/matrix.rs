use std::io::BufRead;
use std::path::Path;

use crate::input::InputError;
use crate::input::reader::{open_maybe_gz, parse_missing_f64};
use crate::model::matrix::LabeledMatrix;

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixFile {
    pub corner: String,
    pub matrix: LabeledMatrix,
}

/// Reads a matrix written by the report writer: the first header cell is the
/// corner label, the first column holds row labels.
pub fn read_labeled_matrix(path: &Path) -> Result<MatrixFile, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    if reader.read_line(&mut buf)? == 0 {
        return Err(InputError::Parse(format!("{} is empty", path.display())));
    }
    let header: Vec<&str> = buf.trim_end_matches(['\n', '\r']).split('\t').collect();
    if header.len() < 2 {
        return Err(InputError::Parse(format!(
            "{}: matrix header needs a corner label and at least one column",
            path.display()
        )));
    }
    let corner = header[0].trim().to_string();
    let col_labels: Vec<String> = header[1..].iter().map(|s| s.trim().to_string()).collect();

    let mut row_labels = Vec::new();
    let mut rows = Vec::new();
    let mut line_no = 1usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != col_labels.len() + 1 {
            return Err(InputError::Parse(format!(
                "{} line {}: expected {} cells, found {}",
                path.display(),
                line_no,
                col_labels.len() + 1,
                cols.len()
            )));
        }
        let mut row = Vec::with_capacity(col_labels.len());
        for raw in &cols[1..] {
            row.push(parse_missing_f64(raw).map_err(|_| {
                InputError::Parse(format!(
                    "{} line {}: invalid value '{}'",
                    path.display(),
                    line_no,
                    raw
                ))
            })?);
        }
        row_labels.push(cols[0].trim().to_string());
        rows.push(row);
    }

    let matrix = LabeledMatrix::from_rows(row_labels, col_labels, rows)
        .ok_or_else(|| InputError::Parse(format!("{}: ragged matrix", path.display())))?;
    Ok(MatrixFile { corner, matrix })
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullSamples {
    pub experiments: Vec<String>,
    pub values: Vec<f64>,
}

/// Reads a histogram sample file: `# name name ...` then one value per line.
pub fn read_null_samples(path: &Path) -> Result<NullSamples, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut experiments = Vec::new();
    let mut values = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            if line_no == 1 {
                experiments = rest.split_whitespace().map(str::to_string).collect();
            }
            continue;
        }
        let v = line.parse::<f64>().map_err(|_| {
            InputError::Parse(format!(
                "{} line {}: invalid sample '{}'",
                path.display(),
                line_no,
                line
            ))
        })?;
        values.push(v);
    }
    if values.is_empty() {
        return Err(InputError::Parse(format!(
            "{}: no null samples",
            path.display()
        )));
    }
    Ok(NullSamples {
        experiments,
        values,
    })
}
