use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::input::InputError;

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path).map_err(|e| InputError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Picks `name` or `name.gz` inside `dir`, plain first.
pub fn find_table(dir: &Path, name: &str) -> Option<PathBuf> {
    let plain = dir.join(name);
    if plain.exists() {
        return Some(plain);
    }
    let gz = dir.join(format!("{name}.gz"));
    if gz.exists() {
        return Some(gz);
    }
    None
}

/// Tab-delimited table reader that skips blank and `#` lines.
pub struct TableReader {
    reader: Box<dyn BufRead>,
    buf: String,
    line_no: usize,
}

impl TableReader {
    pub fn open(path: &Path) -> Result<Self, InputError> {
        Ok(Self {
            reader: open_maybe_gz(path)?,
            buf: String::new(),
            line_no: 0,
        })
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Next data line split on tabs, or `None` at EOF.
    pub fn next_fields(&mut self) -> Result<Option<Vec<String>>, InputError> {
        loop {
            self.buf.clear();
            let read = self.reader.read_line(&mut self.buf)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(Some(line.split('\t').map(|s| s.trim().to_string()).collect()));
        }
    }

    /// Reads the header and checks the leading column names.
    pub fn expect_header(&mut self, table: &str, required: &[&str]) -> Result<Vec<String>, InputError> {
        let header = self
            .next_fields()?
            .ok_or_else(|| InputError::Parse(format!("{table} is empty")))?;
        for (idx, name) in required.iter().enumerate() {
            let found = header.get(idx).map(|s| s.to_ascii_lowercase());
            if found.as_deref() != Some(*name) {
                return Err(InputError::Parse(format!(
                    "{table}: expected column {} to be '{}', found '{}'",
                    idx + 1,
                    name,
                    header.get(idx).map(String::as_str).unwrap_or("")
                )));
            }
        }
        Ok(header)
    }
}

pub fn parse_missing_f64(raw: &str) -> Result<f64, std::num::ParseFloatError> {
    let v = raw.trim();
    if v.is_empty()
        || v.eq_ignore_ascii_case("na")
        || v.eq_ignore_ascii_case("nan")
        || v.eq_ignore_ascii_case("null")
    {
        return Ok(f64::NAN);
    }
    v.parse::<f64>()
}
