pub mod json;
pub mod tsv;

use std::collections::BTreeMap;

/// Missing-value token produced by [`format_value`].
pub const NAN_TOKEN: &str = "NaN";

/// Fixed four decimals with a `.` separator; values rounding to zero never carry a sign.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        NAN_TOKEN.to_string()
    } else if v == f64::INFINITY {
        "Infinity".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        let text = format!("{:.4}", v);
        match text.strip_prefix('-') {
            Some(unsigned) if unsigned.chars().all(|c| c == '0' || c == '.') => unsigned.to_string(),
            _ => text,
        }
    }
}

/// Formats values and then replaces whole formatted strings, e.g. `NaN` -> ``.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFormatter {
    pub substitutions: BTreeMap<String, String>,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::with_nan_placeholder("")
    }
}

impl ValueFormatter {
    pub fn with_nan_placeholder(placeholder: &str) -> Self {
        let mut substitutions = BTreeMap::new();
        substitutions.insert(NAN_TOKEN.to_string(), placeholder.to_string());
        Self { substitutions }
    }

    pub fn format(&self, v: f64) -> String {
        let text = format_value(v);
        match self.substitutions.get(&text) {
            Some(replacement) => replacement.clone(),
            None => text,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
