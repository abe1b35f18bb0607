use std::io::{self, Write};

use crate::model::matrix::LabeledMatrix;
use crate::report::ValueFormatter;

/// Header `corner<TAB>col...`, then one line per row label.
pub fn write_labeled_matrix<W: Write>(
    w: &mut W,
    matrix: &LabeledMatrix,
    corner: &str,
    formatter: &ValueFormatter,
) -> io::Result<()> {
    w.write_all(corner.as_bytes())?;
    for col in &matrix.col_labels {
        w.write_all(b"\t")?;
        w.write_all(col.as_bytes())?;
    }
    w.write_all(b"\n")?;

    for (r, label) in matrix.row_labels.iter().enumerate() {
        w.write_all(label.as_bytes())?;
        for &v in matrix.row(r) {
            w.write_all(b"\t")?;
            w.write_all(formatter.format(v).as_bytes())?;
        }
        w.write_all(b"\n")?;
    }
    Ok(())
}
