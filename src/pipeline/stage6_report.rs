use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::gene::GeneNames;
use crate::model::matrix::LabeledMatrix;
use crate::model::pair::CorrelationResult;
use crate::pipeline::stage1_pairs::{PairCatalog, write_pair_file};
use crate::pipeline::stage3_aggregate::{CoexpressionMatrices, FoldAxis, flatten_experiments, max_fold};
use crate::pipeline::stage5_significance::SampledStatistic;
use crate::report::ValueFormatter;
use crate::report::json::{RunSummary, render_summary_json};
use crate::report::tsv::write_labeled_matrix;

pub const CORRELATIONS_FILE: &str = "correlations.tsv";
pub const MAX_CORRELATIONS_FILE: &str = "max_correlations.tsv";
pub const PAIR_SUMMARY_FILE: &str = "pair_summary.tsv";
pub const EXPRESSION_LEVELS_FILE: &str = "expression_levels.tsv";
pub const PAIRS_FILE: &str = "pairs.tsv";
pub const SUMMARY_FILE: &str = "summary.json";

const NO_DATA: &str = "NA";

pub struct CorrelateReport<'a> {
    pub matrices: &'a CoexpressionMatrices,
    pub catalog: &'a PairCatalog,
    pub results: &'a [CorrelationResult],
    pub formatter: &'a ValueFormatter,
    pub drop_empty: bool,
}

/// Writes the per-pair and folded reports; returns the file names written.
pub fn write_correlate_reports(out_dir: &Path, report: &CorrelateReport<'_>) -> io::Result<Vec<String>> {
    fs::create_dir_all(out_dir)?;
    let names = report.catalog.names();
    let mut written = Vec::new();

    let correlations = flatten_experiments(
        &report.matrices.correlation,
        &report.catalog.pairs,
        &names,
        report.drop_empty,
    );
    write_matrix_file(&out_dir.join(CORRELATIONS_FILE), &correlations, "GenePair", report.formatter)?;
    written.push(CORRELATIONS_FILE.to_string());

    let max = max_fold(&report.matrices.correlation, FoldAxis::Experiment, &names);
    write_matrix_file(&out_dir.join(MAX_CORRELATIONS_FILE), &max, "Gene", report.formatter)?;
    written.push(MAX_CORRELATIONS_FILE.to_string());

    let levels = flatten_experiments(
        &report.matrices.expression_levels,
        &report.catalog.pairs,
        &names,
        report.drop_empty,
    );
    write_matrix_file(&out_dir.join(EXPRESSION_LEVELS_FILE), &levels, "GenePair", report.formatter)?;
    written.push(EXPRESSION_LEVELS_FILE.to_string());

    let with_links = report.catalog.has_link_counts();
    write_atomic(&out_dir.join(PAIR_SUMMARY_FILE), |w| {
        write_pair_summary(w, report.results, &names, report.formatter, with_links)
    })?;
    written.push(PAIR_SUMMARY_FILE.to_string());

    write_atomic(&out_dir.join(PAIRS_FILE), |w| {
        write_pair_file(w, &report.catalog.pairs, &names)
    })?;
    written.push(PAIRS_FILE.to_string());

    tracing::info!(dir = %out_dir.display(), files = written.len(), "reports written");
    Ok(written)
}

pub fn write_pair_summary<W: Write>(
    w: &mut W,
    results: &[CorrelationResult],
    names: &GeneNames,
    formatter: &ValueFormatter,
    with_links: bool,
) -> io::Result<()> {
    write!(
        w,
        "GenePair\tEffectSize\tEffectSizePValue\tMaxCorrelation\tNumExpressionExpts\tMeanExpressionLevel"
    )?;
    if with_links {
        write!(w, "\tLinkCount")?;
    }
    writeln!(w)?;

    for result in results {
        write!(w, "{}", result.label(names))?;
        if result.n_experiments == 0 {
            write!(w, "\t{NO_DATA}\t{NO_DATA}\t{NO_DATA}\t{NO_DATA}\t{NO_DATA}")?;
        } else {
            write!(
                w,
                "\t{}\t{}\t{}\t{}\t{}",
                formatter.format(result.effect_size.value),
                formatter.format(result.effect_size.p_value),
                formatter.format(result.max_correlation),
                result.n_experiments,
                formatter.format(result.mean_expression_level)
            )?;
        }
        if with_links {
            match result.link_count {
                Some(count) => write!(w, "\t{count}")?,
                None => write!(w, "\t")?,
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_summary(out_dir: &Path, summary: &RunSummary) -> io::Result<PathBuf> {
    let path = out_dir.join(SUMMARY_FILE);
    let json = render_summary_json(summary).map_err(io::Error::other)?;
    write_atomic(&path, |w| w.write_all(json.as_bytes()))?;
    Ok(path)
}

pub fn write_matrix_file(
    path: &Path,
    matrix: &LabeledMatrix,
    corner: &str,
    formatter: &ValueFormatter,
) -> io::Result<()> {
    write_atomic(path, |w| write_labeled_matrix(w, matrix, corner, formatter))
}

/// `# name name ...` then one value per line.
pub fn write_null_samples<W: Write>(w: &mut W, stat: &SampledStatistic) -> io::Result<()> {
    writeln!(w, "# {}", stat.experiments.join(" "))?;
    for v in &stat.values {
        writeln!(w, "{v}")?;
    }
    Ok(())
}

pub fn write_null_samples_file(path: &Path, stat: &SampledStatistic) -> io::Result<()> {
    write_atomic(path, |w| write_null_samples(w, stat))
}

/// Writes through a `.tmp` sibling and renames it into place.
pub fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_sibling(path);
    let result = File::create(&tmp).and_then(|file| {
        let mut w = BufWriter::new(file);
        write(&mut w)?;
        w.flush()?;
        Ok(())
    });
    match result.and_then(|_| fs::rename(&tmp, path)) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            Err(err)
        }
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("report"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_report.rs"]
mod tests;
