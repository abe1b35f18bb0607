use std::fs;

use tempfile::TempDir;

use super::*;
use crate::input::matrix::read_labeled_matrix;
use crate::model::gene::{GeneId, GeneNames};
use crate::model::pair::{EffectSize, GenePair};
use crate::model::params::AnalysisParams;
use crate::pipeline::stage1_pairs::{PairSource, build_catalog};
use crate::pipeline::stage3_aggregate::{calculate_coexpression_matrices, collect_results};
use crate::report::json::InputSummary;
use crate::test_support::{experiment, two_experiment_store};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn run_reports(dir: &std::path::Path, drop_empty: bool) -> Vec<String> {
    let store = two_experiment_store();
    let source = PairSource::Symbols(vec!["A".into(), "B".into(), "C".into(), "D".into()]);
    let catalog = build_catalog(&store, "human", &source, &mut StdRng::seed_from_u64(1)).unwrap();
    let params = AnalysisParams::default_v1();
    let experiments = vec![experiment(100, "GSE1", 5), experiment(101, "GSE2", 4)];
    let matrices = calculate_coexpression_matrices(
        &store,
        &experiments,
        &catalog.query,
        &catalog.target,
        &params,
    );
    let results = collect_results(&matrices, &catalog, &params);
    write_correlate_reports(
        dir,
        &CorrelateReport {
            matrices: &matrices,
            catalog: &catalog,
            results: &results,
            formatter: &ValueFormatter::default(),
            drop_empty,
        },
    )
    .unwrap()
}

#[test]
fn test_correlate_reports_written() {
    let dir = TempDir::new().unwrap();
    let written = run_reports(dir.path(), true);
    assert_eq!(
        written,
        vec![
            CORRELATIONS_FILE,
            MAX_CORRELATIONS_FILE,
            EXPRESSION_LEVELS_FILE,
            PAIR_SUMMARY_FILE,
            PAIRS_FILE
        ]
    );
    for name in &written {
        assert!(dir.path().join(name).exists());
        assert!(!dir.path().join(format!("{name}.tmp")).exists());
    }

    let corr = fs::read_to_string(dir.path().join(CORRELATIONS_FILE)).unwrap();
    let lines: Vec<&str> = corr.lines().collect();
    assert_eq!(lines[0], "GenePair\tGSE1\tGSE2");
    assert_eq!(lines[1], "A:B\t1.0000\t-1.0000");
    assert_eq!(lines[2], "A:C\t-1.0000\t");
    assert_eq!(lines.len(), 7);

    let max = read_labeled_matrix(&dir.path().join(MAX_CORRELATIONS_FILE)).unwrap();
    assert_eq!(max.corner, "Gene");
    assert_eq!(max.matrix.col_labels, vec!["A", "B", "C", "D"]);
    assert_eq!(max.matrix.get(0, 1), 1.0);
    assert!(max.matrix.get(0, 0).is_nan());

    let summary = fs::read_to_string(dir.path().join(PAIR_SUMMARY_FILE)).unwrap();
    let mut lines = summary.lines();
    assert_eq!(
        lines.next(),
        Some(
            "GenePair\tEffectSize\tEffectSizePValue\tMaxCorrelation\tNumExpressionExpts\tMeanExpressionLevel"
        )
    );
    let ab: Vec<&str> = lines.next().unwrap().split('\t').collect();
    assert_eq!(ab[0], "A:B");
    assert_eq!(ab[3], "1.0000");
    assert_eq!(ab[4], "2");
    assert_eq!(ab[5], "0.7292");

    let pairs = fs::read_to_string(dir.path().join(PAIRS_FILE)).unwrap();
    assert_eq!(pairs.lines().next(), Some("A\tB"));
    assert_eq!(pairs.lines().count(), 6);
}

#[test]
fn test_pair_summary_marks_pairs_without_data() {
    let mut names = GeneNames::new();
    names.insert(GeneId(1), "A");
    let results = vec![CorrelationResult {
        pair: GenePair::new(GeneId(1), GeneId(7)),
        correlations: vec![f64::NAN, f64::NAN],
        max_correlation: f64::NAN,
        n_experiments: 0,
        mean_expression_level: f64::NAN,
        effect_size: EffectSize::missing(),
        link_count: Some(3),
    }];
    let mut out = Vec::new();
    write_pair_summary(&mut out, &results, &names, &ValueFormatter::default(), true).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "GenePair\tEffectSize\tEffectSizePValue\tMaxCorrelation\tNumExpressionExpts\tMeanExpressionLevel\tLinkCount\n\
         A:7\tNA\tNA\tNA\tNA\tNA\t3\n"
    );
}

#[test]
fn test_all_missing_cell_renders_blank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("max.tsv");
    let matrix = LabeledMatrix::new_missing(vec!["A".into()], vec!["B".into()]);
    write_matrix_file(&path, &matrix, "Gene", &ValueFormatter::default()).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "Gene\tB\nA\t\n");
}

#[test]
fn test_null_samples_format() {
    let stat = SampledStatistic {
        k_max: 0,
        experiments: vec!["GSE1".into(), "GSE2".into()],
        values: vec![0.5, -0.25, 0.1],
    };
    let mut out = Vec::new();
    write_null_samples(&mut out, &stat).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "# GSE1 GSE2\n0.5\n-0.25\n0.1\n");
}

#[test]
fn test_failed_write_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.tsv");
    let err = write_atomic(&path, |w| {
        w.write_all(b"partial")?;
        Err(io::Error::other("boom"))
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert!(!path.exists());
    assert!(!dir.path().join("broken.tsv.tmp").exists());
}

#[test]
fn test_summary_json() {
    let dir = TempDir::new().unwrap();
    let summary = RunSummary {
        tool: "kira-coexpr".to_string(),
        version: "0.1.0".to_string(),
        taxon: "human".to_string(),
        input: InputSummary {
            data_dir: "data".to_string(),
            pair_source: "symbols (2)".to_string(),
            n_pairs: 1,
            n_query: 2,
            n_target: 2,
            n_experiments: 2,
            n_pairs_with_data: 1,
            missing_genes: vec!["X".to_string()],
        },
        seed: 42,
        params: AnalysisParams::default_v1(),
        outputs: vec![SUMMARY_FILE.to_string()],
    };
    let path = write_summary(dir.path(), &summary).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["seed"], 42);
    assert_eq!(value["input"]["missing_genes"][0], "X");
    assert_eq!(value["params"]["histogram_bins"], 2000);
    assert!(value["params"]["seed"].is_null());
}
