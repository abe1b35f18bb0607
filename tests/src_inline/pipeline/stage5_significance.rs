use approx::assert_relative_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::pipeline::stage4_background::HistogramSampler;

fn cohort(centres: &[f64]) -> Cohort {
    Cohort {
        samplers: centres
            .iter()
            .map(|&c| HistogramSampler::from_values(&[c], 2000).unwrap())
            .collect(),
        names: (0..centres.len()).map(|i| format!("GSE{}", i + 1)).collect(),
        excluded: Vec::new(),
    }
}

#[test]
fn test_kth_largest() {
    assert_eq!(kth_largest(&[0.9, 0.5, 0.2], 0), Some(0.9));
    assert_eq!(kth_largest(&[0.9, 0.5, 0.2], 1), Some(0.5));
    assert_eq!(kth_largest(&[0.2, 0.9, 0.5], 2), Some(0.2));
    assert_eq!(kth_largest(&[0.9, 0.5, 0.2], 3), None);
    assert_eq!(kth_largest(&[], 0), None);
}

#[test]
fn test_sampled_statistic_tracks_cohort() {
    let mut rng = StdRng::seed_from_u64(9);
    let stat = sample_kth_largest(&cohort(&[0.2, 0.8, -0.4]), 1, 100, &mut rng).unwrap();
    assert_eq!(stat.k_max, 1);
    assert_eq!(stat.values.len(), 100);
    assert_eq!(stat.experiments, vec!["GSE1", "GSE2", "GSE3"]);
    for v in &stat.values {
        assert!((v - 0.2).abs() <= 0.0011, "{v}");
    }
}

#[test]
fn test_reduced_cohort_rejects_large_k() {
    let mut reduced = cohort(&[0.1, 0.3]);
    reduced.excluded.push("GSE3".to_string());
    let mut rng = StdRng::seed_from_u64(2);

    let err = sample_kth_largest(&reduced, 2, 10, &mut rng).unwrap_err();
    assert_eq!(err, SignificanceError::InsufficientCohort { k_max: 2, cohort: 2 });
    assert!(sample_kth_largest(&reduced, 1, 10, &mut rng).is_ok());
    assert!(sample_kth_largest(&Cohort::default(), 0, 10, &mut rng).is_err());
}

#[test]
fn test_empirical_p_value() {
    let null = [0.1, 0.2, 0.3, 0.4];
    assert_relative_eq!(empirical_p_value(0.3, &null), 0.5);
    assert_relative_eq!(empirical_p_value(0.25, &null), 0.5);
    assert_relative_eq!(empirical_p_value(0.5, &null), 0.0);
    assert_relative_eq!(empirical_p_value(-1.0, &null), 1.0);
    assert!(empirical_p_value(f64::NAN, &null).is_nan());
    assert!(empirical_p_value(0.3, &[]).is_nan());
}

#[test]
fn test_p_value_matrix_keeps_shape_and_missing() {
    let observed = LabeledMatrix::from_rows(
        vec!["A".into()],
        vec!["B".into(), "C".into(), "D".into()],
        vec![vec![0.5, f64::NAN, 0.15]],
    )
    .unwrap();
    let null = [0.6, 0.1, f64::NAN, 0.7, 0.2];
    let p = p_value_matrix(&observed, &null);
    assert_eq!(p.row_labels, observed.row_labels);
    assert_eq!(p.col_labels, observed.col_labels);
    assert_relative_eq!(p.get(0, 0), 0.5);
    assert!(p.get(0, 1).is_nan());
    assert_relative_eq!(p.get(0, 2), 0.75);
}
