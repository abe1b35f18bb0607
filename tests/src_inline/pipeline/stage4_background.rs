use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::test_support::{experiment, table, two_experiment_store};

#[test]
fn test_histogram_requires_finite_values() {
    assert!(HistogramSampler::from_values(&[], 10).is_none());
    assert!(HistogramSampler::from_values(&[f64::NAN, f64::INFINITY], 10).is_none());
    assert!(HistogramSampler::from_values(&[0.5], 0).is_none());

    let h = HistogramSampler::from_values(&[0.5, f64::NAN, -1.0, 1.0], 20).unwrap();
    assert_eq!(h.total(), 3);
    assert_eq!(h.bins(), 20);
}

#[test]
fn test_samples_stay_in_the_occupied_bin() {
    let h = HistogramSampler::from_values(&[0.5, 0.5, 0.5], 2000).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let v = h.sample(&mut rng);
        assert!((v - 0.5).abs() <= 0.0011, "{v}");
    }
}

#[test]
fn test_samples_follow_bin_weights() {
    let mut values = vec![-0.75; 900];
    values.extend(vec![0.75; 100]);
    let h = HistogramSampler::from_values(&values, 4).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let n = 10_000;
    let high = (0..n).filter(|_| h.sample(&mut rng) > 0.0).count();
    let fraction = high as f64 / n as f64;
    assert!((fraction - 0.1).abs() < 0.02, "{fraction}");
}

#[test]
fn test_same_seed_same_draws() {
    let h = HistogramSampler::from_values(&[-0.2, 0.1, 0.4, 0.9], 50).unwrap();
    let (mut a, seed) = make_rng(Some(7));
    assert_eq!(seed, 7);
    let (mut b, _) = make_rng(Some(7));
    let xs: Vec<f64> = (0..20).map(|_| h.sample(&mut a)).collect();
    let ys: Vec<f64> = (0..20).map(|_| h.sample(&mut b)).collect();
    assert_eq!(xs, ys);
}

#[test]
fn test_background_exhaustive_and_sampled() {
    let store = two_experiment_store();
    let gse1 = experiment(100, "GSE1", 5);
    let mut rng = StdRng::seed_from_u64(3);

    let params = AnalysisParams::default_v1();
    let all = background_correlations(&store, &gse1, &params, &mut rng);
    assert_eq!(all.len(), 6);
    assert!(all.iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));

    let mut capped = AnalysisParams::default_v1();
    capped.max_background_pairs = 2;
    let some = background_correlations(&store, &gse1, &capped, &mut rng);
    assert!(some.len() <= 2 && !some.is_empty());
}

#[test]
fn test_cohort_excludes_experiments_without_background() {
    let mut store = two_experiment_store();
    store.add_experiment(
        experiment(102, "GSE3", 3),
        table(&[("r1", &[1], &[1.0, 2.0, 3.0])]),
    );
    let experiments = vec![
        experiment(100, "GSE1", 5),
        experiment(101, "GSE2", 4),
        experiment(102, "GSE3", 3),
    ];
    let mut rng = StdRng::seed_from_u64(11);
    let cohort = build_cohort(&store, &experiments, &AnalysisParams::default_v1(), &mut rng);
    assert_eq!(cohort.len(), 2);
    assert_eq!(cohort.names, vec!["GSE1".to_string(), "GSE2".to_string()]);
    assert_eq!(cohort.excluded, vec!["GSE3".to_string()]);
    assert!(!cohort.is_empty());
}
