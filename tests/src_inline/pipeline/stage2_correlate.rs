use approx::assert_relative_eq;

use super::*;

const NAN: f64 = f64::NAN;

#[test]
fn test_pearson_known_value() {
    let a = [1.0, 2.0, 3.0, 4.0];
    let b = [1.0, 3.0, 2.0, 4.0];
    assert_relative_eq!(pearson_pairwise(&a, &b, 3), 0.8, epsilon = 1e-12);
}

#[test]
fn test_pearson_is_symmetric() {
    let a = [0.3, NAN, 2.5, -1.0, 4.2, 0.0, 7.1];
    let b = [1.1, 0.4, NAN, -2.2, 3.3, 0.9, 5.0];
    let ab = pearson_pairwise(&a, &b, MIN_PAIRED_SAMPLES);
    let ba = pearson_pairwise(&b, &a, MIN_PAIRED_SAMPLES);
    assert!(ab.is_finite());
    assert_eq!(ab.to_bits(), ba.to_bits());

    let va: Vec<&[f64]> = vec![&a];
    let vb: Vec<&[f64]> = vec![&b];
    assert_eq!(
        correlate(&va, &vb, MIN_PAIRED_SAMPLES).to_bits(),
        correlate(&vb, &va, MIN_PAIRED_SAMPLES).to_bits()
    );
}

#[test]
fn test_pairwise_complete_samples_only() {
    let a = [1.0, NAN, 3.0, 4.0, 100.0];
    let b = [2.0, 5.0, 6.0, 8.0, NAN];
    assert_eq!(paired_sample_count(&a, &b), 3);
    assert_relative_eq!(pearson_pairwise(&a, &b, 3), 1.0, epsilon = 1e-12);
}

#[test]
fn test_too_few_paired_samples_is_nan() {
    let a = [1.0, 2.0, NAN, 4.0];
    let b = [2.0, NAN, 3.0, 5.0];
    assert_eq!(paired_sample_count(&a, &b), 2);
    assert!(pearson_pairwise(&a, &b, 3).is_nan());
    assert!(pearson_pairwise(&[1.0, 2.0], &[2.0, 1.0], 3).is_nan());
    // Two points always line up; a lower threshold does not unlock them.
    assert!(pearson_pairwise(&a, &b, 2).is_nan());
    assert!(pearson_pairwise(&[1.0, 2.0], &[2.0, 1.0], 0).is_nan());
}

#[test]
fn test_zero_variance_and_length_mismatch_are_nan() {
    assert!(pearson_pairwise(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 3).is_nan());
    assert!(pearson_pairwise(&[1.0, 2.0, 3.0], &[1.0, 2.0], 2).is_nan());
    assert_eq!(paired_sample_count(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0);
}

#[test]
fn test_representative_prefers_most_present_then_first() {
    let v0 = [1.0, NAN, 3.0];
    let v1 = [1.0, 2.0, 3.0];
    let v2 = [4.0, 5.0, 6.0];
    let vectors: Vec<&[f64]> = vec![&v0, &v1, &v2];
    assert_eq!(select_representative(&vectors), Some(1));
    assert_eq!(select_representative(&[]), None);
}

#[test]
fn test_correlate_uses_representatives() {
    let sparse = [1.0, NAN, NAN, NAN];
    let full = [1.0, 2.0, 3.0, 4.0];
    let other = [2.0, 4.0, 6.0, 9.0];
    let a: Vec<&[f64]> = vec![&sparse, &full];
    let b: Vec<&[f64]> = vec![&other];
    let r = correlate(&a, &b, 3);
    assert_relative_eq!(r, pearson_pairwise(&full, &other, 3));
    assert!(correlate(&[], &b, 3).is_nan());
}
