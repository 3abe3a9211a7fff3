//! Feature extraction test suite
//!
//! Determinism and zero-division safety are hard invariants of the
//! extractor; this module exercises both plus the formula edge cases.

use crate::error::InputError;
use crate::sample::TelemetrySample;

use super::extract::extract;
use super::layout::FEATURE_COUNT;

fn sample(values: Vec<f32>) -> TelemetrySample {
    TelemetrySample::new("test-source", 100.0, values)
}

// ============================================================================
// INPUT VALIDATION
// ============================================================================

#[test]
fn test_empty_sequence_rejected() {
    let err = extract(&sample(vec![])).unwrap_err();
    assert_eq!(err, InputError::TooShort { len: 0, min: 2 });
}

#[test]
fn test_single_value_rejected() {
    let err = extract(&sample(vec![1.0])).unwrap_err();
    assert_eq!(err, InputError::TooShort { len: 1, min: 2 });
}

#[test]
fn test_two_values_accepted() {
    assert!(extract(&sample(vec![1.0, 2.0])).is_ok());
}

#[test]
fn test_nan_input_rejected() {
    let err = extract(&sample(vec![1.0, f32::NAN, 3.0])).unwrap_err();
    assert_eq!(err, InputError::NonFinite { index: 1 });
}

#[test]
fn test_infinite_input_rejected() {
    let err = extract(&sample(vec![1.0, 2.0, f32::INFINITY])).unwrap_err();
    assert_eq!(err, InputError::NonFinite { index: 2 });
}

// ============================================================================
// ZERO-DIVISION SAFETY
// ============================================================================

#[test]
fn test_constant_sequence_is_all_finite() {
    let fv = extract(&sample(vec![5.0, 5.0, 5.0, 5.0])).unwrap();
    assert!(fv.is_finite());

    // Constant input: variance, autocorrelation, skewness, kurtosis and
    // gradient are all defined as 0, never NaN.
    let temporal = fv.temporal();
    assert_eq!(temporal.variance, 0.0);
    assert_eq!(temporal.lag1_autocorrelation, 0.0);
    assert_eq!(temporal.mean_abs_gradient, 0.0);

    let stats = fv.statistical();
    assert_eq!(stats.skewness, 0.0);
    assert_eq!(stats.excess_kurtosis, 0.0);
}

#[test]
fn test_all_zero_sequence_is_all_finite() {
    let fv = extract(&sample(vec![0.0; 8])).unwrap();
    assert!(fv.is_finite());

    // Zero signal: zero spectrum, entropy defined as 0.
    let spectral = fv.spectral();
    assert_eq!(spectral.spectral_density, 0.0);
    assert_eq!(spectral.spectral_entropy, 0.0);
    assert_eq!(spectral.dominant_frequency_index, 0.0);
    assert_eq!(fv.statistical().entropy, 0.0);
    assert_eq!(fv.statistical().energy, 0.0);
}

#[test]
fn test_no_nan_over_awkward_inputs() {
    let cases: Vec<Vec<f32>> = vec![
        vec![0.0, 0.0],
        vec![1.0, 1.0],
        vec![-3.0, -3.0, -3.0],
        vec![1e-30, 1e-30, 1e-30],
        vec![1e18, -1e18, 1e18, -1e18],
        vec![0.0, 1.0, 0.0, -1.0, 0.0],
    ];
    for values in cases {
        let fv = extract(&sample(values.clone())).unwrap();
        assert!(fv.is_finite(), "non-finite feature for input {:?}", values);
    }
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn test_extraction_is_bit_identical() {
    let values = vec![0.5, -1.25, 3.75, 2.0, -0.125, 8.5, 0.0, 1.5];
    let a = extract(&sample(values.clone())).unwrap();
    let b = extract(&sample(values)).unwrap();
    assert_eq!(a.values, b.values);
    assert_eq!(a, b);
}

#[test]
fn test_timestamp_does_not_affect_features() {
    // Features are a pure function of the value sequence.
    let values = vec![1.0, 4.0, 2.0, 8.0];
    let a = extract(&sample(values.clone())).unwrap();

    let later = sample(values).with_timestamp(chrono::Utc::now() + chrono::Duration::hours(1));
    let b = extract(&later).unwrap();
    assert_eq!(a.values, b.values);
}

// ============================================================================
// FORMULA SPOT CHECKS
// ============================================================================

const EPS: f32 = 1e-4;

#[test]
fn test_temporal_features_known_values() {
    // [1, 2, 4]: gradients |1|, |2| -> mean 1.5
    // mean 7/3, variance = ((1-7/3)^2 + (2-7/3)^2 + (4-7/3)^2)/3 = 14/9
    let fv = extract(&sample(vec![1.0, 2.0, 4.0])).unwrap();
    let temporal = fv.temporal();
    assert!((temporal.mean_abs_gradient - 1.5).abs() < EPS);
    assert!((temporal.variance - 14.0 / 9.0).abs() < EPS);
}

#[test]
fn test_energy_known_value() {
    // mean of squares of [1, 2, 3] = 14/3
    let fv = extract(&sample(vec![1.0, 2.0, 3.0])).unwrap();
    assert!((fv.statistical().energy - 14.0 / 3.0).abs() < EPS);
}

#[test]
fn test_skewness_sign() {
    // Right-heavy sequence skews positive, mirrored sequence negative.
    let right = extract(&sample(vec![1.0, 1.0, 1.0, 1.0, 10.0])).unwrap();
    let left = extract(&sample(vec![-1.0, -1.0, -1.0, -1.0, -10.0])).unwrap();
    assert!(right.statistical().skewness > 0.0);
    assert!(left.statistical().skewness < 0.0);
    assert!(
        (right.statistical().skewness + left.statistical().skewness).abs() < EPS,
        "mirrored input must mirror skewness"
    );
}

#[test]
fn test_lag1_autocorrelation_of_smooth_ramp() {
    // A monotone ramp is strongly positively autocorrelated.
    let values: Vec<f32> = (0..32).map(|i| i as f32).collect();
    let fv = extract(&sample(values)).unwrap();
    assert!(fv.temporal().lag1_autocorrelation > 0.8);
}

#[test]
fn test_alternating_sequence_negative_autocorrelation() {
    let values: Vec<f32> = (0..32).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let fv = extract(&sample(values)).unwrap();
    assert!(fv.temporal().lag1_autocorrelation < -0.8);
}

#[test]
fn test_dominant_frequency_of_tone() {
    // Tone at bin 4 of a 32-point window.
    let n = 32usize;
    let k0 = 4usize;
    let values: Vec<f32> = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * k0 as f32 * i as f32 / n as f32).cos())
        .collect();
    let fv = extract(&sample(values)).unwrap();
    assert_eq!(fv.spectral().dominant_frequency_index, k0 as f32);
}

#[test]
fn test_vector_has_ten_fields() {
    let fv = extract(&sample(vec![1.0, 2.0, 3.0])).unwrap();
    assert_eq!(fv.values.len(), FEATURE_COUNT);
    assert_eq!(FEATURE_COUNT, 10);
}
