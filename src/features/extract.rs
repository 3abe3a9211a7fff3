//! Feature Extraction
//!
//! Pure function of the input sequence: no hidden state, no side
//! effects, identical input always yields a bit-identical vector.
//!
//! Hard invariant: every division-by-zero edge case degrades to 0.0.
//! A NaN leaking out of this stage would corrupt the monotonicity
//! guarantees of the scorer, so the vector is sanitized before return.

use crate::error::InputError;
use crate::sample::{TelemetrySample, MIN_SEQUENCE_LEN};

use super::layout::FEATURE_COUNT;
use super::spectral::magnitude_spectrum;
use super::vector::FeatureVector;

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract the 10-field feature vector from a telemetry sample.
///
/// Rejects sequences shorter than two points and sequences containing
/// non-finite values; everything else produces a finite vector.
pub fn extract(sample: &TelemetrySample) -> Result<FeatureVector, InputError> {
    let values = &sample.values;

    if values.len() < MIN_SEQUENCE_LEN {
        return Err(InputError::TooShort {
            len: values.len(),
            min: MIN_SEQUENCE_LEN,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(InputError::NonFinite { index });
    }

    let n = values.len();
    let nf = n as f64;

    // Accumulate moments in f64, truncate to f32 at the end.
    let data: Vec<f64> = values.iter().map(|&v| v as f64).collect();

    let mean = data.iter().sum::<f64>() / nf;

    let mut m2 = 0.0f64;
    let mut m3 = 0.0f64;
    let mut m4 = 0.0f64;
    for &v in &data {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    m2 /= nf;
    m3 /= nf;
    m4 /= nf;

    let variance = m2;

    // Standardized moments, defined as 0 for a constant sequence.
    let (skewness, excess_kurtosis) = if m2 > 0.0 {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    // --- Temporal ---
    let mean_abs_gradient = data
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .sum::<f64>()
        / (nf - 1.0);

    // Lag-1 autocovariance over variance, 0 for a constant sequence.
    let lag1_autocorrelation = if m2 > 0.0 {
        let autocov = data
            .windows(2)
            .map(|w| (w[0] - mean) * (w[1] - mean))
            .sum::<f64>()
            / nf;
        autocov / m2
    } else {
        0.0
    };

    // --- Statistical ---
    let energy = data.iter().map(|v| v * v).sum::<f64>() / nf;

    // Amplitude entropy over nonzero terms only: |t| ln|t| is undefined
    // at zero, and lim x->0 of x ln x is 0 anyway.
    let entropy = -data
        .iter()
        .map(|v| v.abs())
        .filter(|&a| a > 0.0)
        .map(|a| a * a.ln())
        .sum::<f64>();

    // --- Spectral ---
    let spectrum = magnitude_spectrum(values);
    let bins = spectrum.len() as f64;

    let total: f64 = spectrum.iter().map(|&m| m as f64).sum();
    let spectral_density = total / bins;

    // All-zero spectrum has entropy 0 by definition, not NaN.
    let spectral_entropy = if total > 0.0 {
        -spectrum
            .iter()
            .map(|&m| m as f64 / total)
            .filter(|&p| p > 0.0)
            .map(|p| p * p.ln())
            .sum::<f64>()
    } else {
        0.0
    };

    // argmax with lowest-index tie-break: strict comparison keeps the
    // first maximum encountered.
    let mut dominant_frequency_index = 0usize;
    let mut best = spectrum[0];
    for (k, &m) in spectrum.iter().enumerate().skip(1) {
        if m > best {
            best = m;
            dominant_frequency_index = k;
        }
    }

    let mut out = [0.0f32; FEATURE_COUNT];
    out[0] = spectral_density as f32;
    out[1] = spectral_entropy as f32;
    out[2] = dominant_frequency_index as f32;
    out[3] = mean_abs_gradient as f32;
    out[4] = variance as f32;
    out[5] = lag1_autocorrelation as f32;
    out[6] = energy as f32;
    out[7] = entropy as f32;
    out[8] = skewness as f32;
    out[9] = excess_kurtosis as f32;

    // Belt over the per-formula guards: an f32 overflow (Inf) from an
    // extreme but finite input degrades to 0.0 rather than poisoning
    // the pipeline.
    for v in out.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
        }
    }

    Ok(FeatureVector::from_values(out))
}
