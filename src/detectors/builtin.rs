//! Built-in Detector Set
//!
//! Seven analytic detectors, one per signal angle, each watching a
//! slice of the feature vector against its own rolling baseline. None
//! of them inspects the classified domain - specialization weighting is
//! the bank's job - but the contract passes it so custom detectors can.
//!
//! All detectors are deterministic: same feature history, same verdict.

use crate::domain::ClassifiedDomain;
use crate::features::FeatureVector;

use super::baseline::RollingBaseline;
use super::{Detection, Detector};

pub const SPECTRAL_SHIFT_ID: &str = "spectral_shift";
pub const GRADIENT_BURST_ID: &str = "gradient_burst";
pub const VARIANCE_REGIME_ID: &str = "variance_regime";
pub const AMPLITUDE_ENTROPY_ID: &str = "amplitude_entropy";
pub const ENERGY_SURGE_ID: &str = "energy_surge";
pub const AUTOCORR_DRIFT_ID: &str = "autocorr_drift";
pub const TAIL_SHAPE_ID: &str = "tail_shape";

fn stats_line(label: &str, baseline: &RollingBaseline) -> String {
    let (mean, std) = baseline.mean_std();
    format!("{}: mu={:.4}, sigma={:.4}, n={}", label, mean, std, baseline.len())
}

// ============================================================================
// SPECTRAL SHIFT
// ============================================================================

/// Watches the shape of the spectrum: entropy drift and movement of the
/// dominant line. A tone appearing where there was noise (or the other
/// way around) moves both.
pub struct SpectralShiftDetector {
    entropy: RollingBaseline,
    dominant: RollingBaseline,
}

impl SpectralShiftDetector {
    pub fn new(window: usize) -> Self {
        Self {
            entropy: RollingBaseline::new(window),
            dominant: RollingBaseline::new(window),
        }
    }
}

impl Detector for SpectralShiftDetector {
    fn id(&self) -> &str {
        SPECTRAL_SHIFT_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let spectral = features.spectral();
        let entropy_conf = self.entropy.confidence(spectral.spectral_entropy);
        let dominant_conf = self.dominant.confidence(spectral.dominant_frequency_index);

        let confidence = entropy_conf.max(dominant_conf);
        if confidence == 0.0 {
            return Detection::quiet();
        }

        let reason = if entropy_conf >= dominant_conf {
            format!(
                "spectral entropy {:.3} deviates from baseline",
                spectral.spectral_entropy
            )
        } else {
            format!(
                "dominant frequency moved to bin {}",
                spectral.dominant_frequency_index as usize
            )
        };
        Detection { confidence, reason }
    }

    fn observe(&self, features: &FeatureVector) {
        let spectral = features.spectral();
        self.entropy.observe(spectral.spectral_entropy);
        self.dominant.observe(spectral.dominant_frequency_index);
    }

    fn stats(&self) -> String {
        stats_line("spectral_entropy", &self.entropy)
    }
}

// ============================================================================
// GRADIENT BURST
// ============================================================================

/// Sudden slewing: the mean absolute first difference jumps when a
/// signal starts thrashing.
pub struct GradientBurstDetector {
    gradient: RollingBaseline,
}

impl GradientBurstDetector {
    pub fn new(window: usize) -> Self {
        Self {
            gradient: RollingBaseline::new(window),
        }
    }
}

impl Detector for GradientBurstDetector {
    fn id(&self) -> &str {
        GRADIENT_BURST_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let gradient = features.temporal().mean_abs_gradient;
        let confidence = self.gradient.confidence_above(gradient);
        if confidence == 0.0 {
            return Detection::quiet();
        }
        Detection {
            confidence,
            reason: format!("gradient burst: mean |dT| {:.4} above baseline", gradient),
        }
    }

    fn observe(&self, features: &FeatureVector) {
        self.gradient.observe(features.temporal().mean_abs_gradient);
    }

    fn stats(&self) -> String {
        stats_line("mean_abs_gradient", &self.gradient)
    }
}

// ============================================================================
// VARIANCE REGIME
// ============================================================================

/// Regime change in spread. Works on ln(1 + variance) so heavy-tailed
/// sources don't saturate the baseline.
pub struct VarianceRegimeDetector {
    log_variance: RollingBaseline,
}

impl VarianceRegimeDetector {
    pub fn new(window: usize) -> Self {
        Self {
            log_variance: RollingBaseline::new(window),
        }
    }
}

impl Detector for VarianceRegimeDetector {
    fn id(&self) -> &str {
        VARIANCE_REGIME_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let variance = features.temporal().variance;
        let confidence = self.log_variance.confidence(variance.max(0.0).ln_1p());
        if confidence == 0.0 {
            return Detection::quiet();
        }
        Detection {
            confidence,
            reason: format!("variance regime shift: {:.4}", variance),
        }
    }

    fn observe(&self, features: &FeatureVector) {
        self.log_variance
            .observe(features.temporal().variance.max(0.0).ln_1p());
    }

    fn stats(&self) -> String {
        stats_line("ln1p_variance", &self.log_variance)
    }
}

// ============================================================================
// AMPLITUDE ENTROPY
// ============================================================================

/// Collapse or explosion of amplitude diversity. A source that suddenly
/// emits one repeated value (or pure noise) moves this.
pub struct AmplitudeEntropyDetector {
    entropy: RollingBaseline,
}

impl AmplitudeEntropyDetector {
    pub fn new(window: usize) -> Self {
        Self {
            entropy: RollingBaseline::new(window),
        }
    }
}

impl Detector for AmplitudeEntropyDetector {
    fn id(&self) -> &str {
        AMPLITUDE_ENTROPY_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let entropy = features.statistical().entropy;
        let confidence = self.entropy.confidence(entropy);
        if confidence == 0.0 {
            return Detection::quiet();
        }
        Detection {
            confidence,
            reason: format!("amplitude entropy {:.3} off baseline", entropy),
        }
    }

    fn observe(&self, features: &FeatureVector) {
        self.entropy.observe(features.statistical().entropy);
    }

    fn stats(&self) -> String {
        stats_line("amplitude_entropy", &self.entropy)
    }
}

// ============================================================================
// ENERGY SURGE
// ============================================================================

/// One-sided: only rising energy counts. A quiet source is not a threat
/// signal for this detector, a surging one is.
pub struct EnergySurgeDetector {
    log_energy: RollingBaseline,
}

impl EnergySurgeDetector {
    pub fn new(window: usize) -> Self {
        Self {
            log_energy: RollingBaseline::new(window),
        }
    }
}

impl Detector for EnergySurgeDetector {
    fn id(&self) -> &str {
        ENERGY_SURGE_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let energy = features.statistical().energy;
        let confidence = self.log_energy.confidence_above(energy.max(0.0).ln_1p());
        if confidence == 0.0 {
            return Detection::quiet();
        }
        Detection {
            confidence,
            reason: format!("energy surge: {:.4} above baseline", energy),
        }
    }

    fn observe(&self, features: &FeatureVector) {
        self.log_energy
            .observe(features.statistical().energy.max(0.0).ln_1p());
    }

    fn stats(&self) -> String {
        stats_line("ln1p_energy", &self.log_energy)
    }
}

// ============================================================================
// AUTOCORRELATION DRIFT
// ============================================================================

/// Structure change: a periodic source going white, or noise acquiring
/// memory, both move the lag-1 coefficient.
pub struct AutocorrDriftDetector {
    autocorr: RollingBaseline,
}

impl AutocorrDriftDetector {
    pub fn new(window: usize) -> Self {
        Self {
            autocorr: RollingBaseline::new(window),
        }
    }
}

impl Detector for AutocorrDriftDetector {
    fn id(&self) -> &str {
        AUTOCORR_DRIFT_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let autocorr = features.temporal().lag1_autocorrelation;
        let confidence = self.autocorr.confidence(autocorr);
        if confidence == 0.0 {
            return Detection::quiet();
        }
        Detection {
            confidence,
            reason: format!("lag-1 autocorrelation drifted to {:.3}", autocorr),
        }
    }

    fn observe(&self, features: &FeatureVector) {
        self.autocorr
            .observe(features.temporal().lag1_autocorrelation);
    }

    fn stats(&self) -> String {
        stats_line("lag1_autocorrelation", &self.autocorr)
    }
}

// ============================================================================
// TAIL SHAPE
// ============================================================================

/// Distribution shape outliers: skew flipping sign or kurtosis spiking
/// marks bursts and asymmetric faults the variance detector misses.
pub struct TailShapeDetector {
    skewness: RollingBaseline,
    kurtosis: RollingBaseline,
}

impl TailShapeDetector {
    pub fn new(window: usize) -> Self {
        Self {
            skewness: RollingBaseline::new(window),
            kurtosis: RollingBaseline::new(window),
        }
    }
}

impl Detector for TailShapeDetector {
    fn id(&self) -> &str {
        TAIL_SHAPE_ID
    }

    fn evaluate(&self, features: &FeatureVector, _domain: &ClassifiedDomain) -> Detection {
        let stats = features.statistical();
        let skew_conf = self.skewness.confidence(stats.skewness);
        let kurt_conf = self.kurtosis.confidence(stats.excess_kurtosis);

        let confidence = skew_conf.max(kurt_conf);
        if confidence == 0.0 {
            return Detection::quiet();
        }

        let reason = if skew_conf >= kurt_conf {
            format!("skewness {:.3} off baseline", stats.skewness)
        } else {
            format!("excess kurtosis {:.3} off baseline", stats.excess_kurtosis)
        };
        Detection { confidence, reason }
    }

    fn observe(&self, features: &FeatureVector) {
        let stats = features.statistical();
        self.skewness.observe(stats.skewness);
        self.kurtosis.observe(stats.excess_kurtosis);
    }

    fn stats(&self) -> String {
        format!(
            "{}; {}",
            stats_line("skewness", &self.skewness),
            stats_line("excess_kurtosis", &self.kurtosis)
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{classify, DomainSpec};
    use crate::features::FEATURE_COUNT;

    fn domain() -> ClassifiedDomain {
        let features = FeatureVector::from_values([0.0; FEATURE_COUNT]);
        let domains = vec![DomainSpec::new("network", vec![1.0; FEATURE_COUNT])];
        classify(&features, &domains).1
    }

    fn fv_with(index: usize, value: f32) -> FeatureVector {
        let mut values = [1.0; FEATURE_COUNT];
        values[index] = value;
        FeatureVector::from_values(values)
    }

    #[test]
    fn test_cold_detector_is_quiet() {
        let detector = GradientBurstDetector::new(100);
        let detection = detector.evaluate(&fv_with(3, 50.0), &domain());
        assert_eq!(detection.confidence, 0.0);
    }

    #[test]
    fn test_gradient_burst_fires_after_warmup() {
        let detector = GradientBurstDetector::new(100);
        // Stable gradient history around 1.0 with mild jitter.
        for i in 0..20 {
            let jitter = (i % 5) as f32 * 0.01;
            detector.observe(&fv_with(3, 1.0 + jitter));
        }

        let detection = detector.evaluate(&fv_with(3, 10.0), &domain());
        assert!(detection.confidence > 0.9);
        assert!(detection.reason.contains("gradient"));

        // A gradient at baseline stays quiet.
        let quiet = detector.evaluate(&fv_with(3, 1.02), &domain());
        assert!(quiet.confidence < 0.5);
    }

    #[test]
    fn test_energy_surge_is_one_sided() {
        let detector = EnergySurgeDetector::new(100);
        for i in 0..20 {
            let jitter = (i % 4) as f32 * 0.05;
            detector.observe(&fv_with(6, 100.0 + jitter));
        }

        let surge = detector.evaluate(&fv_with(6, 10_000.0), &domain());
        assert!(surge.confidence > 0.9);

        // Falling energy is not a surge.
        let drop = detector.evaluate(&fv_with(6, 0.1), &domain());
        assert_eq!(drop.confidence, 0.0);
    }

    #[test]
    fn test_spectral_shift_tracks_dominant_bin() {
        let detector = SpectralShiftDetector::new(100);
        for _ in 0..20 {
            let mut values = [1.0; FEATURE_COUNT];
            values[1] = 2.0; // stable entropy
            values[2] = 3.0; // stable dominant bin
            detector.observe(&FeatureVector::from_values(values));
        }

        let mut moved = [1.0; FEATURE_COUNT];
        moved[1] = 2.0;
        moved[2] = 12.0;
        let detection = detector.evaluate(&FeatureVector::from_values(moved), &domain());
        assert!(detection.confidence > 0.9);
        assert!(detection.reason.contains("dominant frequency"));
    }

    #[test]
    fn test_tail_shape_prefers_stronger_signal() {
        let detector = TailShapeDetector::new(100);
        for i in 0..20 {
            let jitter = (i % 3) as f32 * 0.01;
            let mut values = [1.0; FEATURE_COUNT];
            values[8] = jitter; // skewness near 0
            values[9] = jitter; // kurtosis near 0
            detector.observe(&FeatureVector::from_values(values));
        }

        let mut spiked = [1.0; FEATURE_COUNT];
        spiked[8] = 0.01;
        spiked[9] = 25.0;
        let detection = detector.evaluate(&FeatureVector::from_values(spiked), &domain());
        assert!(detection.confidence > 0.9);
        assert!(detection.reason.contains("kurtosis"));
    }

    #[test]
    fn test_evaluation_does_not_mutate_baseline() {
        let detector = VarianceRegimeDetector::new(100);
        for _ in 0..10 {
            detector.observe(&fv_with(4, 1.0));
        }

        // Many evaluations of a wild value must not shift the baseline.
        for _ in 0..50 {
            detector.evaluate(&fv_with(4, 1e6), &domain());
        }
        let detection = detector.evaluate(&fv_with(4, 1e6), &domain());
        assert!(detection.confidence > 0.9);
    }
}
