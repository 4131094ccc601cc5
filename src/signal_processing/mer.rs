//! Modulation error ratio estimator
//!
//! Grounded on `mer_measurement_impl.cc`: an exponentially averaged
//! squared-error estimate against the nearest constellation point,
//! reported as a SNR-like figure in dB. `enable`/`disable` let a caller
//! skip the work on frames where the estimate isn't needed.

use num_complex::Complex32;

use crate::config::MerConfig;
use crate::constellation::Constellation;

pub struct MerEstimator {
    alpha: f32,
    enabled: bool,
    avg_err: f32,
}

impl MerEstimator {
    pub fn new(config: MerConfig) -> Self {
        Self {
            alpha: config.alpha,
            enabled: config.enabled,
            avg_err: 0.0,
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.avg_err = 0.0;
    }

    pub fn get_snr(&self) -> f32 {
        if self.avg_err > 0.0 {
            10.0 * (1.0 / self.avg_err).log10()
        } else {
            f32::INFINITY
        }
    }

    /// Updates the running error estimate from a block of symbols already
    /// sliced to their nearest constellation point, if enabled.
    pub fn process(&mut self, symbols: &[Complex32], constellation: &Constellation) {
        if !self.enabled {
            return;
        }
        for &sample in symbols {
            let (point, _, _) = constellation.slice(sample);
            let err = (sample - point).norm_sqr();
            self.avg_err = self.alpha * err + (1.0 - self.alpha) * self.avg_err;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstellationOrder;

    #[test]
    fn perfect_symbols_give_infinite_snr() {
        let constellation = Constellation::new(ConstellationOrder::Qpsk);
        let mut mer = MerEstimator::new(MerConfig::default());
        let symbols = vec![constellation.map(1, 0); 100];
        mer.process(&symbols, &constellation);
        assert!(mer.get_snr().is_infinite());
    }

    #[test]
    fn noisy_symbols_lower_snr() {
        let constellation = Constellation::new(ConstellationOrder::Qpsk);
        let mut mer = MerEstimator::new(MerConfig { alpha: 1.0, enabled: true });
        let clean = constellation.map(1, 0);
        let noisy = clean + Complex32::new(0.2, 0.1);
        mer.process(&[noisy], &constellation);
        assert!(mer.get_snr() < 30.0);
        assert!(mer.get_snr() > -10.0);
    }

    #[test]
    fn disabled_estimator_does_not_update() {
        let constellation = Constellation::new(ConstellationOrder::Qpsk);
        let mut mer = MerEstimator::new(MerConfig { alpha: 0.1, enabled: false });
        let noisy = constellation.map(1, 0) + Complex32::new(1.0, 1.0);
        mer.process(&[noisy], &constellation);
        assert!(mer.get_snr().is_infinite());
    }
}
