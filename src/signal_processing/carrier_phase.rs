//! Data-aided carrier phase recovery
//!
//! Grounded on `da_carrier_phase_rec_impl.cc`: a second-order PI loop
//! steers an NCO that derotates each symbol. The preamble is fully known
//! and always drives the phase-error detector; the payload is split into
//! groups of `tracking_interval` symbols where the last symbol of each
//! group is a known tracking pilot (data-aided detector, not part of the
//! demapped output) and the rest are data symbols (decision-directed
//! detector, data-aided gating optional via `data_aided`).

use num_complex::Complex32;

use crate::config::CarrierPhaseConfig;
use crate::constellation::Constellation;
use crate::logging::SignalLogger;

pub struct CarrierPhaseRecovery {
    config: CarrierPhaseConfig,
    k1: f64,
    k2: f64,
    nco_phase: f32,
    integrator: f32,
    avg_err: f32,
    n_sym_tot: u64,
}

pub struct CarrierPhaseOutput {
    pub payload_symbols: Vec<Complex32>,
}

impl CarrierPhaseRecovery {
    pub fn new(config: CarrierPhaseConfig) -> Self {
        let (k1, k2) = config.loop_gains();
        Self {
            config,
            k1,
            k2,
            nco_phase: 0.0,
            integrator: 0.0,
            avg_err: 0.0,
            n_sym_tot: 0,
        }
    }

    pub fn get_snr(&self) -> f32 {
        if self.avg_err > 0.0 {
            10.0 * (1.0 / self.avg_err).log10()
        } else {
            f32::INFINITY
        }
    }

    pub fn symbol_error_stats(&self) -> u64 {
        self.n_sym_tot
    }

    fn loop_step(&mut self, phi_error: f32) {
        self.integrator += phi_error * self.k2 as f32;
        self.nco_phase += phi_error * self.k1 as f32 + self.integrator;
    }

    fn derotate(&self, symbol: Complex32) -> Complex32 {
        symbol * Complex32::new(self.nco_phase.cos(), -self.nco_phase.sin())
    }

    fn da_error(x: Complex32, reference: Complex32) -> f32 {
        x.im * reference.re - x.re * reference.im
    }

    /// Processes one frame: `preamble_rx` and `preamble_ref` are the
    /// received and known-clean preamble symbols; `payload_rx` is the
    /// remainder of the frame, and `tracking_pilot` is the known symbol
    /// inserted every `tracking_interval`-th payload position.
    pub fn process(
        &mut self,
        preamble_rx: &[Complex32],
        preamble_ref: &[Complex32],
        payload_rx: &[Complex32],
        tracking_pilot: Complex32,
        constellation: &Constellation,
        logger: &mut SignalLogger,
    ) -> CarrierPhaseOutput {
        if self.config.reset_per_frame {
            self.nco_phase = 0.0;
            self.integrator = 0.0;
            if self.config.debug_stats {
                self.avg_err = 0.0;
            }
        }

        for (rx, reference) in preamble_rx.iter().zip(preamble_ref.iter()) {
            let x = self.derotate(*rx);
            let phi_error = Self::da_error(x, *reference);
            if self.config.debug_stats {
                self.avg_err = self.config.debug_alpha * phi_error * phi_error
                    + (1.0 - self.config.debug_alpha) * self.avg_err;
            }
            self.loop_step(phi_error);
        }

        let interval = self.config.tracking_interval.max(1);
        let mut payload_symbols = Vec::with_capacity(payload_rx.len());

        for group in payload_rx.chunks(interval) {
            let (data, pilot) = if group.len() == interval {
                (&group[..interval - 1], Some(group[interval - 1]))
            } else {
                (group, None)
            };

            for &rx in data {
                let x = self.derotate(rx);
                let (point, _, _) = constellation.slice(x);
                let mut phi_error = Self::da_error(x, point);
                if self.config.data_aided {
                    phi_error = 0.0;
                }
                self.loop_step(phi_error);
                payload_symbols.push(x);
                self.n_sym_tot += 1;
            }

            if let Some(rx) = pilot {
                let x = self.derotate(rx);
                let phi_error = Self::da_error(x, tracking_pilot);
                self.loop_step(phi_error);
            }
        }

        logger.trace(
            "CPR",
            format!("nco_phase={:.4}, get_snr={:.2} dB", self.nco_phase, self.get_snr()),
        );

        CarrierPhaseOutput { payload_symbols }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstellationOrder;

    #[test]
    fn da_error_is_zero_on_exact_match() {
        let x = Complex32::new(1.0, 0.0);
        assert_eq!(CarrierPhaseRecovery::da_error(x, x), 0.0);
    }

    #[test]
    fn tracks_small_constant_phase_offset() {
        let mut config = CarrierPhaseConfig::default();
        config.preamble_len = 16;
        config.frame_len = 16 + 16;
        config.tracking_interval = 4;
        let mut cpr = CarrierPhaseRecovery::new(config);
        let constellation = Constellation::new(ConstellationOrder::Qpsk);
        let mut logger = SignalLogger::default();

        let phase_offset = 0.2f32;
        let rot = Complex32::new(phase_offset.cos(), phase_offset.sin());

        let preamble_ref: Vec<Complex32> = (0..16)
            .map(|n| constellation.map((n % 2) as u8, ((n / 2) % 2) as u8))
            .collect();
        let preamble_rx: Vec<Complex32> = preamble_ref.iter().map(|s| s * rot).collect();

        let pilot = constellation.map(1, 1);
        let mut payload_ref = Vec::new();
        for g in 0..4 {
            for n in 0..3 {
                payload_ref.push(constellation.map(((g + n) % 2) as u8, 0));
            }
            payload_ref.push(pilot);
        }
        let payload_rx: Vec<Complex32> = payload_ref.iter().map(|s| s * rot).collect();

        let out = cpr.process(&preamble_rx, &preamble_ref, &payload_rx, pilot, &constellation, &mut logger);

        assert_eq!(out.payload_symbols.len(), 12);
        for (sym, reference) in out.payload_symbols.iter().zip(
            payload_ref
                .chunks(4)
                .flat_map(|c| c[..3].iter())
        ) {
            assert!((sym - reference).norm() < 0.3, "sym={sym:?} reference={reference:?}");
        }
    }
}
