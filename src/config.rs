//! Configuration types for the receiver chain.
//!
//! Every component config is constructed independently and validated with
//! `validate()` before the component is built, mirroring the construction-time
//! checks a GNU Radio block performs in its constructor.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstellationOrder {
    Bpsk,
    Qpsk,
}

impl ConstellationOrder {
    pub fn m(self) -> usize {
        match self {
            ConstellationOrder::Bpsk => 2,
            ConstellationOrder::Qpsk => 4,
        }
    }

    pub fn bits_per_symbol(self) -> usize {
        match self {
            ConstellationOrder::Bpsk => 1,
            ConstellationOrder::Qpsk => 2,
        }
    }
}

/// AGC parameters Defaults match `blocksat::agc_cc::make`'s defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgcConfig {
    pub rate: f32,
    pub reference: f32,
    pub initial_gain: f32,
    pub max_gain: f32,
}

impl Default for AgcConfig {
    fn default() -> Self {
        Self {
            rate: 1e-4,
            reference: 1.0,
            initial_gain: 1.0,
            max_gain: 65536.0,
        }
    }
}

impl AgcConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Coarse frequency recovery parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoarseFreqConfig {
    pub fft_len: usize,
    pub alpha: f32,
    pub sps: usize,
    pub frame_len: usize,
}

impl Default for CoarseFreqConfig {
    fn default() -> Self {
        Self {
            fft_len: 1024,
            alpha: 0.1,
            sps: 1,
            frame_len: 128,
        }
    }
}

impl CoarseFreqConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_len.is_power_of_two() {
            return Err(ConfigError::FftLenNotPowerOfTwo {
                fft_len: self.fft_len,
            });
        }
        Ok(())
    }
}

/// Frame synchronizer parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSyncConfig {
    pub preamble_i: Vec<f32>,
    pub preamble_q: Vec<f32>,
    pub frame_len: usize,
    pub n_success_to_lock: u32,
    pub en_fine_cfo: bool,
    pub en_phase_corr: bool,
    pub alpha: f32,
    pub fail_threshold: f32,
    pub debug_level: u8,
    pub en_gain_eq_debug: bool,
}

impl FrameSyncConfig {
    pub fn preamble_len(&self) -> usize {
        self.preamble_i.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preamble_i.is_empty() {
            return Err(ConfigError::EmptyPreamble);
        }
        if self.frame_len < self.preamble_len() {
            return Err(ConfigError::FrameShorterThanPreamble {
                frame_len: self.frame_len,
                preamble_len: self.preamble_len(),
            });
        }
        Ok(())
    }
}

impl Default for FrameSyncConfig {
    fn default() -> Self {
        Self {
            preamble_i: vec![1.0; 16],
            preamble_q: vec![0.0; 16],
            frame_len: 128,
            n_success_to_lock: 3,
            en_fine_cfo: true,
            en_phase_corr: true,
            alpha: 0.1,
            fail_threshold: 0.2,
            debug_level: 0,
            en_gain_eq_debug: false,
        }
    }
}

/// Carrier phase recovery parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarrierPhaseConfig {
    pub preamble_len: usize,
    pub frame_len: usize,
    pub tracking_interval: usize,
    pub bn_ts: f64,
    pub zeta: f64,
    pub data_aided: bool,
    pub reset_per_frame: bool,
    pub debug_stats: bool,
    pub debug_alpha: f32,
}

impl Default for CarrierPhaseConfig {
    fn default() -> Self {
        Self {
            preamble_len: 16,
            frame_len: 128,
            tracking_interval: 16,
            bn_ts: 0.01,
            zeta: 1.0,
            data_aided: false,
            reset_per_frame: true,
            debug_stats: false,
            debug_alpha: 0.01,
        }
    }
}

impl CarrierPhaseConfig {
    pub fn payload_len(&self) -> usize {
        self.frame_len - self.preamble_len
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_len < self.preamble_len {
            return Err(ConfigError::FrameShorterThanPreamble {
                frame_len: self.frame_len,
                preamble_len: self.preamble_len,
            });
        }
        if self.zeta <= 0.0 {
            return Err(ConfigError::NonPositiveDamping { zeta: self.zeta });
        }
        if self.bn_ts <= 0.0 {
            return Err(ConfigError::NonPositiveNoiseBandwidth { bn_ts: self.bn_ts });
        }
        let payload_len = self.payload_len();
        if self.tracking_interval == 0 || payload_len % self.tracking_interval != 0 {
            return Err(ConfigError::TrackingIntervalMismatch {
                tracking_interval: self.tracking_interval,
                payload_len,
            });
        }
        Ok(())
    }

    /// Derives the PI-loop gains `K1`/`K2` from the noise bandwidth-symbol
    /// product and damping factor, assuming unity detector/NCO gain.
    pub fn loop_gains(&self) -> (f64, f64) {
        let theta_n = self.bn_ts / (self.zeta + 1.0 / (4.0 * self.zeta));
        let denom = 1.0 + 2.0 * self.zeta * theta_n + theta_n * theta_n;
        let k1 = 4.0 * self.zeta * theta_n / denom;
        let k2 = 4.0 * theta_n * theta_n / denom;
        (k1, k2)
    }
}

/// MER estimator parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MerConfig {
    pub alpha: f32,
    pub enabled: bool,
}

impl Default for MerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            enabled: true,
        }
    }
}

/// Soft demapper parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SoftDemapperConfig {
    pub order: ConstellationOrder,
    pub n0: f32,
}

impl Default for SoftDemapperConfig {
    fn default() -> Self {
        Self {
            order: ConstellationOrder::Qpsk,
            n0: 1.0,
        }
    }
}

/// Turbo decoder interface parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TurboConfig {
    pub k: usize,
    pub puncture: bool,
    pub iteration_limit: u32,
    pub flip_llrs: bool,
}

impl TurboConfig {
    pub const RSC_TAIL_BITS: usize = 4;
    pub const ENCODED_TAIL_BITS: usize = 2 * Self::RSC_TAIL_BITS;

    /// Length of the unpunctured (rate 1/3) mother codeword.
    pub fn mother_codeword_len(&self) -> usize {
        3 * self.k + Self::ENCODED_TAIL_BITS
    }

    /// Length of the codeword actually carried on the channel.
    pub fn codeword_len(&self) -> usize {
        if self.puncture {
            2 * self.k + Self::ENCODED_TAIL_BITS
        } else {
            self.mother_codeword_len()
        }
    }
}

impl Default for TurboConfig {
    fn default() -> Self {
        Self {
            k: 128,
            puncture: true,
            iteration_limit: 6,
            flip_llrs: false,
        }
    }
}

/// Aggregate configuration for the whole receiver chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiverConfig {
    pub agc: AgcConfig,
    pub coarse_freq: CoarseFreqConfig,
    pub frame_sync: FrameSyncConfig,
    pub carrier_phase: CarrierPhaseConfig,
    pub mer: MerConfig,
    pub soft_demapper: SoftDemapperConfig,
    pub turbo: TurboConfig,
}
