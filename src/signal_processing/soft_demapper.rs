//! Soft-decision demapper
//!
//! Grounded on `soft_decoder_cf_impl.cc`: computes log-likelihood ratios
//! for the bits each symbol encodes, scaled by the noise spectral density
//! `N0`. For QPSK each symbol yields two LLRs (`Im` gives the MSB, `Re`
//! gives the LSB); BPSK yields one LLR from `Re`.

use num_complex::Complex32;

use crate::config::{ConstellationOrder, SoftDemapperConfig};

pub struct SoftDemapper {
    order: ConstellationOrder,
    scale: f32,
}

impl SoftDemapper {
    pub fn new(config: SoftDemapperConfig) -> Self {
        let scale = match config.order {
            ConstellationOrder::Qpsk => -2.0 * std::f32::consts::SQRT_2 / config.n0,
            ConstellationOrder::Bpsk => -4.0 / config.n0,
        };
        Self {
            order: config.order,
            scale,
        }
    }

    pub fn set_n0(&mut self, n0: f32) {
        self.scale = match self.order {
            ConstellationOrder::Qpsk => -2.0 * std::f32::consts::SQRT_2 / n0,
            ConstellationOrder::Bpsk => -4.0 / n0,
        };
    }

    /// Number of LLRs produced per input symbol.
    pub fn llrs_per_symbol(&self) -> usize {
        self.order.bits_per_symbol()
    }

    pub fn demap(&self, symbols: &[Complex32]) -> Vec<f32> {
        let mut llrs = Vec::with_capacity(symbols.len() * self.llrs_per_symbol());
        for &s in symbols {
            match self.order {
                ConstellationOrder::Qpsk => {
                    llrs.push(self.scale * s.im);
                    llrs.push(self.scale * s.re);
                }
                ConstellationOrder::Bpsk => {
                    llrs.push(self.scale * s.re);
                }
            }
        }
        llrs
    }
}
