//! Automatic gain control
//!
//! Grounded on `agc_cc_impl.cc`'s feedback-gain AGC: each output sample is
//! the input scaled by `sqrt(gain)`, and `gain` is nudged by the squared
//! error between the scaled output's power and a reference power.

use atomic_float::AtomicF32;
use num_complex::Complex32;
use std::sync::atomic::Ordering;

use crate::config::AgcConfig;
use crate::logging::SignalLogger;

/// Feedback-gain AGC. A [`sync_block`]-style component: every input sample
/// produces exactly one output sample, never more, never fewer.
pub struct Agc {
    rate: AtomicF32,
    reference_var: AtomicF32,
    gain: AtomicF32,
    max_gain: AtomicF32,
}

impl Agc {
    pub fn new(config: AgcConfig) -> Self {
        Self {
            rate: AtomicF32::new(config.rate),
            reference_var: AtomicF32::new(config.reference * config.reference),
            gain: AtomicF32::new(config.initial_gain),
            max_gain: AtomicF32::new(config.max_gain),
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain.load(Ordering::Relaxed)
    }

    pub fn set_rate(&self, rate: f32) {
        self.rate.store(rate, Ordering::Relaxed);
    }

    pub fn set_reference(&self, reference: f32) {
        self.reference_var
            .store(reference * reference, Ordering::Relaxed);
    }

    pub fn set_max_gain(&self, max_gain: f32) {
        self.max_gain.store(max_gain, Ordering::Relaxed);
    }

    /// Scales one sample and updates the gain estimate. Returns the scaled
    /// output and, as the second element, the inverse output amplitude
    /// `1/sqrt(gain)`, usable as an optional gain-equalization output.
    fn scale(&self, input: Complex32) -> (Complex32, f32) {
        let gain = self.gain.load(Ordering::Relaxed);
        let sqrt_gain = gain.sqrt();
        let output = input * sqrt_gain;

        let rate = self.rate.load(Ordering::Relaxed);
        let reference_var = self.reference_var.load(Ordering::Relaxed);
        let mut new_gain = gain + rate * (reference_var - output.norm_sqr());

        let max_gain = self.max_gain.load(Ordering::Relaxed);
        if max_gain > 0.0 && new_gain > max_gain {
            new_gain = max_gain;
        }
        self.gain.store(new_gain, Ordering::Relaxed);

        let inv_amplitude = if sqrt_gain > 0.0 { 1.0 / sqrt_gain } else { 0.0 };
        (output, inv_amplitude)
    }

    /// Processes a block, 1:1. Returns scaled samples; `inv_amplitude`
    /// carries the optional second output.
    pub fn process(&self, input: &[Complex32], logger: &mut SignalLogger) -> (Vec<Complex32>, Vec<f32>) {
        let mut output = Vec::with_capacity(input.len());
        let mut inv_amplitude = Vec::with_capacity(input.len());
        for &sample in input {
            let (out, inv_amp) = self.scale(sample);
            output.push(out);
            inv_amplitude.push(inv_amp);
        }
        logger.trace("AGC", format!("processed {} samples, gain={:.4}", input.len(), self.gain()));
        (output, inv_amplitude)
    }
}
