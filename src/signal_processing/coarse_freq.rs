//! Coarse frequency recovery
//!
//! Grounded on `ffw_coarse_freq_req_cc_impl.cc`: raise the incoming signal
//! to the `M`-th power to strip the modulation, locate the resulting tone
//! via an FFT peak search, and derotate the stream with an NCO whose
//! correction is applied starting at the next frame boundary so the phase
//! reference stays continuous across a frame.

use num_complex::Complex32;
use rustfft::FftPlanner;

use crate::config::CoarseFreqConfig;
use crate::logging::SignalLogger;
use crate::tags::{Tag, TaggedSample};
use crate::utils::wrap_phase;

pub struct CoarseFreqRecovery {
    fft_len: usize,
    alpha: f32,
    m_power: u32,
    delta_f: f32,
    frame_len_samples: usize,
    avg_power: Vec<f32>,
    planner: FftPlanner<f32>,
    phase_accum: f32,
    phase_inc: f32,
    pending: Option<(f32, usize)>,
    n_total: usize,
}

impl CoarseFreqRecovery {
    pub fn new(config: CoarseFreqConfig, m_power: u32) -> Self {
        let fft_len = config.fft_len;
        Self {
            fft_len,
            alpha: config.alpha,
            m_power,
            delta_f: 1.0 / (m_power as f32 * fft_len as f32),
            frame_len_samples: config.frame_len * config.sps,
            avg_power: vec![0.0; fft_len],
            planner: FftPlanner::new(),
            phase_accum: 0.0,
            phase_inc: 0.0,
            pending: None,
            n_total: 0,
        }
    }

    pub fn get_frequency(&self) -> f32 {
        self.phase_inc.abs()
    }

    pub fn reset(&mut self) {
        self.phase_inc = 0.0;
        self.phase_accum = 0.0;
        self.pending = None;
    }

    /// Notifies the recovery block that the frame synchronizer has locked
    /// onto a new start index supplied by the frame synchronizer's feedback message, in samples
    /// relative to the current block.
    pub fn handle_set_start_index(&mut self, start_index: usize, sps: usize) {
        self.n_total = start_index * sps;
    }

    fn estimate_freq_offset(&mut self, block: &[Complex32]) -> f32 {
        if block.len() < self.fft_len {
            return self.get_frequency();
        }

        let mut buffer: Vec<Complex32> = block[..self.fft_len]
            .iter()
            .map(|s| {
                let mut powered = *s;
                for _ in 1..self.m_power {
                    powered *= *s;
                }
                powered
            })
            .collect();

        let fft = self.planner.plan_fft_forward(self.fft_len);
        fft.process(&mut buffer);

        for (bin, sample) in buffer.iter().enumerate() {
            let mag = sample.norm_sqr();
            self.avg_power[bin] = self.alpha * mag + (1.0 - self.alpha) * self.avg_power[bin];
        }

        let (i_max, _) = self
            .avg_power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();

        let i_shifted = if i_max >= self.fft_len / 2 {
            i_max as i64 - self.fft_len as i64
        } else {
            i_max as i64
        };

        i_shifted as f32 * self.delta_f
    }

    /// Processes one block, returning the derotated samples and any `Cfo`
    /// tags emitted at the timing-aligned update point.
    pub fn process(&mut self, block: &[Complex32], logger: &mut SignalLogger) -> (Vec<Complex32>, Vec<TaggedSample>) {
        let mut output = Vec::with_capacity(block.len());
        let mut tags = Vec::new();

        if let Some((new_phase_inc, update_at)) = self.pending {
            if update_at >= self.n_total && update_at < self.n_total + block.len() {
                let offset = update_at - self.n_total;
                tags.push(TaggedSample {
                    offset,
                    tag: Tag::Cfo {
                        freq_offset: new_phase_inc / (-2.0 * std::f32::consts::PI),
                    },
                });
            }
        }

        for (i, &sample) in block.iter().enumerate() {
            let global_n = self.n_total + i;
            if let Some((new_phase_inc, update_at)) = self.pending {
                if global_n == update_at {
                    self.phase_inc = new_phase_inc;
                    self.pending = None;
                }
            }
            self.phase_accum = wrap_phase(self.phase_accum + self.phase_inc);
            let corr = Complex32::new(self.phase_accum.cos(), self.phase_accum.sin());
            output.push(sample * corr);
        }

        let f_e = self.estimate_freq_offset(block);
        let new_phase_inc = -2.0 * std::f32::consts::PI * f_e;

        if self.pending.is_none() && self.frame_len_samples > 0 {
            let next_boundary =
                ((self.n_total / self.frame_len_samples) + 1) * self.frame_len_samples;
            self.pending = Some((new_phase_inc, next_boundary));
        }

        logger.trace("CFR", format!("f_e={:.6} cycles/sample, phase_inc={:.6}", f_e, self.phase_inc));
        self.n_total += block.len();
        (output, tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::apply_frequency_offset;

    #[test]
    fn locks_onto_qpsk_tone_after_several_blocks() {
        let config = CoarseFreqConfig {
            fft_len: 256,
            alpha: 0.3,
            sps: 1,
            frame_len: 128,
        };
        let mut cfr = CoarseFreqRecovery::new(config, 4);
        let mut logger = SignalLogger::default();

        let true_offset_cycles_per_sample = 0.01;
        let symbols: Vec<Complex32> = (0..4096)
            .map(|i| Complex32::new(if i % 2 == 0 { 1.0 } else { -1.0 }, if (i / 2) % 2 == 0 { 1.0 } else { -1.0 }))
            .collect();
        let rotated = apply_frequency_offset(
            &symbols,
            true_offset_cycles_per_sample * 2.0 * std::f32::consts::PI,
            0.0,
        );

        for chunk in rotated.chunks(256) {
            cfr.process(chunk, &mut logger);
        }

        let estimated = cfr.get_frequency();
        let expected_rad_per_sample = true_offset_cycles_per_sample * 2.0 * std::f32::consts::PI;
        assert!(
            (estimated - expected_rad_per_sample).abs() < 0.01,
            "estimated {estimated}"
        );
    }

    #[test]
    fn reset_clears_phase_state() {
        let mut cfr = CoarseFreqRecovery::new(CoarseFreqConfig::default(), 4);
        let mut logger = SignalLogger::default();
        let block = vec![Complex32::new(1.0, 0.0); 1024];
        cfr.process(&block, &mut logger);
        cfr.reset();
        assert_eq!(cfr.get_frequency(), 0.0);
    }
}
