//! Frame synchronizer
//!
//! Grounded on `frame_synchronizer_cc_impl.cc`: while unlocked, search the
//! incoming block for the preamble by sliding correlation; once the
//! correlation peak clears the lock threshold, assume one preamble-prefixed
//! frame per subsequent block and track the peak magnitude, frame lock
//! state and a data-aided fine carrier-frequency estimate derived from the
//! preamble's lag autocorrelation.

use num_complex::Complex32;
use std::f32::consts::PI;

use crate::config::FrameSyncConfig;
use crate::logging::SignalLogger;
use crate::tags::{Tag, TaggedSample};
use crate::utils::{branchless_clip, wrap_phase};

pub struct FrameSyncResult {
    pub payload: Vec<Complex32>,
    pub tags: Vec<TaggedSample>,
    pub locked: bool,
    pub just_locked: bool,
    pub just_unlocked: bool,
    /// Sample offset within `block` where the preamble began, valid when
    /// `locked` is true. Feeds the FS -> CFR start-index message
    pub start_offset: usize,
}

pub struct FrameSynchronizer {
    preamble: Vec<Complex32>,
    frame_len: usize,
    n_success_to_lock: u32,
    fail_threshold: f32,
    alpha: f32,
    en_fine_cfo: bool,
    en_phase_corr: bool,
    en_gain_eq_debug: bool,
    locked: bool,
    avg_freq_offset: f32,
    mag_pmf_peak_norm: f32,
    last_i_frame_start: usize,
    success_cnt: u64,
    fail_cnt: u64,
    w_window: Vec<f32>,
    lag_window: usize,
}

impl FrameSynchronizer {
    pub fn new(config: &FrameSyncConfig) -> Self {
        let preamble: Vec<Complex32> = config
            .preamble_i
            .iter()
            .zip(config.preamble_q.iter())
            .map(|(&i, &q)| Complex32::new(i, q))
            .collect();

        let lag_window = (preamble.len() / 2).max(1);
        let l = lag_window as f32;
        let w_window = (1..=lag_window)
            .map(|m| {
                let m = m as f32;
                3.0 * ((2.0 * l + 1.0).powi(2) - (2.0 * m + 1.0).powi(2))
                    / (((2.0 * l + 1.0).powi(2) - 1.0) * (2.0 * l + 1.0))
            })
            .collect();

        Self {
            preamble,
            frame_len: config.frame_len,
            n_success_to_lock: config.n_success_to_lock.max(1),
            fail_threshold: config.fail_threshold,
            alpha: config.alpha,
            en_fine_cfo: config.en_fine_cfo,
            en_phase_corr: config.en_phase_corr,
            en_gain_eq_debug: config.en_gain_eq_debug,
            locked: false,
            avg_freq_offset: 0.0,
            mag_pmf_peak_norm: 0.0,
            last_i_frame_start: 0,
            success_cnt: 0,
            fail_cnt: 0,
            w_window,
            lag_window,
        }
    }

    pub fn preamble_len(&self) -> usize {
        self.preamble.len()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn mag_pmf_peak(&self) -> f32 {
        self.mag_pmf_peak_norm
    }

    /// Current consecutive success/failure counters gating the lock
    /// transition, not lifetime totals.
    pub fn success_fail_counts(&self) -> (u64, u64) {
        (self.success_cnt, self.fail_cnt)
    }

    pub fn fine_freq_offset(&self) -> f32 {
        self.avg_freq_offset
    }

    /// Inert diagnostic gain-equalization estimate: computed but never
    /// applied to samples.
    pub fn debug_eq_gain(&self) -> Option<f32> {
        if self.en_gain_eq_debug && self.mag_pmf_peak_norm > 0.0 {
            Some(1.0 / self.mag_pmf_peak_norm)
        } else {
            None
        }
    }

    fn correlate(&self, segment: &[Complex32]) -> Complex32 {
        segment
            .iter()
            .zip(self.preamble.iter())
            .map(|(s, p)| s * p.conj())
            .sum()
    }

    fn derotate(&self, segment: &[Complex32], freq_offset: f32) -> Vec<Complex32> {
        segment
            .iter()
            .enumerate()
            .map(|(k, &s)| {
                let theta = -2.0 * PI * freq_offset * k as f32;
                s * Complex32::new(theta.cos(), theta.sin())
            })
            .collect()
    }

    /// Modulation-removes the received preamble against the reference
    /// table, then averages the weighted angle differences of its lag
    /// autocorrelation to estimate the residual fine CFO, in cycles/sample.
    fn est_fine_freq_offset(&self, preamble: &[Complex32]) -> f32 {
        let n = preamble.len();
        let l = self.lag_window;

        let u: Vec<Complex32> = preamble
            .iter()
            .zip(self.preamble.iter())
            .map(|(&r, p)| r * p.conj())
            .collect();

        let mut angle = vec![0.0f32; l + 1];
        for m in 1..=(l + 1) {
            if m >= n {
                break;
            }
            let count = n - m;
            let mut r = Complex32::new(0.0, 0.0);
            for k in 0..count {
                r += u[k].conj() * u[k + m];
            }
            r /= count as f32;
            angle[m - 1] = r.im.atan2(r.re);
        }

        let mut weighted_sum = 0.0f32;
        for m in 1..=l {
            if m + 1 >= n {
                break;
            }
            let diff = wrap_phase(angle[m] - angle[m - 1]);
            weighted_sum += self.w_window[m - 1] * diff;
        }

        branchless_clip(weighted_sum / (2.0 * PI), 0.5)
    }

    fn search_preamble(&self, block: &[Complex32]) -> Option<(usize, Complex32)> {
        let preamble_len = self.preamble.len();
        if block.len() < preamble_len {
            return None;
        }
        (0..=block.len() - preamble_len)
            .map(|j| (j, self.correlate(&block[j..j + preamble_len])))
            .max_by(|a, b| a.1.norm_sqr().partial_cmp(&b.1.norm_sqr()).unwrap())
    }

    /// Processes one block. While unlocked, `block` may be any length and is
    /// searched for the preamble. Once locked, callers are expected to feed
    /// exactly `frame_len`-sized blocks, one frame at a time.
    pub fn process(&mut self, block: &[Complex32], logger: &mut SignalLogger) -> FrameSyncResult {
        let preamble_len = self.preamble.len();
        let mut tags = Vec::new();

        if !self.locked {
            let Some((start, corr)) = self.search_preamble(block) else {
                return FrameSyncResult {
                    payload: Vec::new(),
                    tags,
                    locked: false,
                    just_locked: false,
                    just_unlocked: false,
                    start_offset: 0,
                };
            };

            let mag = corr.norm();
            self.mag_pmf_peak_norm = mag / preamble_len as f32;

            if start == self.last_i_frame_start {
                self.success_cnt += 1;
            } else {
                self.success_cnt = 0;
            }
            self.last_i_frame_start = start;

            logger.trace(
                "FS",
                format!(
                    "success_cnt={}/{}, start={start}",
                    self.success_cnt, self.n_success_to_lock
                ),
            );

            if self.success_cnt >= self.n_success_to_lock as u64 {
                self.locked = true;
                self.avg_freq_offset = 0.0;
                self.success_cnt = 0;
                self.fail_cnt = 0;
                if self.en_phase_corr {
                    tags.push(TaggedSample {
                        offset: start + preamble_len - 1,
                        tag: Tag::FsPhase { phase: corr.arg() },
                    });
                }
                let payload = block[(start + preamble_len).min(block.len())..].to_vec();
                logger.info("FS", format!("locked at offset {start}, |peak|={mag:.3}"));
                return FrameSyncResult {
                    payload,
                    tags,
                    locked: true,
                    just_locked: true,
                    just_unlocked: false,
                    start_offset: start,
                };
            }

            return FrameSyncResult {
                payload: Vec::new(),
                tags,
                locked: false,
                just_locked: false,
                just_unlocked: false,
                start_offset: 0,
            };
        }

        if block.len() < preamble_len {
            return FrameSyncResult {
                payload: Vec::new(),
                tags,
                locked: true,
                just_locked: false,
                just_unlocked: false,
                start_offset: 0,
            };
        }

        let derotated = self.derotate(&block[..preamble_len], self.avg_freq_offset);
        let corr = self.correlate(&derotated);
        let mag_norm = corr.norm() / preamble_len as f32;
        self.mag_pmf_peak_norm = mag_norm;

        if mag_norm < self.fail_threshold {
            self.fail_cnt += 1;
        } else {
            self.fail_cnt = 0;
        }

        logger.trace(
            "FS",
            format!(
                "fail_cnt={}/{}, |peak|/L={mag_norm:.3}",
                self.fail_cnt, self.n_success_to_lock
            ),
        );

        if self.fail_cnt >= self.n_success_to_lock as u64 {
            self.locked = false;
            self.avg_freq_offset = 0.0;
            self.success_cnt = 0;
            self.fail_cnt = 0;
            logger.info("FS", format!("unlocked, |peak|/L={mag_norm:.3}"));
            return FrameSyncResult {
                payload: Vec::new(),
                tags,
                locked: false,
                just_locked: false,
                just_unlocked: true,
                start_offset: 0,
            };
        }

        if self.en_fine_cfo {
            let fine = self.est_fine_freq_offset(&derotated);
            self.avg_freq_offset = self.alpha * fine + (1.0 - self.alpha) * self.avg_freq_offset;
            tags.push(TaggedSample {
                offset: 0,
                tag: Tag::FsFineCfo {
                    freq_offset: self.avg_freq_offset,
                },
            });
        }

        if self.en_phase_corr {
            tags.push(TaggedSample {
                offset: preamble_len - 1,
                tag: Tag::FsPhase { phase: corr.arg() },
            });
        }

        let payload = block[preamble_len..].to_vec();
        FrameSyncResult {
            payload,
            tags,
            locked: true,
            just_locked: false,
            just_unlocked: false,
            start_offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameSyncConfig;

    fn preamble_qpsk(len: usize) -> (Vec<f32>, Vec<f32>) {
        let i: Vec<f32> = (0..len).map(|n| if n % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let q: Vec<f32> = (0..len).map(|n| if (n / 2) % 2 == 0 { 1.0 } else { -1.0 }).collect();
        (i, q)
    }

    #[test]
    fn does_not_lock_on_a_single_detection() {
        let (pi, pq) = preamble_qpsk(16);
        let config = FrameSyncConfig {
            preamble_i: pi.clone(),
            preamble_q: pq.clone(),
            frame_len: 48,
            n_success_to_lock: 2,
            ..FrameSyncConfig::default()
        };
        let mut fs = FrameSynchronizer::new(&config);
        let mut logger = SignalLogger::default();

        let preamble: Vec<Complex32> = pi.iter().zip(pq.iter()).map(|(&i, &q)| Complex32::new(i, q)).collect();
        let mut block = vec![Complex32::new(0.1, -0.1); 8];
        block.extend(preamble);
        block.extend(vec![Complex32::new(0.5, 0.5); 32]);

        let result = fs.process(&block, &mut logger);
        assert!(!result.locked);
        assert!(!result.just_locked);
    }

    #[test]
    fn locks_after_n_consecutive_identical_peaks() {
        let (pi, pq) = preamble_qpsk(16);
        let config = FrameSyncConfig {
            preamble_i: pi.clone(),
            preamble_q: pq.clone(),
            frame_len: 48,
            n_success_to_lock: 2,
            ..FrameSyncConfig::default()
        };
        let mut fs = FrameSynchronizer::new(&config);
        let mut logger = SignalLogger::default();

        let preamble: Vec<Complex32> = pi.iter().zip(pq.iter()).map(|(&i, &q)| Complex32::new(i, q)).collect();
        let mut block = vec![Complex32::new(0.1, -0.1); 8];
        block.extend(preamble);
        block.extend(vec![Complex32::new(0.5, 0.5); 32]);

        let first = fs.process(&block, &mut logger);
        assert!(!first.locked);
        let second = fs.process(&block, &mut logger);
        assert!(!second.locked, "still one short of n_success_to_lock");
        let third = fs.process(&block, &mut logger);
        assert!(third.locked);
        assert!(third.just_locked);
    }

    #[test]
    fn unlocks_after_n_consecutive_failures() {
        let (pi, pq) = preamble_qpsk(16);
        let config = FrameSyncConfig {
            preamble_i: pi,
            preamble_q: pq,
            frame_len: 48,
            fail_threshold: 0.2,
            n_success_to_lock: 2,
            ..FrameSyncConfig::default()
        };
        let mut fs = FrameSynchronizer::new(&config);
        let mut logger = SignalLogger::default();
        fs.locked = true;
        fs.avg_freq_offset = 0.0;

        let noise_frame = vec![Complex32::new(0.01, -0.02); 48];
        let first = fs.process(&noise_frame, &mut logger);
        assert!(first.locked, "one failure is not enough to unlock");
        assert!(!first.just_unlocked);

        let second = fs.process(&noise_frame, &mut logger);
        assert!(!second.locked);
        assert!(second.just_unlocked);
    }

    #[test]
    fn fine_cfo_tracks_small_offset() {
        let (pi, pq) = preamble_qpsk(32);
        let preamble: Vec<Complex32> = pi.iter().zip(pq.iter()).map(|(&i, &q)| Complex32::new(i, q)).collect();
        let config = FrameSyncConfig {
            preamble_i: pi,
            preamble_q: pq,
            frame_len: preamble.len(),
            alpha: 1.0,
            ..FrameSyncConfig::default()
        };
        let mut fs = FrameSynchronizer::new(&config);
        fs.locked = true;

        let freq_offset = 0.01;
        let rotated: Vec<Complex32> = preamble
            .iter()
            .enumerate()
            .map(|(k, &s)| {
                let theta = 2.0 * PI * freq_offset * k as f32;
                s * Complex32::new(theta.cos(), theta.sin())
            })
            .collect();

        let mut logger = SignalLogger::default();
        fs.process(&rotated, &mut logger);
        assert!((fs.avg_freq_offset - freq_offset).abs() < 0.01);
    }
}
