//! Turbo decoder interface
//!
//! A real turbo decoder is a library-grade SISO/BCJR component with its own
//! trellis, interleaver and puncturing tables; this module owns the framing
//! around that boundary — puncturing, LLR sign convention and codeword
//! length validation — and stubs the iterative decode step itself: decode
//! by stripping bits, no correction yet.

use crate::config::TurboConfig;
use crate::errors::FecError;

/// Puncturing keeps the systematic bit and alternates which of the two
/// parity streams survives, halving the rate-1/3 mother code to rate 1/2.
/// The RSC trellis tail is carried unpunctured.
fn puncture(mother: &[f32], k: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(2 * k + TurboConfig::ENCODED_TAIL_BITS);
    for n in 0..k {
        let sys = mother[3 * n];
        let p1 = mother[3 * n + 1];
        let p2 = mother[3 * n + 2];
        out.push(sys);
        out.push(if n % 2 == 0 { p1 } else { p2 });
    }
    out.extend_from_slice(&mother[3 * k..]);
    out
}

/// Inverse of `puncture`: reinserts an erasure (zero) LLR at every position
/// that puncturing dropped.
fn depuncture(punctured: &[f32], k: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; 3 * k + TurboConfig::ENCODED_TAIL_BITS];
    for n in 0..k {
        let sys = punctured[2 * n];
        let kept = punctured[2 * n + 1];
        out[3 * n] = sys;
        if n % 2 == 0 {
            out[3 * n + 1] = kept;
        } else {
            out[3 * n + 2] = kept;
        }
    }
    let tail_start_punctured = 2 * k;
    let tail_start_mother = 3 * k;
    out[tail_start_mother..].copy_from_slice(&punctured[tail_start_punctured..]);
    out
}

/// Framing around an opaque turbo decoder library: validates codeword
/// length, applies the LLR sign convention and (de)puncturing, and produces
/// hard decisions.
pub struct TurboDecoderInterface {
    config: TurboConfig,
}

impl TurboDecoderInterface {
    pub fn new(config: TurboConfig) -> Self {
        Self { config }
    }

    /// Decodes one codeword's worth of channel LLRs into `K` hard-decided
    /// information bits.
    ///
    /// `flip_llrs` negates every LLR before depuncturing, matching decoders
    /// that expect the opposite sign convention from the soft demapper.
    pub fn decode(&self, llrs: &[f32]) -> Result<Vec<u8>, FecError> {
        let expected = self.config.codeword_len();
        if llrs.len() != expected {
            return Err(FecError::UnexpectedCodewordLength {
                expected,
                actual: llrs.len(),
                k: self.config.k,
            });
        }

        let signed = if self.config.flip_llrs {
            llrs.iter().map(|v| -v).collect::<Vec<_>>()
        } else {
            llrs.to_vec()
        };

        let mother = if self.config.puncture {
            depuncture(&signed, self.config.k)
        } else {
            signed
        };

        Ok(self.decode_mother(&mother))
    }

    /// Punctures (if enabled) a rate-1/3 mother codeword's worth of LLRs
    /// down to the channel codeword length. Exposed for encoder-side test
    /// harnesses and round-trip tests; the receiver chain itself only calls
    /// `decode`.
    pub fn puncture_mother(&self, mother: &[f32]) -> Vec<f32> {
        if self.config.puncture {
            puncture(mother, self.config.k)
        } else {
            mother.to_vec()
        }
    }

    /// Strips the systematic LLR out of each rate-1/3 group and hard-decides
    /// it. No SISO/BCJR iteration is performed — the real decoder sits
    /// behind this interface.
    fn decode_mother(&self, mother: &[f32]) -> Vec<u8> {
        (0..self.config.k)
            .map(|n| (mother[3 * n] > 0.0) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mother_codeword(k: usize, bits: &[u8]) -> Vec<f32> {
        let mut mother = vec![0.0f32; 3 * k + TurboConfig::ENCODED_TAIL_BITS];
        for (n, &b) in bits.iter().enumerate().take(k) {
            let sign = if b == 1 { 1.0 } else { -1.0 };
            mother[3 * n] = sign;
            mother[3 * n + 1] = sign * 0.5;
            mother[3 * n + 2] = sign * 0.5;
        }
        mother
    }

    #[test]
    fn rejects_wrong_length() {
        let config = TurboConfig {
            k: 8,
            puncture: true,
            iteration_limit: 6,
            flip_llrs: false,
        };
        let decoder = TurboDecoderInterface::new(config);
        let err = decoder.decode(&vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, FecError::UnexpectedCodewordLength { .. }));
    }

    #[test]
    fn puncture_depuncture_preserves_systematic_llrs() {
        let k = 6;
        let bits = [1, 0, 1, 1, 0, 0];
        let mother = mother_codeword(k, &bits);

        let config = TurboConfig {
            k,
            puncture: true,
            iteration_limit: 6,
            flip_llrs: false,
        };
        let decoder = TurboDecoderInterface::new(config);

        let punctured = decoder.puncture_mother(&mother);
        assert_eq!(punctured.len(), config.codeword_len());

        let decoded = decoder.decode(&punctured).unwrap();
        assert_eq!(decoded, bits);
    }

    #[test]
    fn flip_llrs_inverts_decision() {
        let k = 4;
        let bits = [1, 1, 0, 1];
        let mother = mother_codeword(k, &bits);

        let config = TurboConfig {
            k,
            puncture: true,
            iteration_limit: 6,
            flip_llrs: true,
        };
        let decoder = TurboDecoderInterface::new(config);

        let punctured = puncture(&mother, k);
        let flipped: Vec<f32> = punctured.iter().map(|v| -v).collect();
        let decoded = decoder.decode(&flipped).unwrap();
        assert_eq!(decoded, bits);
    }

    #[test]
    fn unpunctured_codeword_round_trips() {
        let k = 5;
        let bits = [0, 1, 1, 0, 1];
        let mother = mother_codeword(k, &bits);

        let config = TurboConfig {
            k,
            puncture: false,
            iteration_limit: 6,
            flip_llrs: false,
        };
        let decoder = TurboDecoderInterface::new(config);
        assert_eq!(mother.len(), config.codeword_len());

        let decoded = decoder.decode(&mother).unwrap();
        assert_eq!(decoded, bits);
    }
}
