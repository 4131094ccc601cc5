//! Shared numeric helpers used across the receiver chain.

use num_complex::Complex32;

/// Wraps an angle to `(-pi, pi]`, as used by every phase-accumulating loop
/// in the chain (coarse frequency recovery, carrier phase recovery, the
/// frame synchronizer's fine-CFO estimator).
pub fn wrap_phase(phase: f32) -> f32 {
    use std::f32::consts::PI;
    let mut p = phase;
    while p > PI {
        p -= 2.0 * PI;
    }
    while p <= -PI {
        p += 2.0 * PI;
    }
    p
}

/// Clips a value to `[-limit, limit]`.
pub fn branchless_clip(value: f32, limit: f32) -> f32 {
    value.max(-limit).min(limit)
}

/// `1` for positive input, `0` otherwise — the binary slicer used by the
/// constellation demapper to turn a rail into a bit/table index.
pub fn branchless_binary_slicer(value: f32) -> usize {
    (value > 0.0) as usize
}

pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &b)| acc | ((b & 1) << (7 - i)))
        })
        .collect()
}

pub fn complex_from_interleaved(data: &[f32]) -> Vec<Complex32> {
    data.chunks(2)
        .map(|chunk| Complex32::new(chunk[0], chunk[1]))
        .collect()
}

pub fn interleaved_from_complex(data: &[Complex32]) -> Vec<f32> {
    data.iter().flat_map(|c| [c.re, c.im]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn wrap_phase_keeps_range() {
        assert!((wrap_phase(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_phase(-3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_phase(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn slicer_matches_sign() {
        assert_eq!(branchless_binary_slicer(0.01), 1);
        assert_eq!(branchless_binary_slicer(-0.01), 0);
        assert_eq!(branchless_binary_slicer(0.0), 0);
    }

    #[test]
    fn clip_saturates() {
        assert_eq!(branchless_clip(5.0, 1.0), 1.0);
        assert_eq!(branchless_clip(-5.0, 1.0), -1.0);
        assert_eq!(branchless_clip(0.3, 1.0), 0.3);
    }

    #[test]
    fn complex_conversion_roundtrip() {
        let samples = [Complex32::new(0.5, -0.25), Complex32::new(-1.0, 2.0)];
        let interleaved = interleaved_from_complex(&samples);
        assert_eq!(interleaved, vec![0.5, -0.25, -1.0, 2.0]);
        let reconstructed = complex_from_interleaved(&interleaved);
        assert_eq!(reconstructed, samples);
    }

    #[test]
    fn pack_bits_msb_first() {
        let bits = [1, 0, 1, 0, 1, 0, 1, 0];
        assert_eq!(pack_bits(&bits), vec![0b1010_1010]);
    }
}
