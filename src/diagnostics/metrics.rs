//! Generic signal quality metrics shared by the MER estimator and
//! higher-level diagnostics reporting.

use num_complex::Complex32;

/// Error Vector Magnitude between a reference and received symbol set, as a
/// percentage (0.0 = perfect match).
pub fn compute_evm(tx_symbols: &[Complex32], rx_symbols: &[Complex32]) -> f32 {
    if rx_symbols.is_empty() || tx_symbols.is_empty() {
        return 0.0;
    }

    let count = rx_symbols.len().min(tx_symbols.len());
    let mut error_sum = 0.0f32;
    let mut ref_power = 0.0f32;

    for i in 0..count {
        let error = rx_symbols[i] - tx_symbols[i];
        error_sum += error.norm_sqr();
        ref_power += tx_symbols[i].norm_sqr();
    }

    if ref_power > 0.0 {
        100.0 * (error_sum / ref_power).sqrt()
    } else {
        0.0
    }
}

/// Bit Error Rate between two equal-length (or min-length-truncated) bit
/// sequences.
pub fn compute_ber(tx_bits: &[u8], rx_bits: &[u8]) -> f32 {
    if tx_bits.is_empty() || rx_bits.is_empty() {
        return 0.0;
    }

    let count = tx_bits.len().min(rx_bits.len());
    let errors = (0..count).filter(|&i| tx_bits[i] != rx_bits[i]).count();

    errors as f32 / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_zero_for_perfect_match() {
        let symbols = vec![Complex32::new(0.707, 0.707), Complex32::new(-0.707, 0.707)];
        let evm = compute_evm(&symbols, &symbols);
        assert!(evm < 0.001);
    }

    #[test]
    fn evm_increases_with_noise() {
        let tx = vec![Complex32::new(1.0, 0.0)];
        let rx_clean = vec![Complex32::new(1.0, 0.0)];
        let rx_noisy = vec![Complex32::new(0.9, 0.1)];

        let evm_clean = compute_evm(&tx, &rx_clean);
        let evm_noisy = compute_evm(&tx, &rx_noisy);

        assert!(evm_noisy > evm_clean);
    }

    #[test]
    fn ber_zero_for_perfect_match() {
        let bits = vec![0, 1, 0, 1, 1, 0];
        assert_eq!(compute_ber(&bits, &bits), 0.0);
    }

    #[test]
    fn ber_calculation() {
        let tx = vec![0, 1, 0, 1, 1, 0, 1, 0];
        let rx = vec![0, 1, 1, 1, 1, 0, 0, 0];
        let ber = compute_ber(&tx, &rx);
        assert!((ber - 0.25).abs() < 0.001);
    }

    #[test]
    fn empty_input_returns_zero() {
        let empty: Vec<Complex32> = vec![];
        assert_eq!(compute_evm(&empty, &empty), 0.0);

        let empty_bits: Vec<u8> = vec![];
        assert_eq!(compute_ber(&empty_bits, &empty_bits), 0.0);
    }
}
