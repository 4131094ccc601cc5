//! AWGN channel simulation, used by tests and benches to exercise the
//! receiver chain against synthetic downlink conditions.

use num_complex::Complex32;
use rand::Rng;
use rand_distr::StandardNormal;

/// Rotates a symbol stream by a constant frequency offset, in radians/symbol,
/// and an initial phase. Used to synthesize CFO test fixtures for the coarse
/// and fine frequency recovery stages.
pub fn apply_frequency_offset(symbols: &[Complex32], freq_offset: f32, phase0: f32) -> Vec<Complex32> {
    symbols
        .iter()
        .enumerate()
        .map(|(n, s)| {
            let theta = phase0 + freq_offset * n as f32;
            s * Complex32::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Applies independent AWGN to the I and Q rails of each symbol.
pub fn apply_symbol_noise<R: Rng>(symbols: &[Complex32], noise_std: f32, rng: &mut R) -> Vec<Complex32> {
    symbols
        .iter()
        .map(|symbol| {
            let noise_i: f32 = rng.sample::<f32, _>(StandardNormal) * noise_std;
            let noise_q: f32 = rng.sample::<f32, _>(StandardNormal) * noise_std;
            symbol + Complex32::new(noise_i, noise_q)
        })
        .collect()
}

/// Applies channel attenuation and AWGN.
pub fn apply_channel<R: Rng>(
    symbols: &[Complex32],
    attenuation: f32,
    noise_std: f32,
    rng: &mut R,
) -> Vec<Complex32> {
    symbols
        .iter()
        .map(|symbol| {
            let attenuated = symbol * attenuation;
            let noise_i: f32 = rng.sample::<f32, _>(StandardNormal) * noise_std;
            let noise_q: f32 = rng.sample::<f32, _>(StandardNormal) * noise_std;
            attenuated + Complex32::new(noise_i, noise_q)
        })
        .collect()
}

/// Standard deviation per rail that produces the given symbol-energy SNR,
/// assuming unit-energy constellation points.
pub fn noise_std_for_snr_db(snr_db: f32) -> f32 {
    let snr_linear = 10f32.powf(snr_db / 10.0);
    (1.0 / (2.0 * snr_linear)).sqrt()
}
