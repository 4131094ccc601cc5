//! Spectrum analysis utility, used by diagnostics and by the coarse
//! frequency recovery block's peak search.

use rustfft::{num_complex::Complex32, FftPlanner};

/// Computes a DC-centered power spectrum (in dB) from a block of IQ
/// symbols, windowed and zero-padded to `fft_size`.
pub fn compute_power_spectrum_db(symbols: &[Complex32], fft_size: usize) -> Vec<f32> {
    if symbols.len() < 32 {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut buffer = prepare_fft_buffer(symbols, fft_size);
    let window_size = symbols.len().min(fft_size);
    apply_hamming_window(&mut buffer, window_size);

    fft.process(&mut buffer);

    let spectrum = power_spectrum_db(&buffer, window_size);
    center_spectrum(spectrum)
}

fn prepare_fft_buffer(symbols: &[Complex32], fft_size: usize) -> Vec<Complex32> {
    let mut buffer: Vec<Complex32> = symbols.iter().take(fft_size).copied().collect();
    buffer.resize(fft_size, Complex32::new(0.0, 0.0));
    buffer
}

fn apply_hamming_window(buffer: &mut [Complex32], window_size: usize) {
    for i in 0..window_size {
        let w = 0.54
            - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / (window_size as f32 - 1.0)).cos();
        buffer[i] = buffer[i] * w;
    }
}

fn power_spectrum_db(buffer: &[Complex32], actual_samples: usize) -> Vec<f32> {
    let window_power: f32 = 0.397;
    let scale = 1.0 / (actual_samples as f32 * window_power.sqrt());

    buffer
        .iter()
        .map(|c| {
            let power = c.norm_sqr() * scale * scale;
            if power > 1e-10 {
                10.0 * power.log10()
            } else {
                -100.0
            }
        })
        .collect()
}

fn center_spectrum(spectrum: Vec<f32>) -> Vec<f32> {
    let half = spectrum.len() / 2;
    let mut centered = Vec::with_capacity(spectrum.len());
    centered.extend_from_slice(&spectrum[half..]);
    centered.extend_from_slice(&spectrum[..half]);
    centered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_tone_peaks_at_center() {
        let symbols = vec![Complex32::new(1.0, 0.0); 128];
        let spectrum = compute_power_spectrum_db(&symbols, 512);

        assert!(!spectrum.is_empty());
        let (max_idx, &max_val) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        let center = spectrum.len() / 2;
        assert!((max_idx as i64 - center as i64).abs() < 10);
        assert!(max_val > -10.0);
    }

    #[test]
    fn insufficient_samples_returns_empty() {
        let symbols = vec![Complex32::new(1.0, 0.0); 16];
        assert!(compute_power_spectrum_db(&symbols, 512).is_empty());
    }
}
