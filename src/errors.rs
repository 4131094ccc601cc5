//! Receiver error types with granular categories.

use thiserror::Error;

/// Top-level error type for all receiver operations.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("FEC error: {0}")]
    Fec(#[from] FecError),
}

/// Construction-time configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("constellation order M={m} is not supported (must be 2 or 4)")]
    InvalidConstellationOrder { m: usize },

    #[error("preamble must contain at least one symbol")]
    EmptyPreamble,

    #[error("frame_len {frame_len} must be >= preamble_len {preamble_len}")]
    FrameShorterThanPreamble {
        frame_len: usize,
        preamble_len: usize,
    },

    #[error(
        "tracking_interval {tracking_interval} does not evenly divide payload_len {payload_len}"
    )]
    TrackingIntervalMismatch {
        tracking_interval: usize,
        payload_len: usize,
    },

    #[error("fft_len {fft_len} is not a power of two")]
    FftLenNotPowerOfTwo { fft_len: usize },

    #[error("damping factor {zeta} must be positive")]
    NonPositiveDamping { zeta: f64 },

    #[error("noise bandwidth-symbol product {bn_ts} must be positive")]
    NonPositiveNoiseBandwidth { bn_ts: f64 },
}

/// FEC interface errors.
#[derive(Debug, Error)]
pub enum FecError {
    #[error("codeword length {actual} does not match the expected length {expected} for K={k} information bits")]
    UnexpectedCodewordLength {
        expected: usize,
        actual: usize,
        k: usize,
    },
}

/// Result type alias for receiver operations.
pub type Result<T> = std::result::Result<T, ReceiverError>;
