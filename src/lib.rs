//! Core DSP receiver library for BPSK/QPSK satellite downlink
//! synchronization and decoding.
//!
//! The modules mirror the block-by-block structure of the GNU Radio
//! flowgraph this crate is descended from, but run as plain, schedulerless
//! Rust: [`pipeline::ReceiverChain`] wires the blocks together and is the
//! single entry point data flows through.

pub mod channel;
pub mod config;
pub mod constellation;
pub mod diagnostics;
pub mod errors;
pub mod fec;
pub mod logging;
pub mod pipeline;
pub mod signal_processing;
pub mod tags;
pub mod utils;

pub use config::ReceiverConfig;
pub use errors::{ConfigError, FecError, ReceiverError, Result};
pub use pipeline::{ChainOutput, ReceiverChain};
