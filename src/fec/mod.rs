//! Forward error correction interface: framing around an opaque turbo
//! decoder (puncturing, codeword-length validation, LLR sign convention).

pub mod turbo;

pub use turbo::TurboDecoderInterface;
