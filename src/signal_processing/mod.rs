//! DSP building blocks of the receiver chain: AGC, coarse and fine carrier
//! recovery, frame synchronization, MER estimation and soft demapping.

pub mod agc;
pub mod carrier_phase;
pub mod coarse_freq;
pub mod frame_sync;
pub mod mer;
pub mod soft_demapper;
pub mod spectrum;

pub use agc::Agc;
pub use carrier_phase::CarrierPhaseRecovery;
pub use coarse_freq::CoarseFreqRecovery;
pub use frame_sync::FrameSynchronizer;
pub use mer::MerEstimator;
pub use soft_demapper::SoftDemapper;
