//! Receiver-chain diagnostic reporting.

pub mod metrics;

use serde::{Deserialize, Serialize};

/// Snapshot of receiver state after processing one frame, suitable for
/// logging or exporting to a monitoring sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    pub agc_gain: f32,
    pub coarse_freq_offset: f32,
    pub frame_locked: bool,
    pub frame_sync_peak: f32,
    pub fine_freq_offset: f32,
    pub carrier_phase_snr_db: f32,
    pub mer_db: f32,
    pub n_payload_symbols: u64,
}

/// Running totals across a session, independent of any single frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDiagnostics {
    pub frames_locked: u64,
    pub frames_lost: u64,
    pub frames_processed: u64,
}

impl SessionDiagnostics {
    pub fn record_frame(&mut self, frame: &FrameDiagnostics) {
        self.frames_processed += 1;
        if frame.frame_locked {
            self.frames_locked += 1;
        } else {
            self.frames_lost += 1;
        }
    }

    pub fn lock_ratio(&self) -> f32 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.frames_locked as f32 / self.frames_processed as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_ratio_tracks_locked_fraction() {
        let mut session = SessionDiagnostics::default();
        session.record_frame(&FrameDiagnostics {
            frame_locked: true,
            ..Default::default()
        });
        session.record_frame(&FrameDiagnostics {
            frame_locked: false,
            ..Default::default()
        });
        assert_eq!(session.frames_processed, 2);
        assert!((session.lock_ratio() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_session_has_zero_lock_ratio() {
        let session = SessionDiagnostics::default();
        assert_eq!(session.lock_ratio(), 0.0);
    }
}
