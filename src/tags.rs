//! Stream tags and the inter-block message bus
//!
//! GNU Radio runs these blocks inside a scheduler that owns a shared tag
//! database and best-effort PMT message queues. This crate has no
//! scheduler, so tags become a plain `Vec<TaggedSample>` attached to a
//! processed range, and message ports become a single-slot,
//! most-recent-value-wins cell: drained once per `process()` call, no
//! backlog.

use crossbeam::atomic::AtomicCell;

/// A tag emitted at a given sample offset within the block currently being
/// processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tag {
    /// Coarse frequency offset correction, emitted by the coarse frequency
    /// recovery block at the timing-aligned update point
    Cfo { freq_offset: f32 },
    /// Fine (data-aided) frequency offset estimate, emitted by the frame
    /// synchronizer while locked
    FsFineCfo { freq_offset: f32 },
    /// Residual carrier phase estimate from the frame synchronizer's
    /// preamble correlation peak
    FsPhase { phase: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedSample {
    pub offset: usize,
    pub tag: Tag,
}

/// The feedback message the frame synchronizer sends back to the coarse
/// frequency recovery block once it has found a frame start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartIndexMsg {
    pub start_index: usize,
}

/// A single-slot, most-recent-value-wins message port.
pub struct MessagePort<T: Copy> {
    slot: AtomicCell<Option<T>>,
}

impl<T: Copy> MessagePort<T> {
    pub fn new() -> Self {
        Self {
            slot: AtomicCell::new(None),
        }
    }

    /// Publishes a value, overwriting anything not yet consumed.
    pub fn publish(&self, value: T) {
        self.slot.store(Some(value));
    }

    /// Consumes and returns the pending value, if any.
    pub fn take(&self) -> Option<T> {
        self.slot.swap(None)
    }
}

impl<T: Copy> Default for MessagePort<T> {
    fn default() -> Self {
        Self::new()
    }
}
