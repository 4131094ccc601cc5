//! Constellation table and hard-decision slicer
//!
//! The six-entry table and the bit layout it encodes are shared by the
//! frame synchronizer (matched-filter reference points), the MER
//! estimator and the soft demapper, so it lives in its own module rather
//! than inside any one of them.

use num_complex::Complex32;

use crate::config::ConstellationOrder;
use crate::utils::branchless_binary_slicer;

const SQRT1_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Shared Gray-coded constellation table. Index layout:
/// `0,1` are the BPSK points; `2..=5` are the QPSK points, selected by
/// `(q_bit << 1) | i_bit`.
const TABLE: [Complex32; 6] = [
    Complex32::new(-1.0, 0.0),
    Complex32::new(1.0, 0.0),
    Complex32::new(-SQRT1_2, -SQRT1_2),
    Complex32::new(SQRT1_2, -SQRT1_2),
    Complex32::new(-SQRT1_2, SQRT1_2),
    Complex32::new(SQRT1_2, SQRT1_2),
];

/// Shared BPSK/QPSK constellation and hard-decision slicer.
#[derive(Debug, Clone, Copy)]
pub struct Constellation {
    order: ConstellationOrder,
    im_mask: usize,
    offset: usize,
}

impl Constellation {
    pub fn new(order: ConstellationOrder) -> Self {
        let (im_mask, offset) = match order {
            ConstellationOrder::Qpsk => (0x1, 2),
            ConstellationOrder::Bpsk => (0x0, 0),
        };
        Self {
            order,
            im_mask,
            offset,
        }
    }

    pub fn order(&self) -> ConstellationOrder {
        self.order
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.order.bits_per_symbol()
    }

    /// The full shared table, for callers that need every reference point
    /// (the frame synchronizer's matched filter, the MER estimator).
    pub fn table(&self) -> &'static [Complex32; 6] {
        &TABLE
    }

    fn table_index(&self, i_bit: usize, q_bit: usize) -> usize {
        ((q_bit & self.im_mask) << 1) + i_bit + self.offset
    }

    /// Hard-decision slice: returns the nearest constellation point and the
    /// bits it represents, packed LSB-first as `(i_bit, q_bit)` — `q_bit` is
    /// always `0` for BPSK.
    pub fn slice(&self, sample: Complex32) -> (Complex32, u8, u8) {
        let i_bit = branchless_binary_slicer(sample.re);
        let q_bit = branchless_binary_slicer(sample.im) & self.im_mask;
        let point = TABLE[self.table_index(i_bit, q_bit)];
        (point, i_bit as u8, q_bit as u8)
    }

    /// Maps bits to the corresponding constellation point (the inverse of
    /// `slice`), used by test fixtures that synthesize known transmit
    /// symbols.
    pub fn map(&self, i_bit: u8, q_bit: u8) -> Complex32 {
        TABLE[self.table_index(i_bit as usize, q_bit as usize & self.im_mask)]
    }
}
