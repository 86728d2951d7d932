use bit_field::BitField;

pub const SEGMENT_COUNT: usize = 16;

/// Result of translating a segmented address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub address: u32,
    pub segment: u8,
    /// The segment had no base, so the offset was used on its own.
    pub fallback: bool,
}

/// Sixteen segment bases. A segmented address keeps the segment id in
/// bits 24..28 and a 24-bit offset below it; bits 28..32 are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentTable {
    bases: [u32; SEGMENT_COUNT],
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn set(&mut self, id: u8, base: u32) {
        self.bases[(id & 0xF) as usize] = base;
    }

    /// Base of segment `id`, or `None` if it was never set (or set to 0).
    pub fn get(&self, id: u8) -> Option<u32> {
        match self.bases[(id & 0xF) as usize] {
            0 => None,
            base => Some(base),
        }
    }

    pub fn bases(&self) -> &[u32; SEGMENT_COUNT] {
        &self.bases
    }

    pub fn clear(&mut self) {
        self.bases = [0; SEGMENT_COUNT];
    }

    pub fn lookup(&self, logical: u32) -> Resolved {
        let segment = logical.get_bits(24..28) as u8;
        let offset = logical.get_bits(0..24);

        match self.get(segment) {
            Some(base) => Resolved { address: base.wrapping_add(offset), segment, fallback: false },
            None => Resolved { address: offset, segment, fallback: true },
        }
    }

    #[inline(always)]
    pub fn resolve(&self, logical: u32) -> u32 {
        self.lookup(logical).address
    }
}
