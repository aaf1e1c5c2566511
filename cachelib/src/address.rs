/// Splits byte addresses into the pieces a cache needs: the set they map to and the block
/// address stored as the tag.
///
/// The tag keeps the index bits embedded, so a line is identified by its tag alone and two
/// lines with the same tag can never share a set. Both `sets` and `line_size` must already be
/// validated powers of two, see [`crate::config::CacheGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    block_shift: u32,
    set_mask: u64,
    line_size: u64,
}

impl AddressDecoder {
    pub fn new(sets: usize, line_size: usize) -> Self {
        debug_assert!(sets.is_power_of_two() && line_size.is_power_of_two());
        Self {
            block_shift: line_size.trailing_zeros(),
            set_mask: sets as u64 - 1,
            line_size: line_size as u64,
        }
    }

    /// The block address, i.e. the address with the offset bits removed
    #[inline]
    pub fn tag(&self, addr: u64) -> u64 {
        addr >> self.block_shift
    }

    #[inline]
    pub fn set_index(&self, addr: u64) -> usize {
        ((addr >> self.block_shift) & self.set_mask) as usize
    }

    /// Converts an address into a set and a tag in one go
    #[inline]
    pub fn set_and_tag(&self, addr: u64) -> (usize, u64) {
        (self.set_index(addr), self.tag(addr))
    }

    /// Rounds an address down to the start of its line
    #[inline]
    pub fn align(&self, addr: u64) -> u64 {
        addr & !(self.line_size - 1)
    }

    /// Rebuilds the first byte address of the block a tag was taken from
    #[inline]
    pub fn block_address(&self, tag: u64) -> u64 {
        tag << self.block_shift
    }

    pub fn block_shift(&self) -> u32 {
        self.block_shift
    }

    pub fn line_size(&self) -> u64 {
        self.line_size
    }
}
