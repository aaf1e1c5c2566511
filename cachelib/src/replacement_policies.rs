use crate::store::Line;

/// A generic trait for implementing replacement policies. Used to parameterise the stores.
pub trait ReplacementPolicy {
    /// Whether the store should keep the per-line recency counters up to date for this policy.
    ///
    /// Maintaining them costs a sweep over every valid line on each lookup, so policies which
    /// don't read them leave this false and the sweep is compiled out
    const TRACKS_RECENCY: bool = false;

    /// Used by the store to pick the way to replace when a new line needs to be installed
    ///
    /// # Arguments
    ///
    /// * `set`: The set being filled. Always 0 for the fully associative store
    /// * `lines`: The candidate lines of that set, never empty
    ///
    /// returns: usize, an index into `lines`
    fn select_victim(&mut self, set: usize, lines: &[Line]) -> usize;
}

/// 32-bit Galois linear feedback shift register, taps 0xd0000001
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lfsr {
    reg: u32,
}

impl Lfsr {
    pub fn new(seed: u32) -> Self {
        // An all-zero register never leaves zero
        Self { reg: if seed == 0 { 1 } else { seed } }
    }

    pub fn next(&mut self) -> u32 {
        self.reg = (self.reg >> 1) ^ ((self.reg & 1).wrapping_neg() & 0xd000_0001);
        self.reg
    }
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Pseudo-random replacement. Each cache owns its generator, so two caches built with the
/// same seed make the same choices
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Random {
    lfsr: Lfsr,
}

impl Random {
    pub fn new(seed: u32) -> Self {
        Self { lfsr: Lfsr::new(seed) }
    }
}

impl ReplacementPolicy for Random {
    fn select_victim(&mut self, _set: usize, lines: &[Line]) -> usize {
        self.lfsr.next() as usize % lines.len()
    }
}

/// Least recently served replacement
///
/// The store ages every valid line on each lookup and zeroes a line when it is hit or
/// installed, so the oldest line is the one with the largest counter. This approximates LRU
/// without keeping any ordering. Empty ways are always filled before anything is evicted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeastRecentlyServed;

impl ReplacementPolicy for LeastRecentlyServed {
    const TRACKS_RECENCY: bool = true;

    fn select_victim(&mut self, _set: usize, lines: &[Line]) -> usize {
        if let Some(empty) = lines.iter().position(|line| !line.valid) {
            return empty;
        }
        let mut max_value = 0;
        let mut max_index = 0;
        // Strictly greater, ties stay with the lowest way
        for (index, line) in lines.iter().enumerate() {
            if line.recency > max_value {
                max_value = line.recency;
                max_index = index;
            }
        }
        max_index
    }
}

/// Round robin replacement, which keeps a separate cursor for each set
///
/// In the set associative store this replaces lines in the order they were installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobin {
    set_cursors: Vec<usize>,
}

impl RoundRobin {
    pub fn new(num_sets: usize) -> Self {
        Self {
            set_cursors: vec![0; num_sets],
        }
    }
}

impl ReplacementPolicy for RoundRobin {
    fn select_victim(&mut self, set: usize, lines: &[Line]) -> usize {
        let cursor = &mut self.set_cursors[set];
        let way = *cursor % lines.len();
        *cursor = (way + 1) % lines.len();
        way
    }
}
