use std::collections::HashMap;
use crate::address::AddressDecoder;
use crate::config::{CacheGeometry, ReplacementPolicyConfig};
use crate::replacement_policies::{LeastRecentlyServed, Random, ReplacementPolicy, RoundRobin};

/// Metadata for one cache line
///
/// A line which isn't valid has no meaningful tag and never hits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    /// The block address held by this line
    pub tag: u64,
    pub valid: bool,
    pub dirty: bool,
    /// Lookups since this line was last hit or installed. Only maintained for policies which
    /// track recency
    pub recency: u64,
}

impl Line {
    /// A freshly filled, clean line
    pub fn installed(tag: u64) -> Self {
        Self {
            tag,
            valid: true,
            dirty: false,
            recency: 0,
        }
    }
}

/// Refers to a line found by [`Store::lookup`]. Only meaningful for the store which returned it,
/// until that store is next victimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineHandle(usize);

/// The tag storage behind a cache
///
/// The trait assumes the caller handles accesses spanning multiple lines
pub trait Store {
    /// Finds the valid line holding `addr`, ignoring its dirty state
    ///
    /// For policies which track recency this ages every valid line first, and resets the
    /// recency of the line which was hit
    fn lookup(&mut self, addr: u64) -> Option<LineHandle>;

    /// Makes room for `addr` and installs it as a valid, clean line
    ///
    /// returns: Line, the previous contents of the replaced way. A way which was never written,
    /// or a fill which didn't need to evict anything, gives an invalid line
    fn victimize(&mut self, addr: u64) -> Line;

    fn line(&self, handle: LineHandle) -> &Line;

    fn mark_dirty(&mut self, handle: LineHandle);

    /// Clears the dirty flag, returning whether it was set
    fn clean(&mut self, handle: LineHandle) -> bool;

    fn invalidate(&mut self, handle: LineHandle);

    /// Gets the number of valid lines. Useful for analysing cache performance or debugging
    fn resident_line_count(&self) -> usize;

    /// Handles to every valid line, without touching recency
    fn resident_lines(&self) -> Vec<LineHandle>;
}

/// A fixed `sets * ways` array of lines, parameterised by a replacement policy
///
/// Sets are stored contiguously, so set `s` occupies `lines[s * ways..(s + 1) * ways]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAssociative<R: ReplacementPolicy> {
    decoder: AddressDecoder,
    ways: usize,
    lines: Vec<Line>,
    replacement_policy: R,
}

impl<R: ReplacementPolicy> SetAssociative<R> {
    pub fn new(geometry: &CacheGeometry, policy: R) -> Self {
        Self {
            decoder: geometry.decoder(),
            ways: geometry.ways(),
            lines: vec![Line::default(); geometry.sets() * geometry.ways()],
            replacement_policy: policy,
        }
    }
}

impl<R: ReplacementPolicy> Store for SetAssociative<R> {
    fn lookup(&mut self, addr: u64) -> Option<LineHandle> {
        let (set, tag) = self.decoder.set_and_tag(addr);
        if R::TRACKS_RECENCY {
            // Ages the whole cache, not just the set
            self.lines
                .iter_mut()
                .filter(|line| line.valid)
                .for_each(|line| line.recency += 1);
        }
        let lower_bound = set * self.ways;
        let way = self.lines[lower_bound..lower_bound + self.ways]
            .iter()
            .position(|line| line.valid && line.tag == tag)?;
        let index = lower_bound + way;
        self.lines[index].recency = 0;
        Some(LineHandle(index))
    }

    fn victimize(&mut self, addr: u64) -> Line {
        let (set, tag) = self.decoder.set_and_tag(addr);
        let lower_bound = set * self.ways;
        let ways = &self.lines[lower_bound..lower_bound + self.ways];
        let way = self.replacement_policy.select_victim(set, ways);
        std::mem::replace(&mut self.lines[lower_bound + way], Line::installed(tag))
    }

    fn line(&self, handle: LineHandle) -> &Line {
        &self.lines[handle.0]
    }

    fn mark_dirty(&mut self, handle: LineHandle) {
        self.lines[handle.0].dirty = true;
    }

    fn clean(&mut self, handle: LineHandle) -> bool {
        std::mem::replace(&mut self.lines[handle.0].dirty, false)
    }

    fn invalidate(&mut self, handle: LineHandle) {
        self.lines[handle.0].valid = false;
    }

    fn resident_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }

    fn resident_lines(&self) -> Vec<LineHandle> {
        (0..self.lines.len())
            .filter(|&index| self.lines[index].valid)
            .map(LineHandle)
            .collect()
    }
}

/// A single set of up to `ways` lines, found through a map from block address to slot
/// instead of a search
///
/// Used for large single set caches, where scanning every way on each lookup gets expensive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullyAssociative<R: ReplacementPolicy> {
    decoder: AddressDecoder,
    ways: usize,
    lines: Vec<Line>,
    slots: HashMap<u64, usize>,
    replacement_policy: R,
}

impl<R: ReplacementPolicy> FullyAssociative<R> {
    pub fn new(geometry: &CacheGeometry, policy: R) -> Self {
        debug_assert_eq!(geometry.sets(), 1);
        Self {
            decoder: geometry.decoder(),
            ways: geometry.ways(),
            lines: Vec::with_capacity(geometry.ways()),
            slots: HashMap::with_capacity(geometry.ways()),
            replacement_policy: policy,
        }
    }

    /// Number of blocks currently mapped, including invalidated ones which still hold a slot
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<R: ReplacementPolicy> Store for FullyAssociative<R> {
    fn lookup(&mut self, addr: u64) -> Option<LineHandle> {
        if R::TRACKS_RECENCY {
            self.lines
                .iter_mut()
                .filter(|line| line.valid)
                .for_each(|line| line.recency += 1);
        }
        let slot = *self.slots.get(&self.decoder.tag(addr))?;
        let line = &mut self.lines[slot];
        if !line.valid {
            return None;
        }
        line.recency = 0;
        Some(LineHandle(slot))
    }

    fn victimize(&mut self, addr: u64) -> Line {
        let tag = self.decoder.tag(addr);
        let (slot, victim) = if let Some(&slot) = self.slots.get(&tag) {
            // Only reachable for an invalidated line, which can be refilled in place
            (slot, Line::default())
        } else if self.lines.len() < self.ways {
            self.lines.push(Line::default());
            (self.lines.len() - 1, Line::default())
        } else {
            let slot = self.replacement_policy.select_victim(0, &self.lines);
            let victim = self.lines[slot];
            self.slots.remove(&victim.tag);
            (slot, victim)
        };
        self.slots.insert(tag, slot);
        self.lines[slot] = Line::installed(tag);
        victim
    }

    fn line(&self, handle: LineHandle) -> &Line {
        &self.lines[handle.0]
    }

    fn mark_dirty(&mut self, handle: LineHandle) {
        self.lines[handle.0].dirty = true;
    }

    fn clean(&mut self, handle: LineHandle) -> bool {
        std::mem::replace(&mut self.lines[handle.0].dirty, false)
    }

    fn invalidate(&mut self, handle: LineHandle) {
        self.lines[handle.0].valid = false;
    }

    fn resident_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }

    fn resident_lines(&self) -> Vec<LineHandle> {
        (0..self.lines.len())
            .filter(|&index| self.lines[index].valid)
            .map(LineHandle)
            .collect()
    }
}

/// Enum for every store and policy combination provided by the library
///
/// Going through `dyn Store` would mean a virtual call per access, which the compiler can't see
/// through. Branching over the concrete types lets it inline the lookups and drop the recency
/// sweep for policies which don't need it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericStore {
    Random(SetAssociative<Random>),
    LeastRecentlyServed(SetAssociative<LeastRecentlyServed>),
    RoundRobin(SetAssociative<RoundRobin>),
    FullRandom(FullyAssociative<Random>),
    FullLeastRecentlyServed(FullyAssociative<LeastRecentlyServed>),
    FullRoundRobin(FullyAssociative<RoundRobin>),
}

macro_rules! dispatch {
    ($store:expr, $s:ident => $body:expr) => {
        match $store {
            GenericStore::Random($s) => $body,
            GenericStore::LeastRecentlyServed($s) => $body,
            GenericStore::RoundRobin($s) => $body,
            GenericStore::FullRandom($s) => $body,
            GenericStore::FullLeastRecentlyServed($s) => $body,
            GenericStore::FullRoundRobin($s) => $body,
        }
    };
}

impl GenericStore {
    /// Picks the backing structure for a geometry. Large single set caches get the fully
    /// associative store, everything else the set associative array
    ///
    /// # Arguments
    ///
    /// * `geometry`: An already validated geometry
    /// * `policy`: The replacement policy to use
    /// * `seed`: Seed for the random policy, ignored by the others
    ///
    /// returns: GenericStore
    pub fn new(geometry: &CacheGeometry, policy: ReplacementPolicyConfig, seed: u32) -> Self {
        if geometry.is_fully_associative() {
            match policy {
                ReplacementPolicyConfig::Random => {
                    Self::FullRandom(FullyAssociative::new(geometry, Random::new(seed)))
                }
                ReplacementPolicyConfig::LeastRecentlyServed => {
                    let store = FullyAssociative::new(geometry, LeastRecentlyServed);
                    Self::FullLeastRecentlyServed(store)
                }
                ReplacementPolicyConfig::RoundRobin => {
                    Self::FullRoundRobin(FullyAssociative::new(geometry, RoundRobin::new(1)))
                }
            }
        } else {
            match policy {
                ReplacementPolicyConfig::Random => {
                    Self::Random(SetAssociative::new(geometry, Random::new(seed)))
                }
                ReplacementPolicyConfig::LeastRecentlyServed => {
                    Self::LeastRecentlyServed(SetAssociative::new(geometry, LeastRecentlyServed))
                }
                ReplacementPolicyConfig::RoundRobin => {
                    let policy = RoundRobin::new(geometry.sets());
                    Self::RoundRobin(SetAssociative::new(geometry, policy))
                }
            }
        }
    }

    pub fn is_fully_associative(&self) -> bool {
        matches!(
            self,
            Self::FullRandom(_) | Self::FullLeastRecentlyServed(_) | Self::FullRoundRobin(_)
        )
    }
}

impl Store for GenericStore {
    fn lookup(&mut self, addr: u64) -> Option<LineHandle> {
        dispatch!(self, s => s.lookup(addr))
    }

    fn victimize(&mut self, addr: u64) -> Line {
        dispatch!(self, s => s.victimize(addr))
    }

    fn line(&self, handle: LineHandle) -> &Line {
        dispatch!(self, s => s.line(handle))
    }

    fn mark_dirty(&mut self, handle: LineHandle) {
        dispatch!(self, s => s.mark_dirty(handle))
    }

    fn clean(&mut self, handle: LineHandle) -> bool {
        dispatch!(self, s => s.clean(handle))
    }

    fn invalidate(&mut self, handle: LineHandle) {
        dispatch!(self, s => s.invalidate(handle))
    }

    fn resident_line_count(&self) -> usize {
        dispatch!(self, s => s.resident_line_count())
    }

    fn resident_lines(&self) -> Vec<LineHandle> {
        dispatch!(self, s => s.resident_lines())
    }
}
