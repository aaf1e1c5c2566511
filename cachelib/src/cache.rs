use std::cell::RefCell;
use std::rc::Rc;
use log::{info, trace};
use crate::address::AddressDecoder;
use crate::chain::{MissHandler, SharedHandler};
use crate::config::{CacheConfig, CacheGeometry, ReplacementPolicyConfig};
use crate::stats::{CacheStats, NamedStats};
use crate::store::{GenericStore, LineHandle, Store};

/// A write-back, write-allocate cache with no timing, fed one access at a time
///
/// Misses fetch the whole line from the next level, and dirty lines are written back to it
/// when they are evicted or cleaned. Without a next level misses and writebacks are only
/// counted.
///
/// The cache assumes an access never spans more than one line. Splitting such accesses is the
/// responsibility of the caller
#[derive(Clone)]
pub struct Cache {
    name: String,
    geometry: CacheGeometry,
    decoder: AddressDecoder,
    store: GenericStore,
    stats: CacheStats,
    next_level: Option<SharedHandler>,
    log_misses: bool,
}

impl Cache {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `name`: Display name used in statistics and miss logs
    /// * `geometry`: The validated shape of the cache
    /// * `policy`: The replacement policy
    /// * `seed`: Seed for the random policy, ignored by the others
    ///
    /// returns: Cache
    pub fn new(
        name: impl Into<String>,
        geometry: CacheGeometry,
        policy: ReplacementPolicyConfig,
        seed: u32,
    ) -> Self {
        Self {
            name: name.into(),
            geometry,
            decoder: geometry.decoder(),
            store: GenericStore::new(&geometry, policy, seed),
            stats: CacheStats::default(),
            next_level: None,
            log_misses: false,
        }
    }

    /// Creates a cache from a configuration, using `default_name` if it doesn't name one
    pub fn from_config(config: &CacheConfig, default_name: &str) -> Self {
        let name = config.name.clone().unwrap_or_else(|| default_name.to_string());
        Self::new(name, config.geometry, config.replacement_policy, config.seed)
    }

    /// Wraps the cache so it can be shared as the next level of several others
    pub fn into_shared(self) -> Rc<RefCell<Cache>> {
        Rc::new(RefCell::new(self))
    }

    /// Sets the level misses and writebacks are forwarded to. The chain must not loop back to
    /// this cache, see [`crate::chain::connect`] for a checked version
    pub fn set_next_level(&mut self, next_level: SharedHandler) {
        self.next_level = Some(next_level);
    }

    pub fn set_log(&mut self, log_misses: bool) {
        self.log_misses = log_misses;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn store(&self) -> &GenericStore {
        &self.store
    }

    /// Statistics ready for printing under this cache's name
    pub fn named_stats(&self) -> NamedStats<'_> {
        NamedStats {
            name: &self.name,
            stats: &self.stats,
        }
    }

    pub fn resident_line_count(&self) -> usize {
        self.store.resident_line_count()
    }

    /// Reads or writes `bytes` bytes at `addr`
    pub fn access(&mut self, addr: u64, bytes: usize, store: bool) {
        self.stats.record_access(bytes, store);

        if let Some(hit) = self.store.lookup(addr) {
            if store {
                self.store.mark_dirty(hit);
            }
            return;
        }

        self.stats.record_miss(store);
        if self.log_misses {
            info!("{} {} miss 0x{addr:x}", self.name, if store { "write" } else { "read" });
        }

        let victim = self.store.victimize(addr);
        let line_size = self.geometry.line_size();
        if victim.valid && victim.dirty {
            let dirty_addr = self.decoder.block_address(victim.tag);
            trace!("{} writing back 0x{dirty_addr:x}", self.name);
            if let Some(next_level) = &self.next_level {
                next_level.borrow_mut().access(dirty_addr, line_size, true);
            }
            self.stats.record_writeback();
        }

        if let Some(next_level) = &self.next_level {
            next_level.borrow_mut().access(self.decoder.align(addr), line_size, false);
        }

        if store {
            // The line was installed by victimize, so this always hits
            if let Some(filled) = self.store.lookup(addr) {
                self.store.mark_dirty(filled);
            }
        }
    }

    /// Cleans and/or invalidates every line overlapping `[addr, addr + bytes)`, then passes the
    /// same request on to the next level
    ///
    /// Cleaning a dirty line counts a writeback here but isn't forwarded as a write, the next
    /// level sees the request itself instead. A range covering more lines than the cache holds is
    /// handled by visiting the resident lines instead of every address, and doesn't age them
    pub fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        let line_size = self.decoder.line_size() as u128;
        let start = self.decoder.align(addr) as u128;
        // Widened so ranges reaching the top of the address space stop there instead of wrapping
        let end = ((addr as u128 + bytes as u128 + line_size - 1) & !(line_size - 1))
            .min(1 << u64::BITS);
        let lines_in_range = (end - start) / line_size;
        let cache_lines = (self.geometry.sets() * self.geometry.ways()) as u128;

        if lines_in_range > cache_lines {
            for line in self.store.resident_lines() {
                let block = self.decoder.block_address(self.store.line(line).tag) as u128;
                if (start..end).contains(&block) {
                    self.maintain(line, clean, inval);
                }
            }
        } else {
            let mut current = start;
            while current < end {
                if let Some(line) = self.store.lookup(current as u64) {
                    self.maintain(line, clean, inval);
                }
                current += line_size;
            }
        }

        if let Some(next_level) = &self.next_level {
            next_level.borrow_mut().clean_invalidate(addr, bytes, clean, inval);
        }
    }

    fn maintain(&mut self, line: LineHandle, clean: bool, inval: bool) {
        if clean && self.store.clean(line) {
            self.stats.record_writeback();
        }
        if inval {
            self.store.invalidate(line);
        }
    }
}

impl MissHandler for Cache {
    fn access(&mut self, addr: u64, bytes: usize, store: bool) {
        Cache::access(self, addr, bytes, store)
    }

    fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        Cache::clean_invalidate(self, addr, bytes, clean, inval)
    }

    fn next_level(&self) -> Option<SharedHandler> {
        self.next_level.clone()
    }
}
