use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// Counters kept by each cache. They only ever go up, and only the owning cache updates them
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub read_accesses: u64,
    pub write_accesses: u64,
    pub read_misses: u64,
    pub write_misses: u64,
    pub writebacks: u64,
}

impl CacheStats {
    pub(crate) fn record_access(&mut self, bytes: usize, store: bool) {
        if store {
            self.write_accesses += 1;
            self.bytes_written += bytes as u64;
        } else {
            self.read_accesses += 1;
            self.bytes_read += bytes as u64;
        }
    }

    pub(crate) fn record_miss(&mut self, store: bool) {
        if store {
            self.write_misses += 1;
        } else {
            self.read_misses += 1;
        }
    }

    pub(crate) fn record_writeback(&mut self) {
        self.writebacks += 1;
    }

    pub fn accesses(&self) -> u64 {
        self.read_accesses + self.write_accesses
    }

    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    pub fn hits(&self) -> u64 {
        self.accesses() - self.misses()
    }

    /// Misses as a percentage of accesses, or None if nothing has been accessed
    pub fn miss_rate(&self) -> Option<f64> {
        match self.accesses() {
            0 => None,
            accesses => Some(100.0 * self.misses() as f64 / accesses as f64),
        }
    }
}

/// The statistics of one named cache, printed in the usual simulator layout:
///
/// ```text
/// D$ Bytes Read:            4096
/// D$ Miss Rate:             3.125%
/// ```
///
/// Nothing is printed for a cache which was never accessed
pub struct NamedStats<'a> {
    pub name: &'a str,
    pub stats: &'a CacheStats,
}

impl Display for NamedStats<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some(miss_rate) = self.stats.miss_rate() else {
            return Ok(());
        };
        let name = self.name;
        let stats = self.stats;
        writeln!(f, "{name} Bytes Read:            {}", stats.bytes_read)?;
        writeln!(f, "{name} Bytes Written:         {}", stats.bytes_written)?;
        writeln!(f, "{name} Read Accesses:         {}", stats.read_accesses)?;
        writeln!(f, "{name} Write Accesses:        {}", stats.write_accesses)?;
        writeln!(f, "{name} Read Misses:           {}", stats.read_misses)?;
        writeln!(f, "{name} Write Misses:          {}", stats.write_misses)?;
        writeln!(f, "{name} Writebacks:            {}", stats.writebacks)?;
        writeln!(f, "{name} Miss Rate:             {miss_rate:.3}%")
    }
}
