use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use serde::{Deserialize, Serialize};
use crate::cache::Cache;

/// Anything a cache can forward its misses and writebacks to: another cache, or a model of
/// memory at the end of the chain
pub trait MissHandler {
    fn access(&mut self, addr: u64, bytes: usize, store: bool);

    fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool);

    /// The level this one forwards to, if any. Used to check new connections for cycles
    fn next_level(&self) -> Option<SharedHandler> {
        None
    }
}

/// A next level shared between the caches in front of it, such as one L2 behind split L1s
pub type SharedHandler = Rc<RefCell<dyn MissHandler>>;

/// Reasons a connection between two levels is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The lower level already forwards, directly or not, to the upper one
    Cycle(String),
}

impl Display for ChainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::Cycle(name) => {
                write!(f, "connecting {name} to that level would make a cycle")
            }
        }
    }
}

impl std::error::Error for ChainError {}

/// Wires `lower` in as the next level of `upper`, refusing if `upper` is reachable from `lower`
/// or if the chain below `lower` already loops
///
/// Caches may also be wired with [`Cache::set_next_level`] directly when the shape of the chain
/// is already known to be acyclic
pub fn connect(upper: &Rc<RefCell<Cache>>, lower: SharedHandler) -> Result<(), ChainError> {
    let upper_ptr = Rc::as_ptr(upper) as *const ();
    let mut visited = HashSet::new();
    let mut current = Some(lower.clone());
    while let Some(level) = current {
        let ptr = Rc::as_ptr(&level) as *const ();
        if ptr == upper_ptr || !visited.insert(ptr) {
            return Err(ChainError::Cycle(upper.borrow().name().to_string()));
        }
        current = level.borrow().next_level();
    }
    upper.borrow_mut().set_next_level(lower);
    Ok(())
}

/// Traffic which reached main memory
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub reads: u64,
    pub writes: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl MemoryStats {
    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }
}

/// Terminates a chain. Every access is served, and only counted
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MainMemory {
    stats: MemoryStats,
}

impl MainMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }
}

impl MissHandler for MainMemory {
    fn access(&mut self, _addr: u64, bytes: usize, store: bool) {
        if store {
            self.stats.writes += 1;
            self.stats.bytes_written += bytes as u64;
        } else {
            self.stats.reads += 1;
            self.stats.bytes_read += bytes as u64;
        }
    }

    fn clean_invalidate(&mut self, _addr: u64, _bytes: usize, _clean: bool, _inval: bool) {}
}
