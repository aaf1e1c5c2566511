use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::{Duration, Instant};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::cache::Cache;
use crate::chain::{MainMemory, MemoryStats, SharedHandler};
use crate::config::{CacheGeometry, ConfigError, HierarchyConfig};
use crate::stats::{CacheStats, NamedStats};
use crate::trace::{parse_record, AccessKind, TraceOp, RECORD_SIZE};
use crate::tracer::{DCacheTracer, ICacheTracer, MemTracer};

/// Replays traces through a cache hierarchy and collects the results
///
/// The first level caches each sit behind a tracer which picks the accesses they see. They
/// share the second level cache if there is one, and main memory is at the end of the chain.
/// `simulate` can be called multiple times, the caches and results carry over between calls
pub struct Simulator {
    tracers: Vec<Box<dyn MemTracer>>,
    l2: Option<Rc<RefCell<Cache>>>,
    memory: Rc<RefCell<MainMemory>>,
    records: u64,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised, or displayed in the usual statistics layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub records: u64,
    pub main_memory: MemoryStats,
    pub caches: Vec<CacheReport>,
}

/// The result for an individual cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheReport {
    pub name: String,
    pub geometry: CacheGeometry,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub miss_rate: Option<f64>,
}

impl Display for SimulationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for cache in &self.caches {
            write!(f, "{}", NamedStats { name: &cache.name, stats: &cache.stats })?;
        }
        Ok(())
    }
}

impl Simulator {
    /// Builds the hierarchy described by a configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let memory = Rc::new(RefCell::new(MainMemory::new()));
        let l2 = config.l2.as_ref().map(|c| Cache::from_config(c, "L2$").into_shared());
        let below: SharedHandler = match &l2 {
            Some(l2) => {
                l2.borrow_mut().set_next_level(memory.clone());
                l2.clone()
            }
            None => memory.clone(),
        };

        let mut tracers: Vec<Box<dyn MemTracer>> = Vec::new();
        if let Some(icache) = &config.icache {
            let cache = Cache::from_config(icache, "I$").into_shared();
            cache.borrow_mut().set_next_level(below.clone());
            tracers.push(Box::new(ICacheTracer::new(cache)));
        }
        if let Some(dcache) = &config.dcache {
            let cache = Cache::from_config(dcache, "D$").into_shared();
            cache.borrow_mut().set_next_level(below.clone());
            tracers.push(Box::new(DCacheTracer::new(cache)));
        }

        let simulator = Self {
            tracers,
            l2,
            memory,
            records: 0,
            simulation_time: Duration::ZERO,
        };
        for cache in simulator.caches() {
            let cache = cache.borrow();
            debug!(
                "{}: {} ({} bytes, {})",
                cache.name(),
                cache.geometry(),
                cache.geometry().capacity(),
                if cache.store().is_fully_associative() {
                    "fully associative"
                } else {
                    "set associative"
                }
            );
        }
        Ok(simulator)
    }

    /// Turns miss logging on or off for every cache
    pub fn set_log(&mut self, log_misses: bool) {
        for cache in self.caches() {
            cache.borrow_mut().set_log(log_misses);
        }
    }

    /// Every cache in the hierarchy, first level caches first
    pub fn caches(&self) -> impl Iterator<Item = &Rc<RefCell<Cache>>> {
        self.tracers.iter().map(|t| t.cache()).chain(self.l2.iter())
    }

    /// Sends one access to every first level cache interested in it
    pub fn access(&mut self, addr: u64, bytes: usize, kind: AccessKind) {
        for tracer in self.tracers.iter_mut().filter(|t| t.interested_in(kind)) {
            tracer.trace(addr, bytes, kind);
        }
    }

    /// Cleans and/or invalidates a range in every first level cache, and through them the rest
    /// of the hierarchy
    pub fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        for tracer in self.tracers.iter_mut() {
            tracer.clean_invalidate(addr, bytes, clean, inval);
        }
    }

    /// Simulates the hierarchy on a byte array of trace records
    ///
    /// The byte array must hold whole records, see [`crate::trace`]. Reads from it are
    /// sequential, so memory mapped input can be advised as such
    ///
    /// # Arguments
    ///
    /// * `bytes`: The input byte array
    ///
    /// returns: Result<SimulationReport, String>
    pub fn simulate(&mut self, bytes: &[u8]) -> Result<SimulationReport, String> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(format!(
                "Trace length {} is not a multiple of the {RECORD_SIZE} byte record size",
                bytes.len()
            ));
        }
        let start = Instant::now();
        for chunk in bytes.chunks_exact(RECORD_SIZE) {
            let record: &[u8; RECORD_SIZE] =
                chunk.try_into().map_err(|_| "Truncated record".to_string())?;
            let op = parse_record(record).map_err(|e| format!("Record {}: {e}", self.records))?;
            match op {
                TraceOp::Access { addr, size, kind } => self.access(addr, size, kind),
                TraceOp::CleanInvalidate { addr, size, clean, inval } => {
                    self.clean_invalidate(addr, size, clean, inval)
                }
            }
            self.records += 1;
        }
        self.simulation_time += start.elapsed();
        Ok(self.report())
    }

    /// The results so far
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            records: self.records,
            main_memory: *self.memory.borrow().stats(),
            caches: self.caches().map(|cache| {
                let cache = cache.borrow();
                CacheReport {
                    name: cache.name().to_string(),
                    geometry: *cache.geometry(),
                    stats: *cache.stats(),
                    miss_rate: cache.stats().miss_rate(),
                }
            }).collect(),
        }
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of valid lines in each cache
    pub fn get_resident_line_counts(&self) -> Vec<(String, usize)> {
        self.caches()
            .map(|c| {
                let cache = c.borrow();
                (cache.name().to_string(), cache.resident_line_count())
            })
            .collect()
    }
}
