//! # TraceCache
//!
//! TraceCache models set associative and fully associative caches for trace driven analysis.
//!
//! Caches count hits, misses and writebacks, keep valid and dirty state for every line, and
//! forward misses and writebacks to whatever sits behind them: another cache, or main memory.
//! There is no notion of time.
//!
//! A [`simulator::Simulator`] wires split first level caches, an optional shared second level
//! cache and main memory together and replays trace files through them

/// Splitting addresses into set index and tag
pub mod address;

/// Contains the cache itself
pub mod cache;

/// Connecting caches to the level behind them, and the main memory model ending each chain
pub mod chain;

/// Contains cache geometries and the JSON hierarchy format, and their validation
pub mod config;

/// Access to trace files
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace through a configured hierarchy
pub mod simulator;

/// Counters kept by each cache, and their printed form
pub mod stats;

/// The tag stores behind a cache
pub mod store;

/// The trace record format
pub mod trace;

/// Adapters choosing which accesses each first level cache sees
pub mod tracer;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;
