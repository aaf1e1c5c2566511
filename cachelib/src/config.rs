use std::fmt::{Display, Formatter};
use std::io::Read;
use std::str::FromStr;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::address::AddressDecoder;

/// Single set caches with more ways than this use the fully associative store
pub const FULLY_ASSOCIATIVE_WAY_THRESHOLD: usize = 4;

/// Smallest line size accepted, in bytes
pub const MIN_LINE_SIZE: usize = 8;

const USAGE: &str = "Cache configurations must be of the form sets:ways:blocksize, where sets, \
ways, and blocksize are positive integers, with sets and blocksize both powers of two and \
blocksize at least 8";

lazy_static! {
    static ref GEOMETRY_PATTERN: Regex =
        Regex::new(r"^\s*(?P<sets>[0-9]+):(?P<ways>[0-9]+):(?P<line_size>[0-9]+)\s*$").unwrap();
}

/// Reasons a cache configuration is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The text wasn't of the form `sets:ways:blocksize`
    Malformed(String),
    SetsNotPowerOfTwo(usize),
    ZeroWays,
    LineSizeNotPowerOfTwo(usize),
    LineSizeTooSmall(usize),
    /// A second level cache was configured with no first level cache to feed it
    DetachedLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Malformed(input) => write!(f, "couldn't parse '{input}'. {USAGE}"),
            ConfigError::SetsNotPowerOfTwo(sets) => {
                write!(f, "{sets} sets is not a power of two. {USAGE}")
            }
            ConfigError::ZeroWays => write!(f, "a cache needs at least one way. {USAGE}"),
            ConfigError::LineSizeNotPowerOfTwo(size) => {
                write!(f, "a block size of {size} is not a power of two. {USAGE}")
            }
            ConfigError::LineSizeTooSmall(size) => {
                write!(f, "a block size of {size} is smaller than {MIN_LINE_SIZE}. {USAGE}")
            }
            ConfigError::DetachedLevel(name) => {
                write!(f, "{name} has no icache or dcache in front of it")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// The shape of a cache: number of sets, ways per set, and bytes per line
///
/// Can only be constructed through validation, so every geometry in circulation is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheGeometry {
    sets: usize,
    ways: usize,
    line_size: usize,
}

impl CacheGeometry {
    pub fn new(sets: usize, ways: usize, line_size: usize) -> Result<Self, ConfigError> {
        if !sets.is_power_of_two() {
            // is_power_of_two is false for zero as well
            return Err(ConfigError::SetsNotPowerOfTwo(sets));
        }
        if ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        if line_size < MIN_LINE_SIZE {
            return Err(ConfigError::LineSizeTooSmall(line_size));
        }
        if !line_size.is_power_of_two() {
            return Err(ConfigError::LineSizeNotPowerOfTwo(line_size));
        }
        Ok(Self { sets, ways, line_size })
    }

    pub fn sets(&self) -> usize {
        self.sets
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn line_size(&self) -> usize {
        self.line_size
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.sets * self.ways * self.line_size
    }

    pub fn decoder(&self) -> AddressDecoder {
        AddressDecoder::new(self.sets, self.line_size)
    }

    /// Whether this geometry is served by the map backed store rather than a tag array
    pub fn is_fully_associative(&self) -> bool {
        self.sets == 1 && self.ways > FULLY_ASSOCIATIVE_WAY_THRESHOLD
    }
}

impl FromStr for CacheGeometry {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = GEOMETRY_PATTERN
            .captures(s)
            .ok_or_else(|| ConfigError::Malformed(s.to_string()))?;
        let field = |name: &str| {
            captures[name]
                .parse::<usize>()
                .map_err(|_| ConfigError::Malformed(s.to_string()))
        };
        Self::new(field("sets")?, field("ways")?, field("line_size")?)
    }
}

impl TryFrom<String> for CacheGeometry {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CacheGeometry> for String {
    fn from(value: CacheGeometry) -> Self {
        value.to_string()
    }
}

impl Display for CacheGeometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.sets, self.ways, self.line_size)
    }
}

/// The replacement policy - random, least recently served, or round robin. Defaults to random.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ReplacementPolicyConfig {
    #[default]
    #[serde(alias = "random")]
    #[value(name = "random")]
    Random,
    #[serde(alias = "lru", alias = "lrs")]
    #[value(name = "lru", alias = "lrs")]
    LeastRecentlyServed,
    #[serde(alias = "rr", alias = "fifo")]
    #[value(name = "rr", alias = "fifo")]
    RoundRobin,
}

fn default_seed() -> u32 {
    1
}

/// A configuration for a single cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Display name, defaults to the name of the level it is configured at
    #[serde(default)]
    pub name: Option<String>,
    pub geometry: CacheGeometry,
    #[serde(default)]
    pub replacement_policy: ReplacementPolicyConfig,
    /// Seed for the random replacement policy
    #[serde(default = "default_seed")]
    pub seed: u32,
}

impl CacheConfig {
    pub fn new(geometry: CacheGeometry, replacement_policy: ReplacementPolicyConfig) -> Self {
        Self {
            name: None,
            geometry,
            replacement_policy,
            seed: default_seed(),
        }
    }
}

/// A cache hierarchy: split first level instruction and data caches, optionally backed by a
/// shared second level cache, all in front of main memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub icache: Option<CacheConfig>,
    #[serde(default)]
    pub dcache: Option<CacheConfig>,
    #[serde(default)]
    pub l2: Option<CacheConfig>,
}

impl HierarchyConfig {
    /// Reads a hierarchy from JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, String> {
        serde_json::from_reader(reader).map_err(|e| format!("Couldn't parse the config file: {e}"))
    }

    /// Checks that the levels connect up
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.icache, &self.dcache, &self.l2) {
            (None, None, Some(l2)) => Err(ConfigError::DetachedLevel(
                l2.name.clone().unwrap_or_else(|| "L2$".to_string()),
            )),
            _ => Ok(()),
        }
    }
}
