use crate::stats::{CacheStats, NamedStats};

#[test]
fn miss_rate_needs_accesses() {
    assert_eq!(CacheStats::default().miss_rate(), None);
    let stats = CacheStats {
        read_accesses: 6,
        write_accesses: 2,
        read_misses: 1,
        write_misses: 1,
        ..Default::default()
    };
    assert_eq!(stats.miss_rate(), Some(25.0));
    assert_eq!(stats.hits(), 6);
}

#[test]
fn counters_split_by_class() {
    let mut stats = CacheStats::default();
    stats.record_access(4, false);
    stats.record_access(8, true);
    stats.record_access(2, true);
    stats.record_miss(true);
    stats.record_writeback();
    assert_eq!((stats.read_accesses, stats.bytes_read), (1, 4));
    assert_eq!((stats.write_accesses, stats.bytes_written), (2, 10));
    assert_eq!((stats.read_misses, stats.write_misses, stats.writebacks), (0, 1, 1));
}

#[test]
fn prints_in_simulator_layout() {
    let stats = CacheStats {
        bytes_read: 4096,
        bytes_written: 64,
        read_accesses: 30,
        write_accesses: 2,
        read_misses: 1,
        write_misses: 0,
        writebacks: 0,
    };
    let printed = NamedStats { name: "D$", stats: &stats }.to_string();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "D$ Bytes Read:            4096");
    assert_eq!(lines[4], "D$ Read Misses:           1");
    assert_eq!(lines[7], "D$ Miss Rate:             3.125%");
}

#[test]
fn unused_cache_prints_nothing() {
    let stats = CacheStats::default();
    assert_eq!(NamedStats { name: "I$", stats: &stats }.to_string(), "");
}
