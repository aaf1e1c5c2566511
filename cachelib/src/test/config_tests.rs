use crate::config::{CacheGeometry, ConfigError, HierarchyConfig, ReplacementPolicyConfig};

#[test]
fn parses_valid_geometries() {
    let geometry: CacheGeometry = "1024:4:64".parse().unwrap();
    assert_eq!((geometry.sets(), geometry.ways(), geometry.line_size()), (1024, 4, 64));
    assert_eq!(geometry.capacity(), 256 * 1024);
    assert_eq!(geometry.to_string(), "1024:4:64");
    assert_eq!(" 1:1:8\n".parse::<CacheGeometry>(), CacheGeometry::new(1, 1, 8));
    // Ways don't need to be a power of two
    assert!("64:3:32".parse::<CacheGeometry>().is_ok());
}

#[test]
fn rejects_invalid_geometries() {
    let cases = [
        ("3:4:64", ConfigError::SetsNotPowerOfTwo(3)),
        ("0:4:64", ConfigError::SetsNotPowerOfTwo(0)),
        ("4:0:64", ConfigError::ZeroWays),
        ("4:4:4", ConfigError::LineSizeTooSmall(4)),
        ("4:4:0", ConfigError::LineSizeTooSmall(0)),
        ("4:4:24", ConfigError::LineSizeNotPowerOfTwo(24)),
        ("4:4", ConfigError::Malformed("4:4".to_string())),
        ("a:b:c", ConfigError::Malformed("a:b:c".to_string())),
        ("-1:4:64", ConfigError::Malformed("-1:4:64".to_string())),
        (
            "99999999999999999999999:1:8",
            ConfigError::Malformed("99999999999999999999999:1:8".to_string()),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(input.parse::<CacheGeometry>(), Err(expected), "{input}");
    }
}

#[test]
fn error_messages_explain_the_format() {
    let message = "4:4:12".parse::<CacheGeometry>().unwrap_err().to_string();
    assert!(message.contains("12"));
    assert!(message.contains("sets:ways:blocksize"));
}

#[test]
fn large_single_set_caches_are_fully_associative() {
    assert!(CacheGeometry::new(1, 5, 64).unwrap().is_fully_associative());
    assert!(CacheGeometry::new(1, 512, 64).unwrap().is_fully_associative());
    assert!(!CacheGeometry::new(1, 4, 64).unwrap().is_fully_associative());
    assert!(!CacheGeometry::new(2, 8, 64).unwrap().is_fully_associative());
}

#[test]
fn reads_hierarchy_from_json() {
    let json = r#"{
        "icache": { "geometry": "64:4:64", "replacement_policy": "lru" },
        "dcache": { "name": "L1D", "geometry": "64:8:64", "replacement_policy": "fifo", "seed": 9 },
        "l2": { "geometry": "1024:8:64" }
    }"#;
    let config = HierarchyConfig::from_reader(json.as_bytes()).unwrap();
    let icache = config.icache.as_ref().unwrap();
    assert_eq!(icache.geometry, CacheGeometry::new(64, 4, 64).unwrap());
    assert_eq!(icache.replacement_policy, ReplacementPolicyConfig::LeastRecentlyServed);
    assert_eq!(icache.name, None);
    assert_eq!(icache.seed, 1);
    let dcache = config.dcache.as_ref().unwrap();
    assert_eq!(dcache.name.as_deref(), Some("L1D"));
    assert_eq!(dcache.replacement_policy, ReplacementPolicyConfig::RoundRobin);
    assert_eq!(dcache.seed, 9);
    assert_eq!(config.l2.as_ref().unwrap().replacement_policy, ReplacementPolicyConfig::Random);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn json_with_bad_geometry_is_refused() {
    let json = r#"{ "dcache": { "geometry": "6:4:64" } }"#;
    let error = HierarchyConfig::from_reader(json.as_bytes()).unwrap_err();
    assert!(error.contains("6 sets is not a power of two"), "{error}");
}

#[test]
fn second_level_needs_a_first_level() {
    let json = r#"{ "l2": { "geometry": "1024:8:64" } }"#;
    let config = HierarchyConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::DetachedLevel("L2$".to_string())));
    assert_eq!(HierarchyConfig::default().validate(), Ok(()));
}
