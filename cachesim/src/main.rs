use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::debug;
use tracecache::config::{CacheConfig, CacheGeometry, HierarchyConfig, ReplacementPolicyConfig};
use tracecache::io::read_trace;
use tracecache::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = "Trace driven cache simulator", version)]
struct Args {
    /// Trace file of 40 byte records
    trace: PathBuf,

    /// JSON hierarchy configuration. The --ic, --dc and --l2 options override its levels
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Instruction cache, as sets:ways:blocksize
    #[arg(long)]
    ic: Option<CacheGeometry>,

    /// Data cache, as sets:ways:blocksize
    #[arg(long)]
    dc: Option<CacheGeometry>,

    /// Second level cache behind both first level caches, as sets:ways:blocksize
    #[arg(long)]
    l2: Option<CacheGeometry>,

    /// Replacement policy for caches given on the command line
    #[arg(long, value_enum, default_value_t = ReplacementPolicyConfig::Random)]
    policy: ReplacementPolicyConfig,

    /// Log every miss
    #[arg(long)]
    log_misses: bool,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn load_config(args: &Args) -> Result<HierarchyConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| {
                format!("Couldn't open the config file at path {}", path.display())
            })?;
            HierarchyConfig::from_reader(BufReader::new(file)).map_err(anyhow::Error::msg)?
        }
        None => HierarchyConfig::default(),
    };
    let level = |geometry: CacheGeometry| Some(CacheConfig::new(geometry, args.policy));
    if let Some(geometry) = args.ic {
        config.icache = level(geometry);
    }
    if let Some(geometry) = args.dc {
        config.dcache = level(geometry);
    }
    if let Some(geometry) = args.l2 {
        config.l2 = level(geometry);
    }
    if config.icache.is_none() && config.dcache.is_none() {
        bail!("No caches configured, pass --config or at least one of --ic and --dc");
    }
    Ok(config)
}

fn main() -> Result<()> {
    let start = Instant::now();
    let args = Args::parse();
    let default_filter = if args.log_misses { "info" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    env_logger::Builder::from_env(env).init();

    let config = load_config(&args)?;
    debug!("Parsed input configuration: {config:?}");
    let mut simulator = Simulator::new(&config).context("Invalid cache configuration")?;
    simulator.set_log(args.log_misses);

    let trace_file = File::open(&args.trace)
        .with_context(|| format!("Couldn't open the trace file at path {}", args.trace.display()))?;
    let trace = read_trace(trace_file).map_err(anyhow::Error::msg)?;
    let result = simulator.simulate(&trace).map_err(anyhow::Error::msg)?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Couldn't serialise the output")?;
        println!("{json}");
    } else {
        print!("{result}");
    }
    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_secs_f64());
        println!(
            "Total execution time (includes initial parsing, configuration, and output): {}s",
            total_time.as_secs_f64()
        );
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!(
            "Running the debug binary, debug mode is enabled by default. \
             If benchmarking, re-compile with the --release argument"
        );
        let resident = simulator.get_resident_line_counts();
        let formatted = resident
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Resident cache lines by cache: ({formatted})");
        let total: usize = resident.iter().map(|(_, count)| count).sum();
        println!("Total resident cache lines: {total}");
    }
    Ok(())
}
