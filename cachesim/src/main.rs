use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use dualcache::config::{load_config, PartialCacheConfig};
use dualcache::error::ConfigError;
use dualcache::io::open_trace;
use dualcache::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Dual-tier (recency and frequency) set-associative cache simulator"))]
struct Args {
    /// Number of set index bits (S = 2^s sets)
    #[arg(short = 's')]
    set_index_bits: Option<u32>,

    /// Number of lines per set in each tier
    #[arg(short = 'E')]
    lines_per_set: Option<u32>,

    /// Number of block offset bits (B = 2^b bytes per block)
    #[arg(short = 'b')]
    block_offset_bits: Option<u32>,

    /// Trace file to replay
    #[arg(short = 't')]
    trace: Option<PathBuf>,

    /// JSON file with s, E and b. Flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print every trace record with the outcome of its accesses
    #[arg(short, long)]
    verbose: bool,

    /// Print the result as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    let flags = PartialCacheConfig {
        set_index_bits: args.set_index_bits,
        block_offset_bits: args.block_offset_bits,
        lines_per_set: args.lines_per_set,
    };
    let file_config = match &args.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => PartialCacheConfig::default(),
    };
    let config = file_config.merge(flags).build().map_err(|e| e.to_string())?;
    let trace_path = args.trace.as_ref().ok_or(ConfigError::MissingParameter("-t")).map_err(|e| e.to_string())?;
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?} ({} sets, {} byte blocks)", config.num_sets(), config.block_size());
    }
    let mut simulator = Simulator::new(config);
    let trace_reader = open_trace(trace_path).map_err(|e| e.to_string())?;
    let result = if args.verbose {
        simulator.simulate_with(trace_reader, |record, outcomes| {
            let outcomes = outcomes.iter().map(|o| o.to_string()).reduce(|a, b| format!("{a} {b}")).unwrap_or_default();
            println!("{record} {outcomes}");
        })
    } else {
        simulator.simulate(trace_reader)
    }
    .map_err(|e| e.to_string())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("{result}");
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        let formatted = simulator
            .get_resident_line_counts()
            .iter()
            .map(|(tier, count)| format!("{tier}: {count}"))
            .reduce(|a, b| format!("{a}, {b}"))
            .unwrap_or_default();
        println!("Resident cache lines by tier: ({formatted})");
        println!("Lines per tier: {}", config.lines_per_tier());
        println!("Tracked recency tier population: {}", simulator.population());
        println!("Accesses simulated: {}", simulator.clock());
    }
    Ok(())
}
