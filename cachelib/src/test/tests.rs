use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use crate::io::open_trace;
use crate::simulator::{SimulationResult, Simulator};
use crate::util::get_cases;

#[test]
fn run_all_fixtures() -> Result<(), Box<dyn Error>> {
    let cases = get_cases()?;
    assert!(!cases.is_empty(), "No fixtures found");
    for test in cases {
        println!("Running test for {}", test.output.display());
        // Read expected output
        let expected_output_file = File::open(&test.output)?;
        let expected_output: SimulationResult = serde_json::from_reader(BufReader::new(expected_output_file))?;
        // Simulate!
        let mut simulator = Simulator::new(test.config);
        let result = simulator.simulate(open_trace(&test.trace)?)?;
        assert_eq!(*result, expected_output, "Mismatch for {}", test.output.display());
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.output.display(), time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}

#[test]
fn missing_trace_reports_the_path() {
    let error = match open_trace("does/not/exist.trace".as_ref()) {
        Ok(_) => panic!("Opened a trace which doesn't exist"),
        Err(e) => e,
    };
    assert!(error.to_string().starts_with("does/not/exist.trace: "));
}

#[test]
fn simulate_reports_each_record() -> Result<(), Box<dyn Error>> {
    let config = crate::config::CacheConfig::new(0, 0, 1)?;
    let mut simulator = Simulator::new(config);
    let mut lines = Vec::new();
    simulator.simulate_with(&b" L 0,1\n M 1,1\nI  0,4\n"[..], |record, outcomes| {
        let outcomes = outcomes.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(" ");
        lines.push(format!("{record} {outcomes}"));
    })?;
    assert_eq!(lines, vec!["L 0,1 miss", "M 1,1 miss promote hit"]);
    assert_eq!(simulator.clock(), 3);
    Ok(())
}

#[test]
fn simulate_accumulates_across_calls() -> Result<(), Box<dyn Error>> {
    let config = crate::config::CacheConfig::new(1, 1, 1)?;
    let mut simulator = Simulator::new(config);
    simulator.simulate(&b" L 0,1\n"[..])?;
    let result = *simulator.simulate(&b" L 0,1\n S 0,1\n"[..])?;
    assert_eq!(result, SimulationResult { hits: 2, misses: 1, evictions: 0 });
    assert_eq!(result.to_string(), "hits:2 misses:1 evictions:0");
    Ok(())
}
