use std::error::Error;
use std::fs;
use std::path::PathBuf;
use lazy_static::lazy_static;
use regex::Regex;
use crate::config::CacheConfig;

pub const TRACE_FILES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/traces");
pub const EXPECTED_OUTPUTS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/outputs");

lazy_static! {
    // e.g. output-mixed-s0_E2_b2.json
    static ref OUTPUT_PATTERN: Regex =
        Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-s(?P<s>[0-9]+)_E(?P<e>[0-9]+)_b(?P<b>[0-9]+)\.json$").unwrap();
}

pub struct TestCase {
    pub config: CacheConfig,
    pub trace: PathBuf,
    pub output: PathBuf,
}

/// Finds every expected output file, and the trace and configuration encoded in its name
pub fn get_cases() -> Result<Vec<TestCase>, Box<dyn Error>> {
    let mut out = Vec::new();
    let mut file_names = fs::read_dir(EXPECTED_OUTPUTS_PATH)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|name| name.into_string().ok())
        .filter(|name| OUTPUT_PATTERN.is_match(name))
        .collect::<Vec<_>>();
    file_names.sort();
    for file_name in file_names {
        // Get components of name
        let tokens = OUTPUT_PATTERN.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace_name = &tokens["trace"];
        let config = CacheConfig::new(tokens["s"].parse()?, tokens["b"].parse()?, tokens["e"].parse()?)?;
        out.push(TestCase {
            config,
            trace: PathBuf::from(format!("{TRACE_FILES_PATH}/{trace_name}.trace")),
            output: PathBuf::from(format!("{EXPECTED_OUTPUTS_PATH}/{file_name}")),
        })
    }
    Ok(out)
}
