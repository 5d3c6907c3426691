mod aggregator;
mod cleaner;
mod config;
mod error;
mod loader;
mod merger;
mod records;
mod report;
mod visualizer;


use std::time::Instant;

use aggregator::Summary;
use config::Config;
use env_logger::{Builder, Env};
use error::Result;
use log::{info, LevelFilter};
use polars::frame::DataFrame;
use sysinfo::{ProcessExt, System, SystemExt};

fn monitor_memory() -> u64 {
    let mut system = System::new();
    match sysinfo::get_current_pid() {
        Ok(pid) => {
            system.refresh_process(pid);
            system.process(pid).map(|process| process.memory()).unwrap_or(0)
        }
        Err(_) => 0,
    }
}

/// Loads, merges and cleans the three sources, then computes the statistics.
pub fn analyze(config: &Config) -> Result<(DataFrame, Summary)> {
    let sources = loader::load_sources(config)?;
    let merged = merger::merge(sources)?;
    let cleaned = cleaner::clean(merged)?;
    let summary = aggregator::summarize(&cleaned)?;
    Ok((cleaned, summary))
}

fn main() -> Result<()> {
    let env = Env::new().filter("HOSPITAL_LOG");
    Builder::new()
        .filter(Some("hospital_report"), LevelFilter::Info)
        .parse_env(env)
        .init();

    let start_time = Instant::now();
    let start_memory = monitor_memory();

    let config = Config::default();
    let (cleaned, summary) = analyze(&config)?;
    let charts = visualizer::render_all(&cleaned, &config)?;

    for line in report::answers(&summary) {
        println!("{}", line);
    }
    report::write_report(&summary, charts, &config)?;

    let end_memory = monitor_memory();
    let duration = start_time.elapsed();

    info!("Time elapsed: {:?}", duration);
    info!("Memory used: {} bytes", end_memory.saturating_sub(start_memory));

    Ok(())
}
