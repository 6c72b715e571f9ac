use anyhow::Result;
use clap::Parser;
use realtime_cost::config::Config;
use realtime_cost::logging::init_logging;
use realtime_cost::CostAnalyzer;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "realtime-cost")]
#[command(about = "Count tokens and calculate costs from a realtime usage log")]
#[command(version)]
struct Cli {
    /// Path to the JSON log file
    file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };
    let guard = init_logging(&config.logging, &config.paths.log_directory);

    let analyzer = CostAnalyzer::new(config);
    match analyzer.run(&cli.file) {
        Ok(report) => {
            print!("{}", analyzer.render(&report)?);
            Ok(())
        }
        Err(e) => {
            drop(guard);
            handle_error(e.into())
        }
    }
}

fn handle_error(e: anyhow::Error) -> Result<()> {
    println!("Error: {}", e);
    process::exit(1);
}
