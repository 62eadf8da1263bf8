// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Command line runner for scenario files
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]
use std::path::PathBuf;

use anyhow::Result;
use clap::{crate_version, Parser, Subcommand};
use console::style;
use massa_scenario_exports::DummyVmBuilder;
use tracing_subscriber::filter::LevelFilter;

use crate::settings::{build_scenario_settings, Settings, ENV_PREFIX};

mod cmds;
mod settings;

#[cfg(test)]
pub mod tests;

#[derive(Parser)]
#[command(name = "massa-scenario", version, about = "Runs VM test scenarios")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs a scenario file, or every scenario file under a directory
    Run {
        /// scenario file or directory
        path: PathBuf,
        /// Print gas traces for every scenario
        #[arg(long)]
        trace_gas: bool,
    },
    /// Prints the version
    Version,
}

fn init_logging(level: usize) {
    use tracing_subscriber::prelude::*;
    let filter = match level {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let tracing_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    let _ = tracing_subscriber::registry().with(tracing_layer).try_init();
}

fn run(args: Args, settings: &Settings) -> Result<()> {
    match args.command {
        Command::Run { path, trace_gas } => {
            cmds::run_scenarios_at_path(
                Box::new(DummyVmBuilder),
                &path,
                &settings.scenario,
                trace_gas,
            )?;
            println!("SUCCESS");
        }
        Command::Version => println!("massa-scenario {}", crate_version!()),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let result = build_scenario_settings(ENV_PREFIX)
        .map_err(anyhow::Error::from)
        .and_then(|settings| {
            init_logging(settings.logging.level);
            run(args, &settings)
        });
    if let Err(err) = result {
        println!("{}", style(format!("ERROR: {}", err)).red());
        std::process::exit(1);
    }
}
