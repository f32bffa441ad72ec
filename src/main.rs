//! Controller Docs - command-line tool for documenting Spring-style controllers.
//!
//! Scans every module of a multi-module project for controller sources and writes one
//! self-contained HTML page describing their endpoints, request and response models and
//! the errors each endpoint can raise.
//!
//! # Usage
//!
//! ```bash
//! controller-docs [OPTIONS] [PROJECT_ROOT]
//! ```
//!
//! # Examples
//!
//! Document the project in the current directory:
//! ```bash
//! controller-docs
//! ```
//!
//! Java sources only, custom output file:
//! ```bash
//! controller-docs ./platform --no-name-first -o docs/api.html
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! controller-docs ./platform -v
//! ```

use anyhow::Result;
use clap::Parser;
use controller_docs::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can set the log level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Controller Docs starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("API documentation generated successfully");

    Ok(())
}
