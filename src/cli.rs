use crate::config::AnalysisConfig;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// Controller Docs - Generate an HTML API reference from Spring-style controller sources
#[derive(Parser, Debug)]
#[command(name = "controller-docs")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Root of the multi-module project
    #[arg(value_name = "PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// Output HTML file (default: build/controller-docs.html under the project root)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Skip Kotlin-style (name: Type) sources
    #[arg(long = "no-name-first")]
    pub no_name_first: bool,

    /// Skip Java-style (Type name) sources
    #[arg(long = "no-type-first")]
    pub no_type_first: bool,

    /// Additional directory name to exclude from module discovery (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "DIR")]
    pub exclude_dirs: Vec<String>,

    /// Controller marker token, replacing the configured ones (repeatable)
    #[arg(short = 'm', long = "marker", value_name = "MARKER")]
    pub markers: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_root.exists() {
        anyhow::bail!("Project root does not exist: {}", args.project_root.display());
    }

    if !args.project_root.is_dir() {
        anyhow::bail!("Project root is not a directory: {}", args.project_root.display());
    }

    if let Some(ref config) = args.config_path {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    info!("Project root: {}", args.project_root.display());
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    }

    Ok(args)
}

/// Builds the effective configuration: defaults, then the YAML file, then flags.
pub fn build_config(args: &CliArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config_path {
        Some(path) => AnalysisConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(output) = &args.output_path {
        config.output_file = output.clone();
    }
    if args.no_name_first {
        config.include_name_first = false;
    }
    if args.no_type_first {
        config.include_type_first = false;
    }
    for dir in &args.exclude_dirs {
        if !config.exclude_dirs.contains(dir) {
            config.exclude_dirs.push(dir.clone());
        }
    }
    if !args.markers.is_empty() {
        config.controller_markers = args.markers.clone();
    }

    config.validate().context("Invalid configuration")?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::analyzer::analyze;
    use crate::renderer::render_html;
    use crate::serializer::write_to_file;

    let config = build_config(&args)?;

    info!("Analyzing controllers...");
    let report = analyze(&config, &args.project_root)
        .with_context(|| format!("Failed to analyze {}", args.project_root.display()))?;

    info!("Rendering HTML report...");
    let html = render_html(&report).context("Failed to render report")?;

    // relative output paths are resolved against the project root
    let output_path = if config.output_file.is_absolute() || args.output_path.is_some() {
        config.output_file.clone()
    } else {
        args.project_root.join(&config.output_file)
    };

    info!("Writing output to: {}", output_path.display());
    write_to_file(&html, &output_path)
        .with_context(|| format!("Failed to write to file: {}", output_path.display()))?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Modules: {}", report.summary.modules);
    info!("  - Controllers: {}", report.summary.controllers);
    info!("  - Endpoints: {}", report.summary.endpoints);
    info!("  - Error responses: {}", report.summary.errors);

    Ok(())
}
