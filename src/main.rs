use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};

use base_validator::{
    BaseScanner,
    BatchValidator,
    ProcessingMode,
    Progress,
    RunContext,
    ValidatorConfig,
};
use parser_template::analyze_template;

#[derive(Parser)]
#[command(name = "base_validator", version, about = "Validate logistics CSV bases against a spreadsheet template")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the required fields declared by a template
    Template {
        path: PathBuf,
    },
    /// List the bases found in a data directory
    Discover {
        dir: PathBuf,
        #[arg(long, default_value_t = 5)]
        min_files: usize,
    },
    /// Validate bases and write normalized copies and reports
    Validate(ValidateArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// JSON configuration file, flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    template: Option<PathBuf>,
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<ProcessingMode>,
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long)]
    min_files: Option<usize>,
    /// Only validate this base, repeatable
    #[arg(long = "base")]
    bases: Vec<String>,
    /// Sniff the separator instead of assuming a comma
    #[arg(long)]
    detect_separator: bool,
    #[arg(long)]
    no_reports: bool,
}

impl ValidateArgs {
    fn into_config(self) -> Result<ValidatorConfig> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::load(path)?,
            None => ValidatorConfig::default(),
        };

        if let Some(template) = self.template {
            config.template_path = template;
        }
        if let Some(data) = self.data {
            config.data_dir = data;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(min_files) = self.min_files {
            config.min_base_files = min_files;
        }
        if !self.bases.is_empty() {
            config.bases = self.bases;
        }
        if self.detect_separator {
            config.detect_separator = true;
        }
        if self.no_reports {
            config.write_reports = false;
        }

        Ok(config)
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if cli.quiet {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.format_timestamp_millis().init();
}

fn print_template(path: PathBuf) -> Result<()> {
    let analysis = analyze_template(&path)?;

    for (file, fields) in analysis.required_fields.iter() {
        if fields.is_empty() {
            println!("{}: (no required fields)", file);
        } else {
            println!("{}: {}", file, fields.join(", "));
        }
    }
    for warning in &analysis.warnings {
        warn!("{}", warning);
    }
    Ok(())
}

fn print_bases(dir: PathBuf, min_files: usize) -> Result<()> {
    let bases = BaseScanner::new(&dir, min_files).discover()?;
    if bases.is_empty() {
        warn!("No base with at least {} CSV files in {}", min_files, dir.display());
    }
    for base in bases {
        println!("{}", base);
    }
    Ok(())
}

fn validate(args: ValidateArgs) -> Result<()> {
    let config = args.into_config()?;
    let ctx = RunContext::from_config(config).context("Cannot start validation")?;

    let discovered = BaseScanner::new(ctx.data_dir(), ctx.config().min_base_files).discover()?;
    let validator = BatchValidator::new(&ctx);
    let bases = validator.select_bases(&discovered);

    if bases.is_empty() {
        warn!("No bases to validate in {}", ctx.data_dir().display());
        return Ok(());
    }

    let progress = ProgressBar::new(bases.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.set_message("Validating bases");

    let bar = progress.clone();
    let outcome = validator
        .with_progress(Arc::new(move |p: &Progress| {
            bar.set_position(p.completed as u64);
            bar.set_message(p.base.clone());
        }))
        .run(&bases)?;

    progress.finish_with_message(format!("Validated {} bases", outcome.results.len()));

    for result in &outcome.results {
        info!(
            "{}: {} ({}/{} valid, {} problems)",
            result.base,
            result.status(),
            result.files_valid,
            result.total_files,
            result.problems.len()
        );
    }
    info!("{}", outcome.summary);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Command::Template { path } => print_template(path),
        Command::Discover { dir, min_files } => print_bases(dir, min_files),
        Command::Validate(args) => validate(args),
    }
}
