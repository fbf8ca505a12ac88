//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use lectern_core::dispatch::{Dispatcher, read_base_prompt};
use lectern_core::pipeline::{self, ArchiveReport, ProgressReporter, RunConfig, RunReport};
use lectern_core::rename::rename_txt_to_md;
use lectern_shared::{AppConfig, init_config, load_config, validate_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Lectern — turn e-book archives into ordered plain-text chapters.
#[derive(Parser)]
#[command(
    name = "lectern",
    version,
    about = "Extract and normalize e-book archives into clean, ordered chapter files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract and normalize an .epub file or a directory of them.
    Run {
        /// Path to an .epub file or a directory containing .epub files.
        path: PathBuf,

        /// Output root for working directories (defaults to config value).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Extraction only: populate the working directory and order file.
    Extract {
        /// Path to an .epub file or a directory containing .epub files.
        path: PathBuf,

        /// Output root for working directories (defaults to config value).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Normalization only, over an already-extracted working directory.
    Normalize {
        /// A working directory produced by `extract`.
        book_dir: PathBuf,
    },

    /// Rename every .txt file in a directory to .md, in place.
    Rename {
        /// Directory holding the .txt chapter files.
        dir: PathBuf,
    },

    /// Send ordered chapter files to the completion endpoint.
    Dispatch {
        /// A working directory with a files_order.txt.
        book_dir: PathBuf,

        /// Instruction preamble file (defaults to config value).
        #[arg(short, long)]
        prompt: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lectern=info",
        1 => "lectern=debug",
        _ => "lectern=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { path, out } => cmd_run(&path, out.as_deref()),
        Command::Extract { path, out } => cmd_extract(&path, out.as_deref()),
        Command::Normalize { book_dir } => cmd_normalize(&book_dir),
        Command::Rename { dir } => cmd_rename(&dir),
        Command::Dispatch { book_dir, prompt } => cmd_dispatch(&book_dir, prompt.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn run_config(config: &AppConfig, out: Option<&Path>) -> RunConfig {
    let output_root = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    RunConfig { output_root }
}

fn cmd_run(path: &Path, out: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    info!(path = %path.display(), "running extract + normalize");

    let reporter = CliProgress::new();
    let report = pipeline::run(path, &run_config(&config, out), &reporter)?;
    reporter.finish();

    print_run_summary(&report);
    Ok(())
}

fn cmd_extract(path: &Path, out: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    info!(path = %path.display(), "running extraction");

    let reporter = CliProgress::new();
    let report = pipeline::extract_only(path, &run_config(&config, out), &reporter)?;
    reporter.finish();

    for processed in &report.processed {
        println!(
            "  Extracted {} file(s) to {}",
            processed.kept,
            processed.book_dir.display()
        );
    }
    for (path, error) in &report.failed {
        println!("  Failed {}: {error}", path.display());
    }
    Ok(())
}

fn cmd_normalize(book_dir: &Path) -> Result<()> {
    info!(book_dir = %book_dir.display(), "running normalization");

    let report = pipeline::normalize_only(book_dir)?;
    println!(
        "  Kept {} chapter(s), skipped {} in {}",
        report.kept,
        report.skipped,
        report.book_dir.display()
    );
    Ok(())
}

fn cmd_rename(dir: &Path) -> Result<()> {
    let renamed = rename_txt_to_md(dir)?;
    println!("  Renamed {} file(s) to .md in {}", renamed.len(), dir.display());
    Ok(())
}

fn cmd_dispatch(book_dir: &Path, prompt: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let prompt_path = prompt
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.dispatch.base_prompt_file));
    let base_prompt = read_base_prompt(&prompt_path)?;

    info!(book_dir = %book_dir.display(), model = %config.dispatch.model, "dispatching chapters");

    let dispatcher = Dispatcher::from_config(&config.dispatch)?;
    let written = dispatcher.dispatch_book(book_dir, &base_prompt)?;

    println!("  Sent {} chapter(s); responses saved under {}", written.len(), book_dir.join("responses").display());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("  Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_run_summary(report: &RunReport) {
    println!();
    for processed in &report.processed {
        println!(
            "  {} → {} ({} kept, {} skipped)",
            processed.archive.display(),
            processed.book_dir.display(),
            processed.kept,
            processed.skipped
        );
    }
    for (path, error) in &report.failed {
        println!("  {} failed: {error}", path.display());
    }
    println!(
        "  {} archive(s) processed, {} failed",
        report.processed.len(),
        report.failed.len()
    );
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn archive_started(&self, path: &Path, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Processing [{current}/{total}] {}",
            path.display()
        ));
    }

    fn archive_finished(&self, report: &ArchiveReport) {
        self.spinner.set_message(format!(
            "Finished {} ({} kept)",
            report.book_dir.display(),
            report.kept
        ));
    }

    fn archive_failed(&self, path: &Path, error: &str) {
        self.spinner.println(format!("  {} failed: {error}", path.display()));
    }
}
