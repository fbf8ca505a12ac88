//! Lectern CLI — EPUB to ordered plain-text chapters.
//!
//! Extracts content documents from e-book archives, normalizes them into
//! clean chapter files, and optionally dispatches them to a
//! text-generation endpoint.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
