use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::Level;
use simple_logger::init_with_level;
use std::time::Duration;

use blastsieve::api::{export_files, ExportControl};
use blastsieve::blastinput::FilterArgs;

#[derive(Parser)]
#[command(name = "blastsieve")]
#[command(version = "0.1.0")]
#[command(about = "Filter BLAST XML results into a table and an alignment report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank, filter and export the hits of a BLAST XML file
    Filter(FilterArgs),
}

fn run_filter(args: FilterArgs) -> Result<()> {
    let request = args
        .to_request()
        .context("Invalid filter arguments")?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let control = ExportControl::new();
    let result = export_files(&request, &control, |summary| {
        bar.set_message(format!(
            "{} records, {} HSPs written",
            summary.records_read, summary.rows_written
        ));
    });
    bar.finish_and_clear();

    result.with_context(|| format!("Failed to filter {}", request.input.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter(args) => {
            let level = if args.verbose { Level::Debug } else { Level::Info };
            init_with_level(level).context("Failed to initialize logger")?;
            run_filter(args)?;
        }
    }
    Ok(())
}
