//! Command-line interface for the harvester.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::HarvestConfig;
use crate::error::{HarvesterError, Result};
use crate::export::export_rows;
use crate::harvester::{harvest, HarvestState, ThreadPacer};
use crate::source::OpenLibraryClient;
use crate::types::OutputRow;

/// OpenLibrary Harvester - Collect rated books from OpenLibrary into a CSV dataset.
#[derive(Parser)]
#[command(name = "openlibrary-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest works with enough ratings and write them to CSV.
    Harvest(HarvestArgs),
}

/// Options of the `harvest` command. Unset options keep the library defaults.
#[derive(Debug, Default, Args)]
pub struct HarvestArgs {
    /// Number of books to collect (default: 1000)
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Minimum number of ratings a work needs (default: 5)
    #[arg(long)]
    pub min_ratings: Option<u64>,

    /// Consecutive low-rated works before moving to the next query (default: 50)
    #[arg(long)]
    pub max_skips: Option<usize>,

    /// Pause between requests in milliseconds (default: 200)
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Maximum random extra pause after each accepted book in milliseconds (default: 100)
    #[arg(long)]
    pub jitter_ms: Option<u64>,

    /// Maximum search pages per query (default: 20)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Number of editions inspected per work (default: 200)
    #[arg(long)]
    pub editions_limit: Option<u32>,

    /// Search query to scan; repeat to scan several (default: built-in genre list)
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// Do not use editions to fill missing pages, series, publisher and place
    #[arg(long)]
    pub no_editions: bool,

    /// Do not write the CSV file
    #[arg(long)]
    pub no_output: bool,

    /// Look up each primary author and add an author_work_count column
    #[arg(long)]
    pub author_stats: bool,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Catalog base URL (default: https://openlibrary.org)
    #[arg(long)]
    pub base_url: Option<String>,
}

impl HarvestArgs {
    /// Apply the given options on top of the default configuration.
    pub fn to_config(&self) -> HarvestConfig {
        let mut config = HarvestConfig::default()
            .with_editions_fallback(!self.no_editions)
            .with_output_csv(!self.no_output)
            .with_author_stats(self.author_stats);

        if let Some(target) = self.target {
            config = config.with_target_books(target);
        }
        if let Some(min_ratings) = self.min_ratings {
            config = config.with_min_ratings(min_ratings);
        }
        if let Some(max_skips) = self.max_skips {
            config = config.with_max_skips_without_rating(max_skips);
        }
        if let Some(pause_ms) = self.pause_ms {
            config = config.with_pause(Duration::from_millis(pause_ms));
        }
        if let Some(jitter_ms) = self.jitter_ms {
            config = config.with_jitter(Duration::from_millis(jitter_ms));
        }
        if let Some(max_pages) = self.max_pages {
            config = config.with_max_pages_per_query(max_pages);
        }
        if let Some(limit) = self.editions_limit {
            config = config.with_editions_limit(limit);
        }
        if !self.queries.is_empty() {
            config = config.with_queries(self.queries.iter().cloned());
        }
        if let Some(output) = &self.output {
            config = config.with_output_dir(output);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        config
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest(args) => harvest_command(&args),
    }
}

/// Execute the harvest command.
fn harvest_command(args: &HarvestArgs) -> Result<()> {
    let config = args.to_config();

    // Validate inputs before making HTTP requests
    config.validate()?;
    if config.output_csv && config.output_dir.exists() && !config.output_dir.is_dir() {
        return Err(HarvesterError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "Output path is not a directory: {}",
                config.output_dir.display()
            ),
        )));
    }

    let source = OpenLibraryClient::new(&config.base_url)?;

    println!(
        "{} {} books with at least {} ratings from {}",
        style("Harvesting").bold(),
        style(config.target_books).cyan(),
        style(config.min_ratings).cyan(),
        style(source.base_url()).green()
    );
    println!();

    let pb = ProgressBar::new(config.target_books as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut pacer = ThreadPacer;
    let state = match harvest(&source, &mut pacer, &config, HarvestState::new(), |row, count| {
        pb.set_position(count as u64);
        pb.set_message(row.title.clone());
    }) {
        Ok(state) => state,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    let stats = &state.stats;
    println!("  Books: {}", style(state.len()).green());
    println!("  Queries scanned: {}", stats.queries_started);
    println!("  Works evaluated: {}", stats.documents_evaluated);
    println!("  Below rating minimum: {}", stats.low_rating_skips);
    if stats.queries_abandoned > 0 {
        println!(
            "  Queries abandoned: {}",
            style(stats.queries_abandoned).yellow().bold()
        );
    }

    if let Some(path) = export_rows(&state.rows, &config)? {
        println!();
        println!(
            "{} {} ({} rows x {} columns)",
            style("Saved to:").green().bold(),
            path.display(),
            state.len(),
            column_count(&config)
        );
    }

    Ok(())
}

fn column_count(config: &HarvestConfig) -> usize {
    OutputRow::COLUMNS.len() + usize::from(config.author_stats)
}
