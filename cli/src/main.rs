//! linkrank CLI: PageRank, rank aggregation and search over a page corpus
//!
//! Results go to stdout, logs to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use linkrank::algo::{aggregate_files, page_rank_collection, search_collection, PageRankReport};
use linkrank::{AggregationResult, LinkRankConfig, SearchHit};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "linkrank", version, about = "Link-based page ranking")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "plain", global = true)]
    format: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Plain,
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank every page of the collection by weighted PageRank
    Pagerank {
        /// Damping factor
        damping: f64,
        /// Stop once the total change drops below this
        tolerance: f64,
        /// Upper bound on iterations
        max_iterations: usize,
    },
    /// Combine several rankings into one by scaled footrule distance
    Aggregate {
        /// Ranking files, one identifier per token
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Split the permutation search across threads
        #[arg(long)]
        parallel: bool,

        /// Largest item universe to search
        #[arg(long)]
        max_items: Option<usize>,

        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Rank pages matching the search terms
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => LinkRankConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LinkRankConfig::default(),
    };

    match cli.command {
        Commands::Pagerank {
            damping,
            tolerance,
            max_iterations,
        } => {
            config.pagerank.damping_factor = damping;
            config.pagerank.tolerance = tolerance;
            config.pagerank.max_iterations = max_iterations;
            let report = page_rank_collection(&config).context("page rank failed")?;
            print_page_rank(&report, cli.format)
        }
        Commands::Aggregate {
            files,
            parallel,
            max_items,
            timeout_ms,
        } => {
            let aggregation = &mut config.aggregation;
            aggregation.parallel |= parallel;
            if let Some(max_items) = max_items {
                aggregation.max_items = max_items;
            }
            if timeout_ms.is_some() {
                aggregation.timeout_ms = timeout_ms;
            }
            let result =
                aggregate_files(&files, &config.aggregation, None).context("aggregation failed")?;
            print_aggregation(&result, cli.format)
        }
        Commands::Search { terms } => {
            let hits = search_collection(&terms, &config).context("search failed")?;
            print_search(&hits, cli.format)
        }
    }
}

fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn print_page_rank(report: &PageRankReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Plain => {
            for entry in &report.entries {
                println!("{} {} {:.7}", entry.identifier, entry.out_degree, entry.score);
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(["URL", "Out-degree", "PageRank"]);
            for entry in &report.entries {
                table.add_row(vec![
                    entry.identifier.clone(),
                    entry.out_degree.to_string(),
                    format!("{:.7}", entry.score),
                ]);
            }
            println!("{}", table);
            println!(
                "{} iteration(s), {}",
                report.iterations,
                if report.converged { "converged" } else { "not converged" }
            );
            if !report.dangling.is_empty() {
                println!("without out-links: {}", report.dangling.join(", "));
            }
        }
    }
    Ok(())
}

fn print_aggregation(result: &AggregationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Plain => {
            println!("{:.7}", result.distance);
            for item in &result.ordering {
                println!("{}", item);
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(["Rank", "Item"]);
            for (rank, item) in result.ordering.iter().enumerate() {
                table.add_row(vec![(rank + 1).to_string(), item.clone()]);
            }
            println!("{}", table);
            println!(
                "distance {:.7} over {} candidate(s)",
                result.distance, result.candidates_evaluated
            );
        }
    }
    Ok(())
}

fn print_search(hits: &[SearchHit], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(hits)?),
        OutputFormat::Plain => {
            for hit in hits {
                println!("{}", hit.identifier);
            }
        }
        OutputFormat::Table => {
            if hits.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let mut table = new_table(["URL", "Matches", "PageRank"]);
            for hit in hits {
                table.add_row(vec![
                    hit.identifier.clone(),
                    hit.matches.to_string(),
                    format!("{:.7}", hit.score),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}
