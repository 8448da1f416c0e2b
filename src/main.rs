use std::path::PathBuf;

use aircast::index::{FlatTree, TreeNode};
use aircast::scheme::{self, CachingReport, IndexingQuery, IndexingReport, SchemeRun};
use aircast::CachingConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aircast", about = "Broadcast caching and air-index simulator")]
struct Cli {
    /// Print reports as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare PIX and LIX cache replacement over a broadcast cycle.
    Caching {
        /// Broadcast cycle, one symbol per character.
        #[arg(long, default_value = "ABACAD")]
        broadcast: String,
        /// Client requests in arrival order.
        #[arg(long = "requests", default_value = "ABCBAA")]
        requests: String,
        /// Number of pages the client caches.
        #[arg(long, default_value = "2")]
        pages: String,
        /// Print the per-tick trace of both runs.
        #[arg(long)]
        trace: bool,
    },
    /// Resolve entire and partial paths in a replication tree.
    Indexing {
        /// Destination leaf address.
        #[arg(long)]
        dest: u32,
        /// Address where the client enters the broadcast.
        #[arg(long)]
        entry: Option<u32>,
        /// Replication level tag (e.g. a1, b3, c12).
        #[arg(long)]
        level: Option<String>,
        /// Destination of the partial path; defaults to --dest.
        #[arg(long, requires = "level")]
        partial_dest: Option<u32>,
        /// Nested tree as JSON (`{"name": .., "children": [..]}`); defaults to
        /// the standard 54-leaf tree.
        #[arg(long)]
        tree: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Caching {
            broadcast,
            requests,
            pages,
            trace,
        } => run_caching(&broadcast, &requests, &pages, trace, cli.json)?,
        Commands::Indexing {
            dest,
            entry,
            level,
            partial_dest,
            tree,
        } => run_indexing(dest, entry, level, partial_dest, tree, cli.json)?,
    }

    Ok(())
}

fn run_caching(broadcast: &str, requests: &str, pages: &str, trace: bool, json: bool) -> Result<()> {
    let config = CachingConfig::from_raw(broadcast, requests, pages).map_err(|err| {
        warn!(%err, "rejected caching configuration");
        err
    })?;
    let report = scheme::compare_schemes(&config).context("caching comparison failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialise caching report")?
        );
        return Ok(());
    }

    print_caching(&report, trace);
    Ok(())
}

fn run_indexing(
    dest: u32,
    entry: Option<u32>,
    level: Option<String>,
    partial_dest: Option<u32>,
    tree_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let nested = match &tree_path {
        Some(path) => TreeNode::load(path)
            .with_context(|| format!("failed to load tree from {}", path.display()))?,
        None => TreeNode::standard(),
    };
    let tree = FlatTree::flatten(&nested).context("failed to flatten replication tree")?;

    if let Some(tag) = &level {
        if !tree.level_tags().contains(&tag.as_str()) {
            warn!(tag = %tag, "level tag is not an internal node of the tree");
        }
    }

    let query = IndexingQuery {
        entry,
        destination: dest,
        level,
        partial_destination: partial_dest,
    };
    let report = scheme::resolve_indexing(&tree, &query)
        .with_context(|| format!("path resolution failed for destination {dest}"))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialise indexing report")?
        );
        return Ok(());
    }

    print_indexing(&report);
    Ok(())
}

fn print_caching(report: &CachingReport, trace: bool) {
    println!("Broadcast frequencies:");
    print!("{}", report.broadcast_frequencies);
    println!("Request frequencies:");
    print!("{}", report.request_frequencies);
    println!("LIX access probabilities:");
    for (symbol, probability) in &report.lix_breakdown.probabilities {
        println!("{symbol}: {probability:.2}");
    }

    for run in [&report.pix, &report.lix] {
        print_run(run, trace);
    }

    match report.preferred() {
        Some(kind) => println!("Fewer broadcast steps with {kind}"),
        None => println!("Both schemes need the same number of steps"),
    }
}

fn print_run(run: &SchemeRun, trace: bool) {
    println!("{} values:", run.kind);
    print!("{}", run.scores);
    if trace {
        for line in run.outcome.trace_lines() {
            println!("{line}");
        }
    }
    println!(
        "{} total steps: {}\tticks={}\thits={}\tevictions={}\tcache=[{}]",
        run.kind,
        run.outcome.steps,
        run.outcome.ticks(),
        run.outcome.hits(),
        run.outcome.evictions(),
        run.outcome.cache
    );
}

fn print_indexing(report: &IndexingReport) {
    println!("Entire path: {}", report.entire_path_display());

    let Some(partial) = &report.partial else {
        return;
    };
    println!("Partial path to {}: {}", partial.destination, partial.path);
    println!(
        "Control index ({}, depth {}):",
        partial.level,
        partial.control_index.depth()
    );
    print!("{}", partial.control_index);
    println!("Global index:");
    for (global, range) in &partial.global_summary {
        println!("{global}\t[{}, {}]", range.start, range.end);
    }
}
