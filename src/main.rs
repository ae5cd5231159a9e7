//! rxgraph CLI: drug interaction graph queries and name resolution.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use rxgraph::config::RxGraphConfig;
use rxgraph::error::RxResult;
use rxgraph::export::GraphExport;
use rxgraph::graph::InteractionGraph;
use rxgraph::graph::analytics::{connected_components, degree_table, severity_histogram};
use rxgraph::graph::sampling::estimate;
use rxgraph::graph::traverse::{PathLength, shortest_path, shortest_route};
use rxgraph::ingest::load_records;
use rxgraph::resolve::ResolutionCache;
use rxgraph::store::{CacheBackend, open_store};

#[derive(Parser)]
#[command(name = "rxgraph", version, about = "Drug interaction graph queries")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/rxgraph/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resolution cache file (overrides config).
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Resolution cache backend: memory, json or redb (overrides config).
    #[arg(long, global = true)]
    backend: Option<CacheBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph from a record file and print statistics.
    Ingest {
        /// JSON array of records, or an interaction-list document.
        #[arg(long)]
        file: PathBuf,
    },

    /// Hop distance between two identifiers.
    Distance {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Also print one shortest route.
        #[arg(long)]
        route: bool,
    },

    /// Estimate the mean hop distance from a reference identifier.
    Estimate {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        reference: String,
        /// RNG seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        max_samples: Option<usize>,
        #[arg(long)]
        max_draws: Option<usize>,
    },

    /// List connected components, largest first.
    Components {
        #[arg(long)]
        file: PathBuf,
    },

    /// Export the graph as nested adjacency JSON.
    Export {
        #[arg(long)]
        file: PathBuf,
        /// Write here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Resolve a comma-separated batch of names (at least two).
    Resolve {
        /// e.g. "Tylenol, Zocor, Diflucan"
        terms: String,
    },

    /// Resolve a single name.
    Lookup { term: String },

    /// Drop a cached name so the next lookup refetches it.
    Invalidate { term: String },
}

fn build_graph(file: &Path) -> RxResult<InteractionGraph> {
    let records = load_records(file)?;
    let mut graph = InteractionGraph::new();
    graph.ingest(&records);
    Ok(graph)
}

fn open_cache(cli: &Cli, config: &RxGraphConfig) -> RxResult<ResolutionCache> {
    let backend = cli.backend.unwrap_or(config.cache.backend);
    let path = match &cli.cache {
        Some(path) => path.clone(),
        None => rxgraph::config::CacheConfig {
            backend,
            path: config.cache.path.clone(),
        }
        .resolved_path()?,
    };
    tracing::debug!(?backend, path = %path.display(), "opening resolution cache");
    let store = open_store(backend, &path)?;
    Ok(ResolutionCache::open_boxed(store)?)
}

fn print_resolution(resolution: &rxgraph::resolve::Resolution) {
    for (id, name) in resolution {
        println!("  {id:>10}  {name}");
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RxGraphConfig::discover(cli.config.as_deref())?;

    match &cli.command {
        Commands::Ingest { file } => {
            let graph = build_graph(file)?;
            println!(
                "Ingested {} records: {} vertices, {} half-edges",
                graph.record_count(),
                graph.vertex_count(),
                graph.half_edge_count()
            );
            println!("Severity:");
            for (severity, count) in severity_histogram(&graph) {
                println!("  {severity:<12} {count}");
            }
            println!("Most connected:");
            for entry in degree_table(&graph).iter().take(10) {
                println!("  {:>10}  {:<40} {}", entry.id, entry.name, entry.degree);
            }
        }

        Commands::Distance {
            file,
            from,
            to,
            route,
        } => {
            let graph = build_graph(file)?;
            match shortest_path(&graph, from, to) {
                PathLength::Found(hops) => println!("{from} -> {to}: {hops} hop(s)"),
                PathLength::Unreachable => println!("{from} -> {to}: no path"),
            }
            if *route {
                if let Some(route) = shortest_route(&graph, from, to) {
                    println!("Route: {}", route.join(" -> "));
                }
            }
        }

        Commands::Estimate {
            file,
            reference,
            seed,
            threshold,
            max_samples,
            max_draws,
        } => {
            let graph = build_graph(file)?;
            let mut sampling = config.sampling.clone();
            if seed.is_some() {
                sampling.seed = *seed;
            }
            if let Some(threshold) = threshold {
                sampling.threshold = *threshold;
            }
            if let Some(max_samples) = max_samples {
                sampling.max_samples = *max_samples;
            }
            if let Some(max_draws) = max_draws {
                sampling.max_draws = *max_draws;
            }

            let result = estimate(&graph, reference, &sampling)?;
            tracing::info!(
                reference = %reference,
                mean = result.mean,
                samples = result.samples,
                converged = result.converged,
                "estimate complete"
            );
            println!("Mean distance from {reference}: {:.4}", result.mean);
            println!(
                "  samples: {}  discarded: {}  draws: {}  converged: {}",
                result.samples, result.discarded, result.draws, result.converged
            );
        }

        Commands::Components { file } => {
            let graph = build_graph(file)?;
            for component in connected_components(&graph) {
                println!(
                    "Component {} ({} members): {}",
                    component.id,
                    component.size,
                    component.members.join(", ")
                );
            }
        }

        Commands::Export { file, output } => {
            let graph = build_graph(file)?;
            let json = GraphExport::from_graph(&graph).to_json().into_diagnostic()?;
            match output {
                Some(path) => {
                    std::fs::write(path, json).into_diagnostic()?;
                    println!("Exported {} vertices to {}", graph.vertex_count(), path.display());
                }
                None => println!("{json}"),
            }
        }

        Commands::Resolve { terms } => {
            let cache = open_cache(&cli, &config)?;
            let client = config.upstream.client();
            let batch = cache.resolve_batch(terms, &client)?;
            for (term, resolution) in &batch.terms {
                println!("{term}:");
                print_resolution(resolution);
            }
            if !batch.skipped.is_empty() {
                println!("Not found: {}", batch.skipped.join(", "));
            }
            println!(
                "{} identifiers ({} cached, {} fetched)",
                batch.resolved.len(),
                batch.hits.len(),
                batch.fetched.len()
            );
        }

        Commands::Lookup { term } => {
            let cache = open_cache(&cli, &config)?;
            let client = config.upstream.client();
            let resolution = cache.resolve_term(term, &client)?;
            if resolution.is_empty() {
                println!("No identifiers for \"{term}\"");
            } else {
                print_resolution(&resolution);
            }
        }

        Commands::Invalidate { term } => {
            let cache = open_cache(&cli, &config)?;
            if cache.invalidate(term)? {
                println!("Removed \"{term}\" from the cache");
            } else {
                println!("\"{term}\" was not cached");
            }
        }
    }

    Ok(())
}
