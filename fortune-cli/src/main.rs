//! Voronoi diagram CLI
//!
//! Computes the Voronoi diagram of a set of sites and writes its vertices
//! and edges as YAML or JSON.
//!
//! ## Site files
//!
//! ```yaml
//! sites:
//!   - [0, 0]
//!   - [10, 0]
//!   - [5, 10]
//! min_site_distance: 2.5   # optional
//! ```
//!
//! Run with: `voronoi -i sites.yaml -o diagram.json --format json`
//!
//! ## Random sites
//!
//!   voronoi --random 1000 --seed 3 --width 1920 --height 1080 --summary
//!
//! ## Interruption
//!
//! Ctrl+C stops the sweep between two events; nothing is written.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::Level;

use fortune_core::{filter_by_min_site_distance, random_sites, Edge, Fortune, Point, VoronoiError, VoronoiGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

/// Site file format
#[derive(Debug, Deserialize)]
struct SiteFile {
    sites: Vec<[f64; 2]>,
    #[serde(default)]
    min_site_distance: Option<f64>,
}

/// Serialized diagram
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct DiagramRecord {
    sites: usize,
    vertices: Vec<[f64; 2]>,
    edges: Vec<EdgeRecord>,
}

/// Serialized edge. Unbounded endpoints and infinite lengths are `null`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct EdgeRecord {
    left_site: [f64; 2],
    right_site: [f64; 2],
    vertex_a: Option<[f64; 2]>,
    vertex_b: Option<[f64; 2]>,
    anchor: [f64; 2],
    direction: [f64; 2],
    length: Option<f64>,
}

fn coords(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

fn finite_coords(p: Point) -> Option<[f64; 2]> {
    p.is_finite().then(|| coords(p))
}

impl EdgeRecord {
    fn from_edge(edge: &Edge) -> Self {
        let length = edge.length();
        Self {
            left_site: coords(edge.left_site()),
            right_site: coords(edge.right_site()),
            vertex_a: finite_coords(edge.vertex_a()),
            vertex_b: finite_coords(edge.vertex_b()),
            anchor: coords(edge.anchor_point()),
            direction: coords(edge.direction()),
            length: length.is_finite().then_some(length),
        }
    }
}

impl DiagramRecord {
    fn from_graph(sites: usize, graph: &VoronoiGraph) -> Self {
        let vertices = graph.sorted_vertices().into_iter().map(coords).collect();
        let mut edges: Vec<EdgeRecord> = graph.edges().iter().map(EdgeRecord::from_edge).collect();
        // Stable order for diffable output
        edges.sort_by(|a, b| {
            let key = |e: &EdgeRecord| [e.left_site, e.right_site];
            key(a)
                .iter()
                .flatten()
                .zip(key(b).iter().flatten())
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            sites,
            vertices,
            edges,
        }
    }
}

fn load_sites(path: &Path) -> anyhow::Result<SiteFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read site file: {:?}", path))?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse site file: {:?}", path))
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse site file: {:?}", path))
    }
}

fn render(record: &DiagramRecord, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(record)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(record)?;
            json.push('\n');
            json
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "voronoi")]
#[command(about = "Compute Voronoi diagrams with Fortune's algorithm", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Site file (YAML, or JSON with a .json extension)
    #[arg(short, long, conflicts_with = "random")]
    input: Option<PathBuf>,

    /// Generate this many random sites instead of reading a file
    #[arg(short, long)]
    random: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Width of the random site area
    #[arg(long, default_value = "1000.0")]
    width: f64,

    /// Height of the random site area
    #[arg(long, default_value = "1000.0")]
    height: f64,

    /// Drop edges between sites closer than this (overrides the site file)
    #[arg(long)]
    min_site_distance: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    format: OutputFormat,

    /// Output file path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print vertex and edge counts instead of the diagram
    #[arg(long)]
    summary: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging already initialized");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    // Set up SIGINT handler
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    let (sites, file_min_distance) = match (&args.input, args.random) {
        (Some(path), _) => {
            let file = load_sites(path)?;
            let sites: Vec<Point> = file.sites.iter().map(|&s| Point::from(s)).collect();
            tracing::info!("Loaded {} sites from {:?}", sites.len(), path);
            (sites, file.min_site_distance)
        }
        (None, Some(count)) => {
            tracing::info!(
                "Generating {} random sites in {}x{} (seed {})",
                count,
                args.width,
                args.height,
                args.seed
            );
            let sites = random_sites(count, args.width, args.height, args.seed)
                .context("failed to generate random sites")?;
            (sites, None)
        }
        (None, None) => anyhow::bail!("no sites: use --input <FILE> or --random <N>"),
    };

    let start = Instant::now();
    let fortune = Fortune::new().with_cancel_flag(interrupted);
    let graph = match fortune.compute(&sites) {
        Ok(graph) => graph,
        Err(VoronoiError::Cancelled) => anyhow::bail!("interrupted"),
        Err(e) => return Err(e).context("failed to compute Voronoi diagram"),
    };
    tracing::info!(
        "Computed {} vertices, {} edges in {:.1?}",
        graph.vertices().len(),
        graph.edges().len(),
        start.elapsed()
    );

    let graph = match args.min_site_distance.or(file_min_distance) {
        Some(d) => {
            let filtered = filter_by_min_site_distance(&graph, d);
            tracing::info!(
                "Kept {} of {} edges with site distance >= {}",
                filtered.edges().len(),
                graph.edges().len(),
                d
            );
            filtered
        }
        None => graph,
    };

    let text = if args.summary {
        let bounded = graph.edges().iter().filter(|e| e.length().is_finite()).count();
        format!(
            "sites: {}\nvertices: {}\nedges: {}\nbounded_edges: {}\n",
            sites.len(),
            graph.vertices().len(),
            graph.edges().len(),
            bounded
        )
    } else {
        render(&DiagramRecord::from_graph(sites.len(), &graph), args.format)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => std::io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("failed to write to stdout")?,
    }

    Ok(())
}
