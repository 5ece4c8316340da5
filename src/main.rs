use anyhow::{Context, Result};
use clap::Parser;
use outliner::{parse_bindings, write_outline, NodeStore, NodeUpdate, OutlineConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "outliner", version, about = "Print an outline as its Turtle save document")]
struct Args {
    /// YAML or JSON outline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SPARQL JSON results to load; a demo tree is built when omitted
    results: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => OutlineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OutlineConfig::default(),
    };
    let mut store = NodeStore::from_config(&config)?;

    info!("Outliner v{}", outliner::version());

    match &args.results {
        Some(path) => load_results(&mut store, path)?,
        None => build_demo(&mut store)?,
    }

    print!("{}", write_outline(&store)?);
    Ok(())
}

/// Rebuild the tree from a SPARQL JSON results file
fn load_results(store: &mut NodeStore, path: &Path) -> Result<()> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let parsed = parse_bindings(&body)?;
    for (row, reason) in &parsed.skipped {
        warn!(row, %reason, "skipped binding row");
    }

    if !store.rebuild_from_flat(parsed.records) {
        warn!("results contain no root node, starting an empty outline");
        store.create_root()?;
    }
    info!(nodes = store.node_count(), "outline loaded");
    Ok(())
}

fn build_demo(store: &mut NodeStore) -> Result<()> {
    let root = store.create_root()?.id.clone();

    let groceries = store.add_node(&root, "Groceries", None)?.id.clone();
    let milk = store.add_node(&groceries, "Buy milk", None)?.id.clone();
    store.add_node(&groceries, "Buy eggs", None)?;
    store.update_description(&milk, "Oat, *not* dairy");

    let chores = store.add_node(&root, "Chores", None)?.id.clone();
    let laundry = store.add_node(&chores, "Laundry", None)?.id.clone();
    store.update_node(&laundry, NodeUpdate::new().title("Laundry (whites)"));
    store.add_node(&root, "Call \"Mum\"", Some(0))?;

    store.validate()?;
    info!(nodes = store.node_count(), quads = store.quads().len(), "demo outline built");
    Ok(())
}
