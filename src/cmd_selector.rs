//! Selector subcommand handlers for uiinspect.

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use uiinspect_backend_snapshot::{parse_child_path, SnapshotTree};
use uiinspect_config::Config;
use uiinspect_core::protocols::{BackendKind, Dialect, ElementAccess, Point, SelectorError};
use uiinspect_core::{
    CodeGenerator, ElementProperties, Poller, ResolveOptions, Resolver, Selector, Synthesizer,
};

use crate::cli::Commands;

/// Handle a subcommand.
pub(crate) fn handle_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Synth {
            tree,
            path,
            code,
            json,
        } => synth(&tree, &path, code, json),
        Commands::Resolve {
            tree,
            selector,
            timeout_ms,
        } => resolve(&tree, &selector, timeout_ms, config),
        Commands::At { tree, x, y } => at(&tree, Point::new(x, y), config),
        Commands::Check { selector, backend } => {
            check(&selector, backend.unwrap_or(config.backend.kind))
        }
    }
}

fn resolve_options(config: &Config) -> ResolveOptions {
    ResolveOptions {
        poller: Poller::new(config.resolver.timeout(), config.resolver.poll_interval())
            .with_retry_on_stale(config.resolver.retry_on_stale),
        visible_only: config.resolver.visible_only,
    }
}

fn load_tree(path: &Path) -> Result<SnapshotTree, Box<dyn std::error::Error>> {
    let tree = SnapshotTree::load(path)?;
    info!(
        "Loaded {} tree with {} elements from {}",
        tree.backend(),
        tree.len(),
        path.display()
    );
    Ok(tree)
}

/// Read a selector file: a JSON structured query or selector text.
fn load_selector(path: &Path, dialect: &Dialect) -> Result<Selector, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let selector = if path.extension().is_some_and(|ext| ext == "json") {
        Selector::from_json(&content)?
    } else {
        Selector::parse(&content, dialect)?
    };
    debug!(levels = selector.len(), "Selector loaded from {}", path.display());
    Ok(selector)
}

fn print_selector(selector: &Selector, mask: &[bool], dialect: &Dialect) -> Result<(), SelectorError> {
    for (index, line) in selector.to_lines(dialect)?.iter().enumerate() {
        let mark = if mask.get(index).copied().unwrap_or(true) {
            "x"
        } else {
            " "
        };
        println!("[{}] {}", mark, line);
    }
    Ok(())
}

/// Synthesize a selector for the element at `path`.
fn synth(
    tree_path: &Path,
    path: &str,
    code: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(tree_path)?;
    let indices = parse_child_path(path)?;
    let target = tree
        .node_at_path(&indices)
        .ok_or_else(|| format!("No element at path '{}'", path))?;

    let synthesis = Synthesizer::new(&tree).synthesize(&target)?;
    let selector = synthesis.selector();

    if json {
        println!("{}", serde_json::to_string_pretty(&selector)?);
    } else {
        print_selector(&selector, &synthesis.default_mask(), tree.dialect())?;
    }

    if code {
        println!();
        println!("{}", CodeGenerator::new(tree.backend()).generate_default(&synthesis));
    }
    Ok(())
}

/// Resolve a selector file and print the element's properties.
fn resolve(
    tree_path: &Path,
    selector_path: &Path,
    timeout_ms: Option<u64>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(tree_path)?;
    let selector = load_selector(selector_path, tree.dialect())?;
    let resolver = Resolver::with_options(&tree, resolve_options(config));

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.resolver.timeout());
    let element = resolver.resolve_within(&tree.root_id(), &selector, timeout)?;

    print!("{}", ElementProperties::collect(&tree, &element)?);
    Ok(())
}

/// Show the element under a point and the selector that re-finds it.
fn at(tree_path: &Path, point: Point, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(tree_path)?;
    let element = Resolver::with_options(&tree, resolve_options(config)).element_at(point)?;

    print!("{}", ElementProperties::collect(&tree, &element)?);
    if element == tree.root_id() && !tree.dialect().parentless_level {
        return Ok(());
    }

    println!();
    let synthesis = Synthesizer::new(&tree).synthesize(&element)?;
    print_selector(&synthesis.selector(), &synthesis.default_mask(), tree.dialect())?;
    Ok(())
}

/// Parse a selector file without resolving it.
fn check(selector_path: &Path, backend: BackendKind) -> Result<(), Box<dyn std::error::Error>> {
    let selector = load_selector(selector_path, backend.dialect())?;
    println!(
        "OK: {} levels, target {} below the search root",
        selector.len(),
        selector.total_depth()
    );
    for level in selector.levels() {
        println!("  {}", level);
    }
    Ok(())
}
