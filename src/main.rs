use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use memgraph::mapper::{Mapper, Root};
use memgraph::render::{DotWriter, ProcessInfo};
use memgraph::value::{Heap, Slot, from_json};
use memgraph::{Settings, demo};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON document to map; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Where to write the DOT output; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Diagram caption.
    #[arg(long)]
    caption: Option<String>,

    /// Options file to use instead of the discovered `memgraph.options`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Collapse pointer-like header nodes into their targets.
    #[arg(long)]
    collapse: bool,

    /// Map the built-in sample object graph instead of an input document.
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Leave out the process information table.
    #[arg(long)]
    no_info: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memgraph=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    let (heap, roots) = if args.demo {
        let demo = demo::build();
        (demo.heap, demo.roots)
    } else {
        read_document(args.input.as_ref())?
    };

    let mut mapper = Mapper::new(&heap, &settings);
    if let Some(caption) = &args.caption {
        mapper.set_caption(caption.as_str());
    }
    for slot in &roots {
        mapper
            .map_root(Root::Slot(*slot))
            .context("failed to map root value")?;
    }

    let stats = mapper.stats();
    let diagnostics = mapper.diagnostics().len();
    let graph = mapper.finish();
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        visits = stats.visits,
        cache_hits = stats.cache_hits,
        diagnostics,
        "mapped"
    );

    let mut writer = DotWriter::new(&settings);
    if !settings.suppress_info {
        writer = writer.with_info(ProcessInfo::collect(graph.caption.as_deref()));
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            writer.write(&mut out, &graph)?;
            out.flush()
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writer
                .write(&mut out, &graph)
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}

/// The process-wide settings, unless the command line overrides some of them.
fn load_settings(args: &Args) -> Result<Cow<'static, Settings>> {
    if args.config.is_none() && !args.collapse && !args.no_info {
        return Ok(Cow::Borrowed(Settings::global()));
    }

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => Settings::global().clone(),
    };

    if args.collapse {
        settings.collapse_pointer_nodes = true;
    }
    if args.no_info {
        settings.suppress_info = true;
    }
    Ok(Cow::Owned(settings))
}

fn read_document(input: Option<&PathBuf>) -> Result<(Heap, Vec<Slot>)> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            raw
        }
    };

    if raw.trim().is_empty() {
        bail!("input document is empty");
    }

    let document: serde_json::Value =
        serde_json::from_str(&raw).context("input is not valid JSON")?;

    let mut heap = Heap::new();
    let root = heap.alloc(from_json(&document));
    Ok((heap, vec![root]))
}
