//! raidview CLI - drive the interactive views of a security report

#![deny(warnings)]

// Global invariants enforced:
// - Interactions are applied in a fixed order: filters, sort, page size, page
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use raidview_core::config;
use raidview_core::progress::Gradient;
use raidview_core::report::{render_page_json, render_page_text};
use raidview_core::{
    load_script, open_report, render_json, render_text, CollectionKind, PageReport, PageSize,
    ViewReport,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raidview")]
#[command(about = "Filter, sort and page through the views of a security report document")]
#[command(version = env!("RAIDVIEW_VERSION"))]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of a collection after applying filters
    View {
        /// Path to the report document (JSON)
        document: PathBuf,

        /// Collection to show
        #[arg(long, default_value = "vulnerabilities")]
        collection: CollectionKind,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Severity filter (vulnerabilities only)
        #[arg(long)]
        severity: Option<String>,

        /// Author filter (vulnerabilities only)
        #[arg(long)]
        author: Option<String>,

        /// Sort key (overrides config file)
        #[arg(long)]
        sort: Option<String>,

        /// Page number to show
        #[arg(long)]
        page: Option<usize>,

        /// Items per page, or "all" (overrides config file)
        #[arg(long)]
        page_size: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover next to the document)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay a script of UI events against a report document
    Replay {
        /// Path to the report document (JSON)
        document: PathBuf,

        /// Path to the event script (JSON array of steps)
        script: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover next to the document)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the progress bar background for a percentage
    Gradient {
        /// Fill percentage
        #[arg(allow_negative_numbers = true)]
        percentage: f64,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without loading a report
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Interactions requested on the command line for `view`
struct ViewArgs {
    collection: CollectionKind,
    search: Option<String>,
    severity: Option<String>,
    author: Option<String>,
    sort: Option<String>,
    page: Option<usize>,
    page_size: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::View {
            document,
            collection,
            search,
            severity,
            author,
            sort,
            page,
            page_size,
            format,
            config: config_path,
        } => {
            let args = ViewArgs {
                collection,
                search,
                severity,
                author,
                sort,
                page,
                page_size,
            };
            let report = run_view(&document, config_path.as_deref(), &args)?;
            match format {
                OutputFormat::Text => print!("{}", render_text(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }
        }
        Commands::Replay {
            document,
            script,
            format,
            config: config_path,
        } => {
            let steps = load_script(&script)?;
            let mut page = open_report(&document, config_path.as_deref())?;
            info!(steps = steps.len(), "replaying script");
            page.run_script(&steps)?;

            let report = PageReport::from_page(&page);
            match format {
                OutputFormat::Text => print!("{}", render_page_text(&report)),
                OutputFormat::Json => println!("{}", render_page_json(&report)),
            }
        }
        Commands::Gradient { percentage } => {
            if !percentage.is_finite() {
                anyhow::bail!("percentage must be a finite number (got {})", percentage);
            }
            println!("{}", Gradient::for_percentage(percentage));
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let dir = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&dir, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let dir = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&dir, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Collections:");
                for kind in CollectionKind::ALL {
                    let settings = resolved.collection(kind);
                    println!(
                        "  {}: {} per page, sorted by {}",
                        kind, settings.page_size, settings.default_sort
                    );
                }
                println!();
                println!("Tooltip:");
                println!("  hide_delay_ms: {}", resolved.tooltip.hide_delay_ms);
                println!("  offset_px: {}", resolved.tooltip.offset_px);
                println!();
                println!("Progress:");
                println!("  animation_delay_ms: {}", resolved.animation_delay_ms);
            }
        },
    }

    Ok(())
}

/// Open the document, apply the requested interactions and snapshot the view
fn run_view(
    document: &Path,
    config_path: Option<&Path>,
    args: &ViewArgs,
) -> anyhow::Result<ViewReport> {
    if !document.exists() {
        anyhow::bail!("Path does not exist: {}", document.display());
    }
    if args.collection != CollectionKind::Vulnerabilities
        && (args.severity.is_some() || args.author.is_some())
    {
        anyhow::bail!("--severity and --author only apply to the vulnerabilities collection");
    }

    let page_size = args
        .page_size
        .as_deref()
        .map(|value| {
            PageSize::parse(value).with_context(|| {
                format!("--page-size must be a positive integer or \"all\" (got {})", value)
            })
        })
        .transpose()?;

    let mut page = open_report(document, config_path)
        .with_context(|| format!("failed to open report: {}", document.display()))?;
    let (view, doc) = page.view_mut(args.collection);
    if view.is_inert() {
        info!(collection = %args.collection, "collection has no items");
    }

    if let Some(ref term) = args.search {
        view.set_search(doc, term);
    }
    if let Some(ref severity) = args.severity {
        view.set_filter(doc, "severity", severity);
    }
    if let Some(ref author) = args.author {
        view.set_filter(doc, "author", author);
    }
    if let Some(ref key) = args.sort {
        if view.config().sort(key).is_none() {
            anyhow::bail!(
                "unknown sort key for {}: {} (expected one of: {})",
                args.collection,
                key,
                view.config().sort_keys().join(", ")
            );
        }
        view.sort_by(doc, key);
    }
    if let Some(size) = page_size {
        view.change_page_size(doc, size);
    }
    if let Some(n) = args.page {
        if !view.is_inert() && !view.go_to_page(doc, n) {
            anyhow::bail!("page {} is out of range (1..={})", n, view.total_pages());
        }
    }

    Ok(ViewReport::from_view(view, doc))
}
