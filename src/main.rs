mod cli;

use duckflix::{
    config,
    library::{Indexer, IndexerOptions, Library},
    server,
};
use duckflix_av::MkvToolnix;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use std::path::PathBuf;
use std::sync::Arc;

async fn run(media_root: PathBuf, config: config::Config, scan_only: bool) -> Result<()> {
    if !media_root.is_dir() {
        anyhow::bail!("Media root is not a directory: {:?}", media_root);
    }

    let extractor = MkvToolnix::discover(&config.tools.tool_paths())
        .context("mkvtoolnix is required to index the library")?;
    let indexer = Indexer::new(Arc::new(extractor), IndexerOptions::from(&config.library));
    let library = Arc::new(Library::new(media_root, indexer));

    // The catalog is complete before the first request is accepted.
    let count = library.rescan().await?;
    tracing::info!("Indexed {} movies", count);

    if scan_only {
        let catalog = library.snapshot();
        println!("{}", serde_json::to_string_pretty(&catalog.ids())?);
        return Ok(());
    }

    server::start_server(config, library).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "duckflix=trace,duckflix_av=trace,tower_http=debug".to_string()
        } else {
            "duckflix=debug,duckflix_av=debug,tower_http=info".to_string()
        }
    });

    // stdout is reserved for --scan-only output
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config::validate_config(&config)?;

    if cli.check_tools {
        return check_tools(&config.tools.tool_paths());
    }

    let media_root = cli
        .media_root
        .clone()
        .context("MEDIA_ROOT is required")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(media_root, config, cli.scan_only))
}

fn check_tools(paths: &duckflix_av::ToolPaths) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = duckflix_av::check_tools(paths);

    for tool in &tools {
        match tool.path {
            Some(ref path) => println!("✓ {} - {}", tool.name, path.display()),
            None => println!("✗ {}", tool.name),
        }
    }

    println!();
    if tools.iter().all(|t| t.available()) {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("mkvmerge and mkvextract must be installed (mkvtoolnix)")
    }
}
