//! `dirlisten`: watch a directory and print each event as a JSON line.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use codex_directory_listener::{
    DirectoryListener, DirectoryService, FileSystemEvent, ListenerConfig, ResourceSlot,
    handler_fn,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dirlisten", about = "Watch a directory for file system events")]
struct Cli {
    /// Directory to watch. Overrides the path from `--config`.
    path: Option<PathBuf>,

    /// TOML file holding a listener configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch sub-directories too.
    #[arg(short, long)]
    recursive: bool,

    /// Resources to enable (on_create, on_delete, on_modify). Defaults to all.
    #[arg(short = 'e', long = "resource", value_delimiter = ',')]
    resources: Vec<ResourceSlot>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let slots = if cli.resources.is_empty() {
        ResourceSlot::ALL.to_vec()
    } else {
        cli.resources.clone()
    };

    let printer = handler_fn(|event: FileSystemEvent| async move {
        println!("{}", serde_json::to_string(&event)?);
        Ok(())
    });
    let service = slots
        .into_iter()
        .fold(DirectoryService::new("dirlisten"), |svc, slot| {
            svc.with_slot(slot, printer.clone())
        });

    let handle = DirectoryListener::new(config)
        .register(service)
        .context("failed to start listener")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to wait for ctrl-c")?;
    info!("Shutting down");
    handle.stop();

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ListenerConfig> {
    let mut config = match (&cli.config, &cli.path) {
        (Some(file), _) => ListenerConfig::load(file)
            .with_context(|| format!("failed to load {}", file.display()))?,
        (None, Some(path)) => ListenerConfig::new(path),
        (None, None) => anyhow::bail!("either a path or --config is required"),
    };

    if let Some(path) = &cli.path {
        config.path = path.clone();
    }
    if cli.recursive {
        config.recursive = true;
    }

    Ok(config)
}
