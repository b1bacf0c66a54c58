//! # smarthub: simulated home-automation hub
//!
//! Composition root that wires the hub, its storage and the console menu.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, settings file)
//! - Initialize tracing
//! - Construct the file adapters (JSON configuration, CSV event log)
//! - Load the hub and register its observers
//! - Run the interactive menu, saving on exit
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod console;
mod menu;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use smarthub_adapter_storage_file::{CsvEventLog, JsonConfigStore};
use smarthub_app::Hub;
use smarthub_app::ports::SystemClock;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;
use crate::menu::Menu;
use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "smarthub")]
#[command(about = "Simulated home-automation hub")]
#[command(version)]
struct Cli {
    /// Hub configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Durable event log (CSV)
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long, default_value = settings::DEFAULT_PATH)]
    settings: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.settings)
        .with_context(|| format!("failed to load settings from {}", cli.settings.display()))?;
    settings.apply_cli_overrides(cli.config, cli.event_log);
    settings.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.logging.filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = JsonConfigStore::new(&settings.storage.config_path);
    let event_log = Arc::new(CsvEventLog::new(&settings.storage.event_log_path));

    let mut hub = Hub::load(&store, SystemClock).with_context(|| {
        format!(
            "failed to load hub configuration from {}",
            store.path().display()
        )
    })?;
    hub.add_observer(ConsoleObserver::stdout());
    hub.add_observer(Arc::clone(&event_log));
    tracing::info!(
        config = %store.path().display(),
        event_log = %event_log.path().display(),
        devices = hub.device_count(),
        "smarthub starting"
    );

    let stdin = std::io::stdin();
    let mut menu = Menu::new(stdin.lock(), std::io::stdout());
    menu.run(&mut hub, &event_log, &store)
}
