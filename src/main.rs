//! Flowstore CLI
//!
//! Inspect and dry-run flow storage selection from a configuration file.
//!
//! # Usage
//!
//! ```bash
//! # Which driver does the default flow backend resolve to?
//! flowstore --config flowstore.toml resolve
//!
//! # List every configured storage backend
//! flowstore backends
//!
//! # Run a full selection against simulated engines
//! flowstore select --backend es1 --seed 42
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use flowstore::config::{Config, ConfigSource};
use flowstore::constants::{
    CONFIG_DRIVER_SUFFIX, CONFIG_STORAGE_PREFIX, DRIVER_ELASTICSEARCH, DRIVER_ORIENTDB,
    FAMILY_ELASTICSEARCH, FAMILY_ORIENTDB,
};
use flowstore::coordination::StaticCoordinationClient;
use flowstore::dst::SimConfig;
use flowstore::logging::LoggingConfig;
use flowstore::selector::{DriverRegistry, DriverResolution, SimDriver, StorageSelector};
use flowstore::storage::{FlowStorage, StorageResult};
use flowstore::SearchQuery;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default configuration file
pub const CONFIG_PATH_DEFAULT: &str = "flowstore.toml";

/// Application name
pub const APP_NAME: &str = "flowstore";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// CLI
// =============================================================================

/// Flow storage backend selection
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Inspect and dry-run flow storage backend selection")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = CONFIG_PATH_DEFAULT)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which driver a backend resolves to, without connecting
    Resolve {
        /// Backend name (defaults to analyzer.flow.backend)
        #[arg(long)]
        backend: Option<String>,
    },
    /// List configured storage backends and their drivers
    Backends,
    /// Run a full selection with simulated engines
    Select {
        /// Backend name (defaults to analyzer.flow.backend)
        #[arg(long)]
        backend: Option<String>,
        /// Random seed for the simulated engines
        #[arg(long)]
        seed: Option<u64>,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config_exists = Path::new(&cli.config).exists();
    let config = if config_exists {
        Config::load(&cli.config).with_context(|| format!("loading {}", cli.config))?
    } else {
        Config::from_env()
    };

    let mut logging = LoggingConfig::from_config(&config);
    match cli.verbose {
        0 => {}
        1 => logging = logging.with_level("debug"),
        _ => logging = logging.with_level("trace"),
    }
    logging.init();

    tracing::debug!("{} v{}", APP_NAME, APP_VERSION);
    if !config_exists {
        tracing::warn!(path = %cli.config, "config file not found, using environment only");
    }

    match cli.command {
        Commands::Resolve { backend } => resolve(config, backend),
        Commands::Backends => {
            list_backends(&config);
            Ok(())
        }
        Commands::Select { backend, seed } => select(config, backend, seed).await,
    }
}

// =============================================================================
// Commands
// =============================================================================

fn resolve(config: Config, backend: Option<String>) -> anyhow::Result<()> {
    let selector = StorageSelector::new(Arc::new(config), simulated_registry(SimConfig::default())?);
    let backend = backend.unwrap_or_else(|| selector.default_backend());

    match selector.resolve_driver(&backend) {
        DriverResolution::Disabled { backend } => {
            println!("{backend}: storage disabled (driver 'memory')");
        }
        DriverResolution::Registered {
            backend,
            driver,
            family,
        } => {
            println!("{backend}: driver '{driver}' ({family})");
        }
        DriverResolution::Unsupported { backend, driver } => {
            anyhow::bail!("Flow backend driver '{driver}' not supported for backend '{backend}'");
        }
    }
    Ok(())
}

fn list_backends(config: &Config) {
    let prefix = format!("{CONFIG_STORAGE_PREFIX}.");
    let suffix = format!(".{CONFIG_DRIVER_SUFFIX}");

    let mut found = false;
    for key in config.keys() {
        let Some(backend) = key
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(&suffix))
        else {
            continue;
        };
        let driver = config.get_string(&key).unwrap_or_default();
        println!("{backend}\t{driver}");
        found = true;
    }
    if !found {
        println!("no storage backend configured");
    }
}

async fn select(config: Config, backend: Option<String>, seed: Option<u64>) -> anyhow::Result<()> {
    let sim_config = seed.map_or_else(SimConfig::from_env_or_random, SimConfig::with_seed);
    let coordination = StaticCoordinationClient::from_config(&config);

    let mut selector = StorageSelector::new(Arc::new(config), simulated_registry(sim_config)?);
    if let Some(client) = coordination {
        selector = selector.with_coordination(Arc::new(client));
    }
    let backend = backend.unwrap_or_else(|| selector.default_backend());

    let selection = selector.select(&backend).await?;
    if selection.is_disabled() {
        println!("{backend}: storage disabled");
        return Ok(());
    }

    let storage = selection.into_storage_or_disabled();
    let count = dry_run(storage.as_ref()).await?;

    println!("{backend}: selected, started and stopped ({count} flows)");
    Ok(())
}

/// Start the handle, count every stored flow, then stop it even on failure.
async fn dry_run(storage: &dyn FlowStorage) -> StorageResult<usize> {
    storage.start().await;
    let result = storage.search_flows(&SearchQuery::all()).await;
    storage.stop().await;
    Ok(result?.len())
}

/// Registry binding the known engine kinds to simulated drivers.
fn simulated_registry(sim_config: SimConfig) -> anyhow::Result<DriverRegistry> {
    let registry = DriverRegistry::new()
        .with_driver(
            DRIVER_ELASTICSEARCH,
            Arc::new(SimDriver::new(FAMILY_ELASTICSEARCH, sim_config)),
        )?
        .with_driver(
            DRIVER_ORIENTDB,
            Arc::new(SimDriver::new(FAMILY_ORIENTDB, sim_config)),
        )?;
    Ok(registry)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use flowstore::dst::{FaultConfig, FaultType};
    use flowstore::storage::{SimFlowStorage, StorageError};

    #[tokio::test]
    async fn test_dry_run_counts_flows() {
        let storage = SimFlowStorage::new(SimConfig::with_seed(3));
        assert_eq!(dry_run(&storage).await, Ok(0));
        assert!(!storage.is_running());
    }

    #[tokio::test]
    async fn test_dry_run_stops_handle_when_search_fails() {
        let storage = SimFlowStorage::new(SimConfig::with_seed(3)).with_faults(
            FaultConfig::new(FaultType::StorageReadFail, 1.0).with_filter("search_flows"),
        );

        let err = dry_run(&storage).await.unwrap_err();

        assert!(matches!(err, StorageError::Query { .. }));
        assert!(!storage.is_running());
        assert_eq!(
            storage.store_flows(&[]).await,
            Err(StorageError::internal("storage stopped"))
        );
    }
}
