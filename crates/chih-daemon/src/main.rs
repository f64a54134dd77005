// crates/chih-daemon/src/main.rs
//
// Binary entrypoint for the Chih staking daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, loads or
// creates the daemon key, restores or creates the ledger, then runs the
// event logger and RPC server in the background and the snapshot scheduler
// in the foreground until ctrl-c.

mod config;
mod event_log;
mod persistence;
mod scheduler;
mod shared;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;
use scheduler::SnapshotScheduler;
use shared::DaemonSharedState;

use chih_core::crypto::Keypair;
use chih_core::ChihError;
use chih_ledger::SystemClock;
use chih_rpc::{ChihRpcServer, RpcConfig};

/// File holding the daemon's hex-encoded ed25519 secret.
const DAEMON_KEY_FILE: &str = "daemon.key";

/// Chih staking daemon: serves the staking pool ledger over RPC.
#[derive(Parser, Debug)]
#[command(name = "chih-daemon", version = "0.1.0", about = "Chih staking pool daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.chih/config.toml")]
    config: String,

    /// Override the RPC port from the config file.
    #[arg(long)]
    rpc_port: Option<u16>,

    /// Override the data directory from the config file.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config is loaded before tracing so its log_level can seed the filter.
    let config_path = expand_tilde(&args.config);
    let (mut daemon_config, config_error) = match DaemonConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (DaemonConfig::default(), Some(e.to_string())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match config_error {
        None => tracing::info!("Loaded configuration from {}", config_path),
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI flags override the config file.
    if let Some(port) = args.rpc_port {
        daemon_config.rpc_port = port;
    }
    if let Some(dir) = args.data_dir {
        daemon_config.data_dir = dir;
    }

    tracing::info!("Chih Staking Daemon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!(
        "Reward rate: {} per second ({:?})",
        daemon_config.reward_rate,
        daemon_config.emission_mode
    );

    let data_dir = PathBuf::from(expand_tilde(&daemon_config.data_dir));
    let daemon_key = load_or_create_key(&data_dir)?;
    tracing::info!("Daemon account: {}", daemon_key.account_id());

    let shared_state = DaemonSharedState::bootstrap(
        &daemon_config,
        &data_dir,
        &daemon_key,
        Arc::new(SystemClock),
    )?;
    {
        let pool = shared_state.ledger.pool.read().await;
        tracing::info!("Pool owner: {}", pool.owner());
    }

    // Event logger.
    let event_rx = shared_state.ledger.subscribe();
    tokio::spawn(event_log::run_event_logger(event_rx));

    // RPC server in background.
    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = ChihRpcServer::new(rpc_config, shared_state.ledger.clone())
        .with_start_time(shared_state.start_time);
    tokio::spawn(async move {
        if let Err(e) = rpc_server.start().await {
            tracing::error!("RPC server error: {}", e);
        }
    });

    // Snapshot scheduler in foreground; returns after ctrl-c and a final save.
    let mut scheduler =
        SnapshotScheduler::new(daemon_config.snapshot_interval_secs, shared_state.clone());
    scheduler.run().await?;

    tracing::info!("Chih daemon shut down gracefully");
    Ok(())
}

/// Load the daemon key from `data_dir`, generating and saving one on first run.
fn load_or_create_key(data_dir: &Path) -> Result<Keypair, ChihError> {
    let key_path = data_dir.join(DAEMON_KEY_FILE);
    match std::fs::read_to_string(&key_path) {
        Ok(hex_str) => Keypair::from_secret_hex(&hex_str),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(data_dir)
                .map_err(|e| ChihError::Storage(format!("create {}: {}", data_dir.display(), e)))?;
            let keypair = Keypair::generate();
            std::fs::write(&key_path, hex::encode(keypair.secret_bytes()))
                .map_err(|e| ChihError::Storage(format!("write {}: {}", key_path.display(), e)))?;
            tracing::info!("Generated daemon key at {}", key_path.display());
            Ok(keypair)
        }
        Err(e) => Err(ChihError::Storage(format!(
            "read {}: {}",
            key_path.display(),
            e
        ))),
    }
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
