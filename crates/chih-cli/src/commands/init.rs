// crates/chih-cli/src/commands/init.rs
//
// `chih init`: write ~/.chih/config.toml with the local wallet as the
// pool's Rate Authority.

use serde::Serialize;
use std::fs;

use super::wallet;

/// The subset of daemon settings `init` writes; everything else keeps the
/// daemon's defaults.
#[derive(Debug, Serialize)]
struct InitConfig {
    data_dir: String,
    rpc_host: String,
    rpc_port: u16,
    log_level: String,
    owner: String,
    reward_rate: String,
    emission_mode: String,
    reward_reserve: String,
    faucet_amount: String,
    snapshot_interval_secs: u64,
}

/// Run the init command.
pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("Could not determine home directory")?;
    let chih_dir = home.join(".chih");
    let config_path = chih_dir.join("config.toml");

    if config_path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    let keypair = match wallet::load_keypair(None) {
        Ok(kp) => kp,
        Err(_) => wallet::create_wallet(false)?,
    };

    let config = InitConfig {
        data_dir: "~/.chih/data".to_string(),
        rpc_host: "127.0.0.1".to_string(),
        rpc_port: 50061,
        log_level: "info".to_string(),
        owner: keypair.account_id().to_hex(),
        reward_rate: "0.000001".to_string(),
        emission_mode: "per_staked_unit".to_string(),
        reward_reserve: "10000000".to_string(),
        faucet_amount: "1000".to_string(),
        snapshot_interval_secs: 30,
    };

    fs::create_dir_all(&chih_dir)?;
    fs::write(&config_path, toml::to_string_pretty(&config)?)?;

    println!("Wrote {}", config_path.display());
    println!("  Owner (Rate Authority): {}", keypair.account_id());
    println!();
    println!("Start the daemon with: chih-daemon --config {}", config_path.display());

    Ok(())
}
