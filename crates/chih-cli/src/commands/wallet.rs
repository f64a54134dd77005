// crates/chih-cli/src/commands/wallet.rs
//
// `chih wallet {create, import, export}`: key management commands.
//
// The wallet is a single hex-encoded ed25519 secret. Its account id (the
// SHA-256 of the public key) is what the pool knows the holder by.

use chih_core::crypto::Keypair;
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

const SECRET_FILE: &str = "account.secret";
const PUBLIC_FILE: &str = "account.pub";

/// Wallet management subcommands.
#[derive(Debug, Subcommand)]
pub enum WalletCmd {
    /// Generate a new ed25519 keypair.
    Create {
        /// Replace an existing wallet.
        #[arg(long)]
        force: bool,
    },
    /// Import a keypair from a file.
    Import {
        /// Path to the secret key file (hex-encoded).
        #[arg(long)]
        path: String,
    },
    /// Print the public key and account id.
    Export,
}

/// Run the wallet subcommand.
pub async fn run(cmd: &WalletCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        WalletCmd::Create { force } => {
            create_wallet(*force)?;
            Ok(())
        }
        WalletCmd::Import { path } => import_wallet(path),
        WalletCmd::Export => export_wallet(),
    }
}

/// Generate and save a wallet, refusing to clobber one unless `force`.
pub fn create_wallet(force: bool) -> Result<Keypair, Box<dyn std::error::Error>> {
    let keys_dir = get_keys_dir()?;
    let secret_path = keys_dir.join(SECRET_FILE);
    if secret_path.exists() && !force {
        return Err(format!(
            "Wallet already exists at {} (use --force to replace it)",
            secret_path.display()
        )
        .into());
    }

    let keypair = Keypair::generate();
    save_keypair(&keys_dir, &keypair)?;

    println!("Wallet created successfully.");
    println!("  Account:    {}", keypair.account_id());
    println!("  Public key: {}", hex::encode(keypair.public_key_bytes()));
    println!();
    println!("IMPORTANT: Back up your secret key file securely.");
    println!("  Secret key: {}", secret_path.display());

    Ok(keypair)
}

fn import_wallet(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let keypair = Keypair::from_secret_hex(contents.trim())?;

    let keys_dir = get_keys_dir()?;
    save_keypair(&keys_dir, &keypair)?;

    println!("Imported secret key from: {}", path);
    println!("  Account: {}", keypair.account_id());

    Ok(())
}

fn export_wallet() -> Result<(), Box<dyn std::error::Error>> {
    match load_keypair(None) {
        Ok(keypair) => {
            println!("Account:    {}", keypair.account_id());
            println!("Public key: {}", hex::encode(keypair.public_key_bytes()));
        }
        Err(_) => println!("No wallet found. Run `chih wallet create` first."),
    }
    Ok(())
}

/// Load the signing key from `path`, or from the default wallet location.
pub fn load_keypair(path: Option<&str>) -> Result<Keypair, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => PathBuf::from(p),
        None => get_keys_dir()?.join(SECRET_FILE),
    };
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read key {}: {}", path.display(), e))?;
    Ok(Keypair::from_secret_hex(contents.trim())?)
}

fn save_keypair(keys_dir: &Path, keypair: &Keypair) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(keys_dir)?;
    fs::write(keys_dir.join(SECRET_FILE), hex::encode(keypair.secret_bytes()))?;
    fs::write(
        keys_dir.join(PUBLIC_FILE),
        hex::encode(keypair.public_key_bytes()),
    )?;
    Ok(())
}

fn get_keys_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("Could not determine home directory")?;
    Ok(home.join(".chih").join("keys"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_keypair_from_explicit_path() {
        let dir = std::env::temp_dir().join(format!("chih-cli-wallet-{}", std::process::id()));
        let keypair = Keypair::generate();
        save_keypair(&dir, &keypair).unwrap();

        let path = dir.join(SECRET_FILE);
        let loaded = load_keypair(path.to_str()).unwrap();
        assert_eq!(loaded.account_id(), keypair.account_id());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_keypair_missing_file() {
        assert!(load_keypair(Some("/nonexistent/chih/account.secret")).is_err());
    }
}
