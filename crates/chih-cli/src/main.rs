// crates/chih-cli/src/main.rs
//
// CLI entrypoint for the Chih staking pool tools.
//
// Provides subcommands for initializing a daemon config, managing the local
// wallet, staking and claiming, viewing pool state, and rate administration.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::admin::AdminCmd;
use commands::stake::StakeCmd;
use commands::vault::{ApproveArgs, BalanceArgs};
use commands::wallet::WalletCmd;
use output::OutputFormat;
use rpc_client::RpcClient;

/// Chih CLI: stake tokens and collect rewards from a chih-daemon pool.
#[derive(Parser, Debug)]
#[command(name = "chih", version = "0.1.0", about = "Chih staking pool CLI")]
struct Cli {
    /// RPC endpoint for the chih-daemon.
    #[arg(long, global = true, default_value = "http://localhost:50061")]
    rpc: String,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Secret key file to sign with (defaults to ~/.chih/keys/account.secret).
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a daemon config owned by a new (or existing) wallet.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },

    /// Wallet management: create, import, export keys.
    #[command(subcommand)]
    Wallet(WalletCmd),

    /// Mint development tokens to the wallet (once per account).
    Faucet,

    /// Allow the pool to pull up to an amount from the wallet.
    Approve(ApproveArgs),

    /// Token and allowance balance of an account.
    Balance(BalanceArgs),

    /// Staking: add, withdraw, claim, exit, info.
    #[command(subcommand)]
    Stake(StakeCmd),

    /// Show pool-wide state: rate, total staked, reward per token.
    Pool,

    /// Rate Authority commands.
    #[command(subcommand)]
    Admin(AdminCmd),

    /// Display daemon health and version info.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);
    let client = RpcClient::new(&cli.rpc);
    let key = cli.key.as_deref();

    match &cli.command {
        Commands::Init { force } => commands::init::run(*force).await?,
        Commands::Wallet(cmd) => commands::wallet::run(cmd).await?,
        Commands::Faucet => commands::vault::faucet(&client, key, format).await?,
        Commands::Approve(args) => commands::vault::approve(&client, key, args, format).await?,
        Commands::Balance(args) => commands::vault::balance(&client, key, args, format).await?,
        Commands::Stake(cmd) => commands::stake::run(cmd, &client, key, format).await?,
        Commands::Pool => commands::pool::run(&client, format).await?,
        Commands::Admin(cmd) => commands::admin::run(cmd, &client, key, format).await?,
        Commands::Status => commands::status::run(&client, &cli.rpc, format).await?,
    }

    Ok(())
}
