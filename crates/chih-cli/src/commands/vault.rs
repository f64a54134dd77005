// crates/chih-cli/src/commands/vault.rs
//
// `chih faucet`, `chih approve`, `chih balance`: token-side commands.

use clap::Args;

use chih_rpc::handlers::vault::{METHOD_APPROVE, METHOD_FAUCET};

use super::wallet::load_keypair;
use crate::output::{print_result, OutputFormat};
use crate::rpc_client::RpcClient;

const BALANCE_FIELDS: &[(&str, &str)] = &[
    ("account", "Account"),
    ("symbol", "Symbol"),
    ("balance", "Balance"),
    ("allowance", "Pool allowance"),
];

#[derive(Debug, Args)]
pub struct ApproveArgs {
    /// Token amount, e.g. "250" or "0.5".
    pub amount: String,
}

#[derive(Debug, Args)]
pub struct BalanceArgs {
    /// Hex account id (defaults to the wallet's account).
    #[arg(long)]
    pub account: Option<String>,
}

pub async fn faucet(
    client: &RpcClient,
    key: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(key)?;
    let result = client.signed_call(&keypair, METHOD_FAUCET, None).await?;
    print_result(format, &result, BALANCE_FIELDS);
    Ok(())
}

pub async fn approve(
    client: &RpcClient,
    key: Option<&str>,
    args: &ApproveArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(key)?;
    let result = client
        .signed_call(&keypair, METHOD_APPROVE, Some(("amount", args.amount.as_str())))
        .await?;
    print_result(format, &result, BALANCE_FIELDS);
    Ok(())
}

pub async fn balance(
    client: &RpcClient,
    key: Option<&str>,
    args: &BalanceArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let account = match &args.account {
        Some(a) => a.clone(),
        None => load_keypair(key)?.account_id().to_hex(),
    };
    let result = client.account_query("vault/balance", &account).await?;
    print_result(format, &result, BALANCE_FIELDS);
    Ok(())
}
