// crates/chih-cli/src/commands/stake.rs
//
// `chih stake {add, withdraw, claim, exit, info}`: staking commands.
//
// `add` pulls tokens through the pool's allowance, so run `chih approve`
// first.

use clap::Subcommand;

use chih_rpc::handlers::staking::{METHOD_CLAIM, METHOD_EXIT, METHOD_STAKE, METHOD_WITHDRAW};

use super::wallet::load_keypair;
use crate::output::{print_result, OutputFormat};
use crate::rpc_client::RpcClient;

const POSITION_FIELDS: &[(&str, &str)] = &[
    ("account", "Account"),
    ("staked", "Staked"),
    ("earned", "Earned"),
    ("total_staked", "Pool total"),
];

/// Staking subcommands.
#[derive(Debug, Subcommand)]
pub enum StakeCmd {
    /// Deposit tokens into the pool.
    Add {
        /// Token amount, e.g. "100" or "2.5".
        amount: String,
    },
    /// Take staked tokens back out of the pool.
    Withdraw {
        /// Token amount.
        amount: String,
    },
    /// Collect all accrued rewards.
    Claim,
    /// Withdraw the whole stake and collect all rewards.
    Exit,
    /// Show an account's position.
    Info {
        /// Hex account id (defaults to the wallet's account).
        #[arg(long)]
        account: Option<String>,
    },
}

/// Run the stake subcommand.
pub async fn run(
    cmd: &StakeCmd,
    client: &RpcClient,
    key: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        StakeCmd::Add { amount } => {
            let keypair = load_keypair(key)?;
            let result = client
                .signed_call(&keypair, METHOD_STAKE, Some(("amount", amount.as_str())))
                .await?;
            print_result(format, &result, POSITION_FIELDS);
        }
        StakeCmd::Withdraw { amount } => {
            let keypair = load_keypair(key)?;
            let result = client
                .signed_call(&keypair, METHOD_WITHDRAW, Some(("amount", amount.as_str())))
                .await?;
            print_result(format, &result, POSITION_FIELDS);
        }
        StakeCmd::Claim => {
            let keypair = load_keypair(key)?;
            let result = client.signed_call(&keypair, METHOD_CLAIM, None).await?;
            print_result(
                format,
                &result,
                &[("account", "Account"), ("reward_paid", "Reward paid")],
            );
        }
        StakeCmd::Exit => {
            let keypair = load_keypair(key)?;
            let result = client.signed_call(&keypair, METHOD_EXIT, None).await?;
            print_result(
                format,
                &result,
                &[
                    ("account", "Account"),
                    ("withdrawn", "Withdrawn"),
                    ("reward_paid", "Reward paid"),
                ],
            );
        }
        StakeCmd::Info { account } => {
            let account = match account {
                Some(a) => a.clone(),
                None => load_keypair(key)?.account_id().to_hex(),
            };
            let result = client.account_query("pool/account", &account).await?;
            print_result(
                format,
                &result,
                &[
                    ("account", "Account"),
                    ("exists", "Known to pool"),
                    ("staked", "Staked"),
                    ("rewards_settled", "Settled rewards"),
                    ("earned", "Earned (claimable)"),
                    ("pool_share_percent", "Pool share %"),
                ],
            );
        }
    }

    Ok(())
}
