// crates/chih-cli/src/commands/admin.rs
//
// `chih admin {set-rate, transfer-ownership, fund}`: Rate Authority commands.
// The daemon rejects these unless the wallet is the pool owner (fund is
// open to anyone).

use clap::Subcommand;

use chih_rpc::handlers::admin::{
    METHOD_FUND_REWARDS, METHOD_SET_REWARD_RATE, METHOD_TRANSFER_OWNERSHIP,
};

use super::wallet::load_keypair;
use crate::output::{print_result, OutputFormat};
use crate::rpc_client::RpcClient;

/// Admin subcommands.
#[derive(Debug, Subcommand)]
pub enum AdminCmd {
    /// Change the emission rate (tokens per second).
    SetRate {
        /// New rate, e.g. "0.5".
        rate: String,
    },
    /// Hand the Rate Authority to another account.
    TransferOwnership {
        /// Hex account id of the new owner.
        new_owner: String,
    },
    /// Move tokens from the wallet into the reward reserve.
    Fund {
        /// Token amount.
        amount: String,
    },
}

/// Run the admin subcommand.
pub async fn run(
    cmd: &AdminCmd,
    client: &RpcClient,
    key: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(key)?;

    match cmd {
        AdminCmd::SetRate { rate } => {
            let result = client
                .signed_call(&keypair, METHOD_SET_REWARD_RATE, Some(("rate", rate.as_str())))
                .await?;
            print_result(
                format,
                &result,
                &[("old_rate", "Old rate"), ("new_rate", "New rate")],
            );
        }
        AdminCmd::TransferOwnership { new_owner } => {
            let result = client
                .signed_call(
                    &keypair,
                    METHOD_TRANSFER_OWNERSHIP,
                    Some(("new_owner", new_owner.as_str())),
                )
                .await?;
            print_result(
                format,
                &result,
                &[("previous_owner", "Previous owner"), ("new_owner", "New owner")],
            );
        }
        AdminCmd::Fund { amount } => {
            let result = client
                .signed_call(&keypair, METHOD_FUND_REWARDS, Some(("amount", amount.as_str())))
                .await?;
            print_result(format, &result, &[("funder", "Funder"), ("amount", "Amount")]);
        }
    }

    Ok(())
}
