// crates/chih-cli/src/commands/pool.rs
//
// `chih pool`: display pool-wide state.

use serde_json::json;

use crate::output::{print_result, OutputFormat};
use crate::rpc_client::RpcClient;

/// Run the pool command.
pub async fn run(client: &RpcClient, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result = client.call("pool/info", json!({})).await?;
    print_result(
        format,
        &result,
        &[
            ("owner", "Rate Authority"),
            ("emission", "Emission mode"),
            ("reward_rate", "Reward rate (/s)"),
            ("total_staked", "Total staked"),
            ("reward_per_token", "Reward per token"),
            ("last_update_time", "Last update"),
            ("account_count", "Accounts"),
            ("annual_reward_per_token", "Annual reward per token"),
            ("apr_percent", "APR %"),
        ],
    );
    Ok(())
}
