// crates/chih-cli/src/commands/status.rs
//
// `chih status`: display daemon health and version info.

use serde_json::json;

use crate::output::{print_result, OutputFormat};
use crate::rpc_client::RpcClient;

/// Run the status command.
pub async fn run(
    client: &RpcClient,
    endpoint: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match client.call("node/health", json!({})).await {
        Ok(result) => print_result(
            format,
            &result,
            &[
                ("status", "Status"),
                ("version", "Version"),
                ("uptime_seconds", "Uptime (s)"),
                ("account_count", "Accounts"),
                ("total_staked", "Total staked"),
                ("custody_balance", "Pool custody"),
                ("event_subscribers", "Event subscribers"),
                ("details", "Details"),
            ],
        ),
        Err(e) => {
            println!("Chih daemon at {} is unreachable: {}", endpoint, e);
        }
    }
    Ok(())
}
