// crates/chih-rpc/src/middleware.rs
//
// Request logging for the RPC server.

use std::time::Duration;

use tonic::{Request, Status};

/// Logging interceptor for incoming tonic requests.
///
/// Method names live in the JSON body, so this only records transport
/// metadata; `log_outcome` records the method once it is known.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    let user_agent = req
        .metadata()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::debug!("Incoming RPC request (user-agent: {})", user_agent);
    Ok(req)
}

/// Log the result of a dispatched call.
pub fn log_outcome<T>(method: &str, result: &Result<T, String>, elapsed: Duration) {
    match result {
        Ok(_) => tracing::info!("RPC {} ok ({} ms)", method, elapsed.as_millis()),
        Err(e) => tracing::warn!("RPC {} failed ({} ms): {}", method, elapsed.as_millis(), e),
    }
}
