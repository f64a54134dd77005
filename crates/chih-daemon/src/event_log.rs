// crates/chih-daemon/src/event_log.rs
//
// Pool event logger.
//
// Subscribes to the ledger's broadcast channel and writes every committed
// event to the tracing log as structured JSON.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use chih_ledger::PoolEvent;

/// Log events until the channel closes.
pub async fn run_event_logger(mut rx: broadcast::Receiver<PoolEvent>) {
    tracing::info!("Pool event logger started");
    loop {
        match rx.recv().await {
            Ok(event) => log_event(&event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Event logger lagged; {} events not logged", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    tracing::info!("Pool event logger stopped");
}

fn log_event(event: &PoolEvent) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!("PoolEvent {}: {}", event.name(), json),
        Err(e) => tracing::warn!("PoolEvent {} (unserializable: {})", event.name(), e),
    }
}
