//! Periodic removal of expired messages.

use std::sync::Arc;
use std::time::Duration;

use stratus_core::RequestContext;
use stratus_messages::MessageApi;
use tokio::task::JoinHandle;

/// Spawn the reaper loop. An interval of zero disables it.
pub fn spawn(api: Arc<MessageApi>, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("Expired message reaper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            reap_once(&api).await;
        }
    }))
}

/// Run a single cleanup pass, logging failures.
pub async fn reap_once(api: &MessageApi) -> usize {
    match api.cleanup_expired(&RequestContext::internal_admin()).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Failed to clean up expired messages: {}", e);
            0
        }
    }
}
