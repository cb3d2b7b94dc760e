//! Message API.
//!
//! The single entry point other services use to record user-facing events
//! and that the HTTP layer uses to read them back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use stratus_core::{RequestContext, SharedConfig};
use stratus_storage::{MessageQuery, MessageRecord, MessageStore, NewMessage};

use crate::catalog::EventId;
use crate::error::Result;

/// Facade over a [`MessageStore`].
#[derive(Clone)]
pub struct MessageApi {
    store: Arc<dyn MessageStore>,
    config: SharedConfig,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl MessageApi {
    pub fn new(store: Arc<dyn MessageStore>, config: SharedConfig) -> Self {
        Self::with_clock(store, config, Arc::new(DefaultClock))
    }

    /// Create an API whose expiry times are computed from `clock`.
    pub fn with_clock(
        store: Arc<dyn MessageStore>,
        config: SharedConfig,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Record a user message for `event_id`.
    ///
    /// Failures to persist are logged and dropped: reporting an event must
    /// never fail the operation that triggered it.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        event_id: EventId,
        project_id: &str,
        resource_type: Option<&str>,
        resource_uuid: Option<&str>,
    ) {
        let ttl = self.config.read().message_ttl();
        let message = NewMessage {
            project_id: project_id.to_string(),
            request_id: ctx.request_id.clone(),
            resource_type: resource_type.map(str::to_string),
            resource_uuid: resource_uuid.map(str::to_string),
            event_id: event_id.code().to_string(),
            message_level: event_id.level().as_str().to_string(),
            expires_at: self
                .clock
                .utc()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        match self.store.message_create(ctx, message).await {
            Ok(record) => {
                tracing::debug!(id = %record.id, event_id = %event_id, "Created user message");
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event_id,
                    project_id = %project_id,
                    error = %e,
                    "Failed to create message record"
                );
            }
        }
    }

    /// Record a user message from its wire code.
    ///
    /// Undefined codes are rejected before anything is stored.
    pub async fn create_by_code(
        &self,
        ctx: &RequestContext,
        code: &str,
        project_id: &str,
        resource_type: Option<&str>,
        resource_uuid: Option<&str>,
    ) -> Result<()> {
        let event_id: EventId = code.parse()?;
        self.create(ctx, event_id, project_id, resource_type, resource_uuid)
            .await;
        Ok(())
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<MessageRecord> {
        Ok(self.store.message_get(ctx, id).await?)
    }

    pub async fn get_all(
        &self,
        ctx: &RequestContext,
        query: &MessageQuery,
    ) -> Result<Vec<MessageRecord>> {
        Ok(self.store.message_get_all(ctx, query).await?)
    }

    /// Delete a message. Runs with elevated privileges.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        self.store.message_destroy(&ctx.elevated(), id).await?;
        Ok(())
    }

    /// Remove every expired message, returning how many were deleted.
    pub async fn cleanup_expired(&self, ctx: &RequestContext) -> Result<usize> {
        let removed = self
            .store
            .message_destroy_expired(&ctx.elevated(), self.clock.utc())
            .await?;
        if removed > 0 {
            tracing::info!("Removed {} expired messages", removed);
        }
        Ok(removed)
    }
}
