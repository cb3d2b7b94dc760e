//! Message persistence interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stratus_core::RequestContext;

use crate::error::Result;
use crate::query::MessageQuery;
use crate::record::{MessageRecord, NewMessage};

/// Persistence facade for user messages.
///
/// Non-admin contexts only see messages belonging to their own project;
/// records outside that scope behave as if they did not exist.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message, assigning its ID and creation time.
    async fn message_create(
        &self,
        ctx: &RequestContext,
        message: NewMessage,
    ) -> Result<MessageRecord>;

    /// Fetch one message.
    async fn message_get(&self, ctx: &RequestContext, id: &str) -> Result<MessageRecord>;

    /// List messages visible to `ctx`.
    async fn message_get_all(
        &self,
        ctx: &RequestContext,
        query: &MessageQuery,
    ) -> Result<Vec<MessageRecord>>;

    /// Remove one message.
    async fn message_destroy(&self, ctx: &RequestContext, id: &str) -> Result<()>;

    /// Remove every visible message whose expiry is at or before `now`.
    async fn message_destroy_expired(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<usize>;
}

/// Whether `record` is in scope for `ctx`.
pub(crate) fn visible(ctx: &RequestContext, record: &MessageRecord) -> bool {
    ctx.can_access_project(&record.project_id)
}
