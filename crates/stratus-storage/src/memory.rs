//! In-memory message store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use stratus_core::RequestContext;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::query::{self, MessageQuery};
use crate::record::{MessageRecord, NewMessage};
use crate::store::{visible, MessageStore};

/// Message store backed by a `Vec` kept in insertion order.
#[derive(Clone)]
pub struct MemoryMessageStore {
    messages: Arc<RwLock<Vec<MessageRecord>>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create a store that stamps `created_at` from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    /// Number of stored messages across all projects.
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn message_create(
        &self,
        _ctx: &RequestContext,
        message: NewMessage,
    ) -> Result<MessageRecord> {
        let record = message.into_record(uuid::Uuid::new_v4().to_string(), self.clock.utc());
        self.messages.write().await.push(record.clone());
        Ok(record)
    }

    async fn message_get(&self, ctx: &RequestContext, id: &str) -> Result<MessageRecord> {
        self.messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id && visible(ctx, m))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Message {}", id)))
    }

    async fn message_get_all(
        &self,
        ctx: &RequestContext,
        query: &MessageQuery,
    ) -> Result<Vec<MessageRecord>> {
        let scoped: Vec<MessageRecord> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| visible(ctx, m))
            .cloned()
            .collect();
        query::apply(scoped, query)
    }

    async fn message_destroy(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        let mut messages = self.messages.write().await;
        let pos = messages
            .iter()
            .position(|m| m.id == id && visible(ctx, m))
            .ok_or_else(|| Error::NotFound(format!("Message {}", id)))?;
        messages.remove(pos);
        Ok(())
    }

    async fn message_destroy_expired(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| !(visible(ctx, m) && m.is_expired(now)));
        Ok(before - messages.len())
    }
}
