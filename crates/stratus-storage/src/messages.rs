//! Persistent message storage using redb.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use stratus_core::RequestContext;

use crate::error::{Error, Result};
use crate::query::{self, MessageQuery};
use crate::record::{MessageRecord, NewMessage};
use crate::store::{visible, MessageStore};

// Messages table: key = message_id, value = StoredMessage (serialized as JSON)
const MESSAGES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("messages");

// Metadata table: holds the insertion sequence counter
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("messages_meta");

const NEXT_SEQ_KEY: &str = "next_seq";

/// On-disk representation. `seq` preserves insertion order, which redb's
/// key order (by ID) would otherwise lose.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMessage {
    seq: u64,
    #[serde(flatten)]
    record: MessageRecord,
}

/// Message store backed by a redb database file.
#[derive(Clone)]
pub struct RedbMessageStore {
    db: Arc<Database>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl RedbMessageStore {
    /// Open (or create) `messages.redb` under the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(DefaultClock))
    }

    /// Open with a custom clock for `created_at` stamps.
    pub fn open_with_clock<P: AsRef<Path>>(
        path: P,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let db_path = path.join("messages.redb");
        let db = Database::create(&db_path)
            .map_err(|e| Error::Storage(format!("Failed to open message database: {}", e)))?;

        // Create tables up front so read transactions never miss them
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(MESSAGES_TABLE)?;
            write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;

        tracing::debug!("Opened message store at {}", db_path.display());
        Ok(Self {
            db: Arc::new(db),
            clock,
        })
    }

    fn insert(&self, record: &MessageRecord) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut meta = write_txn.open_table(META_TABLE)?;
            let seq = meta.get(NEXT_SEQ_KEY)?.map(|v| v.value()).unwrap_or(0);
            meta.insert(NEXT_SEQ_KEY, seq + 1)?;

            let json = serde_json::to_string(&StoredMessage {
                seq,
                record: record.clone(),
            })?;
            let mut messages = write_txn.open_table(MESSAGES_TABLE)?;
            messages.insert(record.id.as_str(), json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Option<MessageRecord>> {
        let read_txn = self.db.begin_read()?;
        let messages = read_txn.open_table(MESSAGES_TABLE)?;
        match messages.get(id)? {
            Some(value) => {
                let stored: StoredMessage = serde_json::from_str(value.value())?;
                Ok(Some(stored.record))
            }
            None => Ok(None),
        }
    }

    /// All messages in insertion order.
    fn list(&self) -> Result<Vec<MessageRecord>> {
        let read_txn = self.db.begin_read()?;
        let messages = read_txn.open_table(MESSAGES_TABLE)?;

        let mut stored = Vec::new();
        for entry in messages.iter()? {
            let (_id, value) = entry?;
            stored.push(serde_json::from_str::<StoredMessage>(value.value())?);
        }
        stored.sort_by_key(|m| m.seq);

        Ok(stored.into_iter().map(|m| m.record).collect())
    }

    fn remove(&self, ids: &[String]) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        let mut removed = 0;
        {
            let mut messages = write_txn.open_table(MESSAGES_TABLE)?;
            for id in ids {
                if messages.remove(id.as_str())?.is_some() {
                    removed += 1;
                }
            }
        }
        write_txn.commit()?;
        Ok(removed)
    }
}

#[async_trait]
impl MessageStore for RedbMessageStore {
    async fn message_create(
        &self,
        _ctx: &RequestContext,
        message: NewMessage,
    ) -> Result<MessageRecord> {
        let record = message.into_record(uuid::Uuid::new_v4().to_string(), self.clock.utc());
        self.insert(&record)?;
        Ok(record)
    }

    async fn message_get(&self, ctx: &RequestContext, id: &str) -> Result<MessageRecord> {
        self.find(id)?
            .filter(|m| visible(ctx, m))
            .ok_or_else(|| Error::NotFound(format!("Message {}", id)))
    }

    async fn message_get_all(
        &self,
        ctx: &RequestContext,
        query: &MessageQuery,
    ) -> Result<Vec<MessageRecord>> {
        let scoped = self
            .list()?
            .into_iter()
            .filter(|m| visible(ctx, m))
            .collect();
        query::apply(scoped, query)
    }

    async fn message_destroy(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        // Scope check first so other projects' messages read as missing
        self.message_get(ctx, id).await?;
        if self.remove(&[id.to_string()])? == 0 {
            return Err(Error::NotFound(format!("Message {}", id)));
        }
        Ok(())
    }

    async fn message_destroy_expired(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let expired: Vec<String> = self
            .list()?
            .into_iter()
            .filter(|m| visible(ctx, m) && m.is_expired(now))
            .map(|m| m.id)
            .collect();
        if expired.is_empty() {
            return Ok(0);
        }
        self.remove(&expired)
    }
}
