//! Storage layer for user messages.
//!
//! ## Backends
//!
//! | Backend | Type | Use |
//! |---------|------|-----|
//! | memory | [`MemoryMessageStore`] | tests, ephemeral deployments |
//! | redb | [`RedbMessageStore`] | persistent single-node storage |
//!
//! Both backends route listings through [`query::apply`], so filtering,
//! sorting and marker pagination behave the same everywhere.

pub mod error;
pub mod memory;
pub mod messages;
pub mod query;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use memory::MemoryMessageStore;
pub use messages::RedbMessageStore;
pub use query::{MessageQuery, SortDir};
pub use record::{MessageRecord, NewMessage};
pub use store::MessageStore;
