//! User message system for Stratus.
//!
//! Messages tell end users why an asynchronous volume operation failed.
//! Services report an [`EventId`] through [`MessageApi::create`]; the text
//! shown to users comes from the static [`catalog`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use stratus_core::{RequestContext, StratusConfig};
//! use stratus_messages::{EventId, MessageApi};
//! use stratus_storage::MemoryMessageStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = MessageApi::new(
//!         Arc::new(MemoryMessageStore::new()),
//!         StratusConfig::default().shared(),
//!     );
//!     let ctx = RequestContext::new("user", "project", false);
//!
//!     api.create(&ctx, EventId::UnableToAllocate, "project", Some("VOLUME"), None)
//!         .await;
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod error;

pub use api::MessageApi;
pub use catalog::{EventId, MessageLevel};
pub use error::{Error, Result};
