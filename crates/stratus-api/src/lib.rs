//! HTTP API for Stratus user messages.
//!
//! Routes live under `/v3` and are gated by the `OpenStack-API-Version`
//! request header; see [`version`].

pub mod context;
pub mod handlers;
pub mod models;
pub mod server;
pub mod version;

pub use server::{create_router, run, AppState};
