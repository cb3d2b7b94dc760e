//! API data models.

pub mod error;
pub mod message;

pub use error::ErrorResponse;
pub use message::{Link, LinkBuilder, MessageDetail, MessageIndex, MessageView};
