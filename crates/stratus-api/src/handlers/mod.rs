//! API handlers organized by domain.

pub mod common;
pub mod messages;

pub use messages::{
    delete_message_handler, get_message_handler, list_messages_handler, messages_router,
};
