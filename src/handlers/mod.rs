//! Bot handlers module
//!
//! This module contains all WhatsApp bot handlers organized by type:
//! - Command handlers for prefix commands
//! - Callback handlers for reply-button interactions
//! - Message handlers for text and media messages, including the router
//! - The fixed table of user-facing replies

pub mod callbacks;
pub mod commands;
pub mod messages;
pub mod replies;

// Re-export commonly used handler functions
pub use commands::{handle_command, parse_command, CommandGate, CommandSpec, COMMANDS};
pub use messages::{classify, handle_inbound, MessageRoute};
