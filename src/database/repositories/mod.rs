//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod ai_request;
pub mod file_processing;
pub mod group;
pub mod message;
pub mod stats;
pub mod user;

pub use ai_request::AiRequestRepository;
pub use file_processing::FileProcessingRepository;
pub use group::GroupRepository;
pub use message::MessageRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;
