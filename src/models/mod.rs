//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod ai_request;
pub mod file_processing;
pub mod group;
pub mod message;
pub mod stats;
pub mod user;

// Re-export commonly used models
pub use ai_request::{AiRequest, AiRequestType, CreateAiRequestLog, PROMPT_CAP, RESPONSE_CAP};
pub use file_processing::{CreateFileProcessingLog, FileProcessingRecord};
pub use group::{CreateGroupRequest, Group};
pub use message::{CreateMessageRequest, MessageRecord};
pub use stats::{BotStat, CommandCount, DailyCount, TypeCount, UserStats};
pub use user::{CreateUserRequest, UpdateUserRequest, User};
