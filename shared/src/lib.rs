//! Shared types for the business directory client
//!
//! Wire models exchanged with the directory backend, the response envelope,
//! and the error code system used to build user-facing messages.

pub mod error;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorCode};
pub use models::{BusinessRecord, BusinessUpdate, ModerationStatus};
pub use response::{ApiResponse, Page};
