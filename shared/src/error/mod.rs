//! Unified error codes for the business directory client
//!
//! [`ErrorCode`] gives every failure a stable number; [`ErrorCategory`]
//! groups codes and carries the short message shown to the user.
//!
//! # Example
//!
//! ```
//! use shared::error::{ErrorCategory, ErrorCode};
//!
//! let code = ErrorCode::InvalidCoordinates;
//! assert_eq!(code.category(), ErrorCategory::Validation);
//! assert_eq!(ErrorCode::from_http_status(404), ErrorCode::NotFound);
//! ```

mod category;
mod codes;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
