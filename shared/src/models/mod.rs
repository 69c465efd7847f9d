//! Data models
//!
//! Wire types exchanged with the directory backend (camelCase JSON).

pub mod business;
pub mod update;

// Re-exports
pub use business::*;
pub use update::*;
