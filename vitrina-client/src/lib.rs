//! Vitrina Client - owner-side editing of business listings
//!
//! Loads a business, turns loosely-shaped backend payloads into display
//! values, plans a single moderation-aware write per submit and re-reads
//! the record until asynchronously processed photos become visible.

pub mod config;
pub mod error;
pub mod http;
pub mod images;
pub mod normalize;
pub mod planner;
pub mod reconcile;
pub mod service;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ImageRejection, ValidationError};
pub use http::{BusinessGateway, HttpGateway};
pub use images::{ImageBatch, ImageCheck, ImageFile};
pub use normalize::{BusinessView, normalize};
pub use planner::{Advisory, PendingEdit, UpdatePlan, WriteRequest, WriteStrategy, WriteTarget};
pub use reconcile::{ReconcileOutcome, ReconcileWarning, Sleeper, TokioSleeper};
pub use service::{BusinessEditor, LoadedBusiness, SubmitOutcome};
pub use session::{MemorySession, Session, StoredSession};

// Re-export shared types for convenience
pub use shared::models::{BusinessRecord, BusinessUpdate, ModerationStatus};
pub use tokio_util::sync::CancellationToken;
