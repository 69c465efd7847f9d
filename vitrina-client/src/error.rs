//! Client error types

use shared::{ErrorCategory, ErrorCode};
use thiserror::Error;

/// Field-level problems detected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Coordinates are not two comma-separated numbers in range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// A schedule half is missing or not `HH:MM - HH:MM` / `Cerrado`
    #[error("Invalid schedule for {field}: {value:?}")]
    InvalidScheduleFormat { field: &'static str, value: String },

    /// A required field is blank
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A field exceeds the form's length limit
    #[error("Field {field} exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// An image file was refused before upload
    #[error("Invalid image {file}: {reason}")]
    InvalidImage {
        file: String,
        kind: ImageRejection,
        reason: String,
    },
}

/// Why an image file was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRejection {
    /// Not a JPG or PNG
    UnsupportedFormat,
    /// Above the upload size limit
    TooLarge,
    /// Below the minimum dimensions
    TooSmall,
    /// Empty or not decodable
    Unreadable,
    /// More carousel files than allowed
    TooMany,
}

impl ImageRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedFormat => ErrorCode::UnsupportedFileFormat,
            Self::TooLarge => ErrorCode::FileTooLarge,
            Self::TooSmall => ErrorCode::ImageTooSmall,
            Self::Unreadable => ErrorCode::InvalidImageFile,
            Self::TooMany => ErrorCode::TooManyImages,
        }
    }
}

impl ValidationError {
    /// The wire name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidCoordinates(_) => "googleMapsCoordinates",
            Self::InvalidScheduleFormat { field, .. } => field,
            Self::MissingRequiredField(field) => field,
            Self::FieldTooLong { field, .. } => field,
            Self::InvalidImage { file, .. } => file,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCoordinates(_) => ErrorCode::InvalidCoordinates,
            Self::InvalidScheduleFormat { .. } => ErrorCode::InvalidScheduleFormat,
            Self::MissingRequiredField(_) => ErrorCode::RequiredField,
            Self::FieldTooLong { .. } => ErrorCode::ValueOutOfRange,
            Self::InvalidImage { kind, .. } => kind.code(),
        }
    }
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local validation failed; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authentication required (401 or no token)
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied (not the owner)
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status, with the server's message
    #[error("Server rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session storage failed
    #[error("Session error: {0}")]
    Session(#[from] std::io::Error),
}

impl ClientError {
    /// Map to the shared error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(e) => e.code(),
            Self::Unauthorized => ErrorCode::NotAuthenticated,
            Self::Forbidden(_) => ErrorCode::PermissionDenied,
            Self::NotFound(_) => ErrorCode::BusinessNotFound,
            Self::ServerRejected { status, .. } => match ErrorCode::from_http_status(*status) {
                ErrorCode::Unknown => ErrorCode::InternalError,
                code => code,
            },
            Self::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InvalidResponse,
            Self::Session(_) => ErrorCode::StorageError,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Short message for the UI; never the raw error chain
    pub fn user_message(&self) -> &'static str {
        self.category().user_message()
    }

    /// Only transport failures and 5xx answers are worth repeating a read for
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::ServerRejected { status, .. } => *status >= 500,
            Self::InvalidResponse(_) | Self::Serialization(_) => true,
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
