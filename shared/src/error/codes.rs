//! Error codes for the business directory client
//!
//! Numbering by range: 0xxx general, 1xxx session, 2xxx ownership,
//! 6xxx listing fields, 65xx image files, 9xxx transport and local storage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric code attached to every client error
///
/// Travels as a bare `u16` so a UI written in another language can map it
/// without sharing this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // 0xxx
    Success = 0,
    Unknown = 1,
    /// Backend refused the payload (400/422)
    ValidationFailed = 2,
    NotFound = 3,
    /// Blank value for a mandatory field
    RequiredField = 7,
    /// Value longer than the form allows
    ValueOutOfRange = 8,

    // 1xxx
    NotAuthenticated = 1001,

    // 2xxx
    /// The session does not own the listing
    PermissionDenied = 2001,

    // 6xxx
    BusinessNotFound = 6001,
    InvalidCoordinates = 6002,
    /// Half-week hours are not `HH:MM - HH:MM` or `Cerrado`
    InvalidScheduleFormat = 6003,
    /// Image change dropped on an already reviewed listing
    ImagesFrozen = 6004,

    // 65xx
    FileTooLarge = 6501,
    UnsupportedFileFormat = 6502,
    /// Empty or undecodable image
    InvalidImageFile = 6503,
    ImageTooSmall = 6504,
    TooManyImages = 6505,

    // 9xxx
    InternalError = 9001,
    NetworkError = 9003,
    TimeoutError = 9004,
    /// Body could not be decoded
    InvalidResponse = 9006,
    /// Session file could not be read or written
    StorageError = 9401,
}

impl ErrorCode {
    const ALL: [ErrorCode; 22] = [
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::NotAuthenticated,
        ErrorCode::PermissionDenied,
        ErrorCode::BusinessNotFound,
        ErrorCode::InvalidCoordinates,
        ErrorCode::InvalidScheduleFormat,
        ErrorCode::ImagesFrozen,
        ErrorCode::FileTooLarge,
        ErrorCode::UnsupportedFileFormat,
        ErrorCode::InvalidImageFile,
        ErrorCode::ImageTooSmall,
        ErrorCode::TooManyImages,
        ErrorCode::InternalError,
        ErrorCode::NetworkError,
        ErrorCode::TimeoutError,
        ErrorCode::InvalidResponse,
        ErrorCode::StorageError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Closest code for an HTTP status answered by the backend
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => ErrorCode::Success,
            400 | 422 => ErrorCode::ValidationFailed,
            401 => ErrorCode::NotAuthenticated,
            403 => ErrorCode::PermissionDenied,
            404 => ErrorCode::NotFound,
            408 | 504 => ErrorCode::TimeoutError,
            500..=599 => ErrorCode::InternalError,
            _ => ErrorCode::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not one of the [`ErrorCode`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}
