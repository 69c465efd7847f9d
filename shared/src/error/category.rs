//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category shown to the user instead of the raw error
///
/// Each category carries one short message; the UI picks a toast color per
/// category and never shows the underlying error chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Local field validation (coordinates, schedules, required fields)
    Validation,
    /// Missing or expired session
    Auth,
    /// The caller does not own the listing
    Permission,
    /// The listing vanished
    NotFound,
    /// Rejected image files
    Upload,
    /// Backend answered with an error
    Server,
    /// Transport failure or timeout
    Network,
    /// Anything else (local storage, unknown)
    System,
}

impl ErrorCategory {
    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::NotFound => "not_found",
            Self::Upload => "upload",
            Self::Server => "server",
            Self::Network => "network",
            Self::System => "system",
        }
    }

    /// Short user-facing message for this category
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation => "Datos inválidos. Verifica que todos los campos estén correctos.",
            Self::Auth => "No autorizado. Por favor, inicia sesión nuevamente.",
            Self::Permission => "No tienes permisos para editar este negocio.",
            Self::NotFound => "El negocio no fue encontrado.",
            Self::Upload => "Una o más imágenes no cumplen los requisitos.",
            Self::Server => "Error interno del servidor. Inténtalo más tarde.",
            Self::Network => "No se pudo conectar con el servidor.",
            Self::System => "Ha ocurrido un error inesperado",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::RequiredField
            | ErrorCode::ValueOutOfRange
            | ErrorCode::InvalidCoordinates
            | ErrorCode::InvalidScheduleFormat
            | ErrorCode::ImagesFrozen => ErrorCategory::Validation,

            ErrorCode::NotAuthenticated => ErrorCategory::Auth,

            ErrorCode::PermissionDenied => ErrorCategory::Permission,

            ErrorCode::NotFound | ErrorCode::BusinessNotFound => ErrorCategory::NotFound,

            ErrorCode::FileTooLarge
            | ErrorCode::UnsupportedFileFormat
            | ErrorCode::InvalidImageFile
            | ErrorCode::ImageTooSmall
            | ErrorCode::TooManyImages => ErrorCategory::Upload,

            ErrorCode::InternalError | ErrorCode::InvalidResponse => ErrorCategory::Server,

            ErrorCode::NetworkError | ErrorCode::TimeoutError => ErrorCategory::Network,

            ErrorCode::Success | ErrorCode::Unknown | ErrorCode::StorageError => {
                ErrorCategory::System
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::RequiredField.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::InvalidCoordinates.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::PermissionDenied.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::BusinessNotFound.category(), ErrorCategory::NotFound);
        assert_eq!(ErrorCode::ImageTooSmall.category(), ErrorCategory::Upload);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::Server);
        assert_eq!(ErrorCode::TimeoutError.category(), ErrorCategory::Network);
        assert_eq!(ErrorCode::StorageError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::Validation.name(), "validation");
        assert_eq!(ErrorCategory::NotFound.name(), "not_found");
        assert_eq!(ErrorCategory::Network.name(), "network");
    }

    #[test]
    fn test_user_messages_are_short() {
        for category in [
            ErrorCategory::Validation,
            ErrorCategory::Auth,
            ErrorCategory::Permission,
            ErrorCategory::NotFound,
            ErrorCategory::Upload,
            ErrorCategory::Server,
            ErrorCategory::Network,
            ErrorCategory::System,
        ] {
            let msg = category.user_message();
            assert!(!msg.is_empty());
            assert!(msg.len() < 100, "{} is too long", category.name());
        }
    }
}
