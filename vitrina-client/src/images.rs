//! Image file checks run before a submit
//!
//! Mirrors what the edit form enforces: JPG/PNG only, at most 2 MiB, at
//! least 800x600 pixels, one logo and up to five carousel images.

use std::io::Cursor;

use crate::error::{ImageRejection, ValidationError};

/// Allowed file extensions
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Maximum file size (2 MiB)
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

pub const MIN_WIDTH: u32 = 800;
pub const MIN_HEIGHT: u32 = 600;

/// Maximum carousel images per submit
pub const MAX_CAROUSEL_IMAGES: usize = 5;

/// A file picked by the user, held in memory until submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased extension
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Declared content type, or one guessed from the extension
    pub fn mime(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

/// New images staged in an edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBatch {
    pub logo: Option<ImageFile>,
    pub carousel: Vec<ImageFile>,
}

impl ImageBatch {
    pub fn is_empty(&self) -> bool {
        self.logo.is_none() && self.carousel.is_empty()
    }

    pub fn len(&self) -> usize {
        usize::from(self.logo.is_some()) + self.carousel.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageFile> {
        self.logo.iter().chain(self.carousel.iter())
    }
}

/// Outcome of checking one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCheck {
    Ok,
    Rejected { kind: ImageRejection, reason: String },
}

impl ImageCheck {
    fn rejected(kind: ImageRejection, reason: String) -> Self {
        Self::Rejected { kind, reason }
    }
}

/// Check a single file. Decoding the header runs on the blocking pool.
pub async fn validate_image(file: &ImageFile) -> ImageCheck {
    let extension = file.extension().unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return ImageCheck::rejected(
            ImageRejection::UnsupportedFormat,
            format!("Formato no permitido para {}. Solo JPG o PNG", file.file_name),
        );
    }
    if file.bytes.is_empty() {
        return ImageCheck::rejected(
            ImageRejection::Unreadable,
            format!("El archivo {} está vacío", file.file_name),
        );
    }
    if file.bytes.len() > MAX_FILE_SIZE {
        return ImageCheck::rejected(
            ImageRejection::TooLarge,
            format!("El archivo {} supera los 2 MB", file.file_name),
        );
    }

    let bytes = file.bytes.clone();
    let dimensions = tokio::task::spawn_blocking(move || probe_dimensions(&bytes)).await;

    match dimensions {
        Ok(Ok((width, height))) if width >= MIN_WIDTH && height >= MIN_HEIGHT => ImageCheck::Ok,
        Ok(Ok((width, height))) => {
            tracing::debug!(file = %file.file_name, width, height, "Image below minimum size");
            ImageCheck::rejected(
                ImageRejection::TooSmall,
                format!("{} debe tener mínimo {MIN_WIDTH}x{MIN_HEIGHT} píxeles", file.file_name),
            )
        }
        Ok(Err(e)) => {
            tracing::debug!(file = %file.file_name, error = %e, "Image could not be decoded");
            ImageCheck::rejected(
                ImageRejection::Unreadable,
                format!("{} no es una imagen válida", file.file_name),
            )
        }
        Err(e) => {
            tracing::warn!(file = %file.file_name, error = %e, "Image probe task failed");
            ImageCheck::rejected(
                ImageRejection::Unreadable,
                format!("No se pudo validar {}", file.file_name),
            )
        }
    }
}

fn probe_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

/// Check every staged file; the first rejection aborts the submit
pub async fn validate_batch(batch: &ImageBatch) -> Result<(), ValidationError> {
    if batch.carousel.len() > MAX_CAROUSEL_IMAGES {
        return Err(ValidationError::InvalidImage {
            file: "carouselFiles".to_string(),
            kind: ImageRejection::TooMany,
            reason: format!("Máximo {MAX_CAROUSEL_IMAGES} imágenes permitidas en el carrusel"),
        });
    }

    for file in batch.iter() {
        if let ImageCheck::Rejected { kind, reason } = validate_image(file).await {
            return Err(ValidationError::InvalidImage {
                file: file.file_name.clone(),
                kind,
                reason,
            });
        }
    }
    Ok(())
}
