//! Update planner
//!
//! Decides, per submit, which write goes out and what it carries:
//!
//! | status                           | new images | write                                   |
//! |----------------------------------|------------|-----------------------------------------|
//! | REJECTED                         | yes        | multipart, rejected-update endpoint      |
//! | REJECTED                         | no         | JSON, rejected-update endpoint           |
//! | PENDING / VALIDATED / APPROVED   | yes        | JSON, images stripped, advisory emitted  |
//! | PENDING / VALIDATED / APPROVED   | no         | JSON                                     |
//!
//! Field cleaning and validation happen before anything is planned; a
//! validation error means no write at all.

use serde::Serialize;
use shared::ErrorCode;
use shared::models::{BusinessRecord, BusinessUpdate, DeliveryService, ModerationStatus, SalePlace};

use crate::error::ValidationError;
use crate::images::ImageBatch;
use crate::normalize::contact::{digits_only, split_phone_number};
use crate::normalize::location;
use crate::normalize::schedule::{self, combine_halves, normalize_hours};

const MAX_NAME: usize = 100;
const MAX_DESCRIPTION: usize = 200;
const MAX_ADDRESS: usize = 100;
const MAX_SECTOR: usize = 50;
const MAX_LINK: usize = 100;
const MAX_EMAIL: usize = 100;
const MAX_SUPPORT_DETAILS: usize = 200;

/// Client-side staging of an edit
///
/// `None` means "not touched"; a blank string means the user cleared the
/// field, which is treated the same way for optional fields.
#[derive(Debug, Clone, Default)]
pub struct PendingEdit {
    pub category_id: Option<String>,
    pub commercial_name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub parish_community_sector: Option<String>,
    pub email: Option<String>,
    pub phone_country_code: Option<String>,
    pub phone_number: Option<String>,
    pub whatsapp_country_code: Option<String>,
    pub whatsapp_number: Option<String>,
    pub accepts_whatsapp_orders: Option<bool>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub website: Option<String>,
    pub google_maps_coordinates: Option<String>,
    /// Monday-Friday hours, `HH:MM - HH:MM` or `Cerrado`
    pub weekday_schedule: Option<String>,
    /// Saturday-Sunday hours, `HH:MM - HH:MM` or `Cerrado`
    pub weekend_schedule: Option<String>,
    pub delivery_service: Option<DeliveryService>,
    pub sale_place: Option<SalePlace>,
    pub received_udel_support: Option<bool>,
    pub udel_support_details: Option<String>,
    pub images: ImageBatch,
}

impl PendingEdit {
    /// Pre-fill an edit form from the current record
    pub fn from_record(record: &BusinessRecord) -> Self {
        let phone = record.phone.as_deref().map(split_phone_number);
        let whatsapp = record.whatsapp_number.as_deref().map(split_phone_number);
        let halves = record.schedules.as_str().and_then(schedule::split_halves);

        Self {
            category_id: record.category.as_ref().and_then(|c| c.id.clone()),
            commercial_name: Some(record.commercial_name.clone()),
            description: record.description.clone(),
            address: record.address.clone(),
            parish_community_sector: record.parish_community_sector.clone(),
            email: record.email.clone(),
            phone_country_code: phone.as_ref().map(|p| p.country_code.clone()),
            phone_number: phone.map(|p| p.local_number),
            whatsapp_country_code: whatsapp.as_ref().map(|p| p.country_code.clone()),
            whatsapp_number: whatsapp.map(|p| p.local_number),
            accepts_whatsapp_orders: record.accepts_whatsapp_orders,
            facebook: record.facebook.clone(),
            instagram: record.instagram.clone(),
            tiktok: record.tiktok.clone(),
            website: record.website.clone(),
            google_maps_coordinates: record.google_maps_coordinates.clone(),
            weekday_schedule: halves.as_ref().map(|(weekday, _)| weekday.clone()),
            weekend_schedule: halves.map(|(_, weekend)| weekend),
            delivery_service: record.delivery_service,
            sale_place: record.sale_place,
            received_udel_support: record.received_udel_support,
            udel_support_details: record.udel_support_details.clone(),
            images: ImageBatch::default(),
        }
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Which endpoint family receives the write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteTarget {
    /// Regular partial update
    Standard,
    /// Correction of a rejected listing; sends it back to review
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStrategy {
    Json,
    Multipart,
}

/// The single write a submit issues
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    Json {
        target: WriteTarget,
        update: BusinessUpdate,
    },
    Multipart {
        target: WriteTarget,
        update: BusinessUpdate,
        images: ImageBatch,
    },
}

impl WriteRequest {
    pub fn strategy(&self) -> WriteStrategy {
        match self {
            Self::Json { .. } => WriteStrategy::Json,
            Self::Multipart { .. } => WriteStrategy::Multipart,
        }
    }

    pub fn target(&self) -> WriteTarget {
        match self {
            Self::Json { target, .. } | Self::Multipart { target, .. } => *target,
        }
    }

    pub fn update(&self) -> &BusinessUpdate {
        match self {
            Self::Json { update, .. } | Self::Multipart { update, .. } => update,
        }
    }

    pub fn carries_images(&self) -> bool {
        matches!(self, Self::Multipart { images, .. } if !images.is_empty())
    }
}

/// Non-fatal notices for the user; the write (if any) still proceeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Images were dropped because the listing has already been reviewed
    ImagesFrozen {
        status: ModerationStatus,
        dropped: usize,
    },
    /// A rejected listing was corrected and goes back to review
    ResubmittedForReview,
    /// Nothing to send
    NoChanges,
}

impl Advisory {
    /// Error code for advisories that stand for a refused part of the edit
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::ImagesFrozen { .. } => Some(ErrorCode::ImagesFrozen),
            Self::ResubmittedForReview | Self::NoChanges => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ImagesFrozen { .. } => {
                "Las imágenes no se pueden cambiar en un negocio ya revisado. Se guardaron solo los datos de texto."
            }
            Self::ResubmittedForReview => {
                "Tu negocio se ha actualizado. Será revisado nuevamente para validación."
            }
            Self::NoChanges => "No hay cambios para guardar",
        }
    }
}

/// Result of planning a submit
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    /// `None` when there is nothing to send
    pub write: Option<WriteRequest>,
    pub advisories: Vec<Advisory>,
}

/// Select a write strategy and shape its payload
pub fn plan_update(status: ModerationStatus, edit: PendingEdit) -> Result<UpdatePlan, ValidationError> {
    let update = clean_fields(&edit)?;
    let mut advisories = Vec::new();

    let (target, images) = if status.allows_image_replacement() {
        (WriteTarget::Rejected, edit.images)
    } else {
        if edit.has_images() {
            let dropped = edit.images.len();
            tracing::warn!(%status, dropped, "Listing already reviewed, stripping image changes");
            advisories.push(Advisory::ImagesFrozen { status, dropped });
        }
        (WriteTarget::Standard, ImageBatch::default())
    };

    if update.is_empty() && images.is_empty() {
        advisories.push(Advisory::NoChanges);
        return Ok(UpdatePlan {
            write: None,
            advisories,
        });
    }

    if target == WriteTarget::Rejected {
        advisories.push(Advisory::ResubmittedForReview);
    }

    let write = if images.is_empty() {
        WriteRequest::Json { target, update }
    } else {
        WriteRequest::Multipart {
            target,
            update,
            images,
        }
    };
    tracing::debug!(strategy = ?write.strategy(), ?target, "Update planned");

    Ok(UpdatePlan {
        write: Some(write),
        advisories,
    })
}

/// Trim, validate and drop blank fields
pub fn clean_fields(edit: &PendingEdit) -> Result<BusinessUpdate, ValidationError> {
    let commercial_name = match &edit.commercial_name {
        Some(name) => Some(required("commercialName", name, MAX_NAME)?),
        None => None,
    };

    let google_maps_coordinates = match &edit.google_maps_coordinates {
        Some(raw) => Some(coordinates(raw)?),
        None => None,
    };

    let whatsapp_number = join_phone(&edit.whatsapp_country_code, &edit.whatsapp_number);
    if edit.accepts_whatsapp_orders == Some(true)
        && whatsapp_number.is_none()
        && edit.whatsapp_number.is_some()
    {
        return Err(ValidationError::MissingRequiredField("whatsappNumber"));
    }

    Ok(BusinessUpdate {
        category_id: text("categoryId", &edit.category_id, usize::MAX)?,
        commercial_name,
        description: text("description", &edit.description, MAX_DESCRIPTION)?,
        address: text("address", &edit.address, MAX_ADDRESS)?,
        parish_community_sector: text(
            "parishCommunitySector",
            &edit.parish_community_sector,
            MAX_SECTOR,
        )?,
        phone: join_phone(&edit.phone_country_code, &edit.phone_number),
        email: text("email", &edit.email, MAX_EMAIL)?,
        whatsapp_number,
        accepts_whatsapp_orders: edit.accepts_whatsapp_orders,
        facebook: text("facebook", &edit.facebook, MAX_LINK)?,
        instagram: text("instagram", &edit.instagram, MAX_LINK)?,
        tiktok: text("tiktok", &edit.tiktok, MAX_LINK)?,
        website: text("website", &edit.website, MAX_LINK)?,
        google_maps_coordinates,
        schedules: schedules(&edit.weekday_schedule, &edit.weekend_schedule)?,
        delivery_service: edit.delivery_service,
        sale_place: edit.sale_place,
        received_udel_support: edit.received_udel_support,
        udel_support_details: text(
            "udelSupportDetails",
            &edit.udel_support_details,
            MAX_SUPPORT_DETAILS,
        )?,
    })
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn text(
    field: &'static str,
    value: &Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match trimmed(value) {
        Some(v) if v.chars().count() > max => Err(ValidationError::FieldTooLong { field, max }),
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    text(field, &Some(value.to_string()), max)?.ok_or(ValidationError::MissingRequiredField(field))
}

fn coordinates(raw: &str) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingRequiredField("googleMapsCoordinates"));
    }
    match location::try_parse(raw) {
        Some(c) if c.in_range() && !c.is_unset() => Ok(raw.to_string()),
        _ => Err(ValidationError::InvalidCoordinates(raw.to_string())),
    }
}

/// `+<code><digits>` when both parts are present, otherwise nothing
fn join_phone(country_code: &Option<String>, local: &Option<String>) -> Option<String> {
    let code = digits_only(trimmed(country_code)?);
    let local = digits_only(trimmed(local)?);
    if code.is_empty() || local.is_empty() {
        return None;
    }
    Some(format!("+{code}{local}"))
}

fn schedules(
    weekday: &Option<String>,
    weekend: &Option<String>,
) -> Result<Option<String>, ValidationError> {
    let half = |field: &'static str, value: Option<&str>| {
        value
            .and_then(normalize_hours)
            .ok_or_else(|| ValidationError::InvalidScheduleFormat {
                field,
                value: value.unwrap_or_default().to_string(),
            })
    };

    match (trimmed(weekday), trimmed(weekend)) {
        (None, None) => Ok(None),
        (weekday, weekend) => {
            let weekday = half("weekdaySchedule", weekday)?;
            let weekend = half("weekendSchedule", weekend)?;
            Ok(Some(combine_halves(&weekday, &weekend)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageFile;
    use serde_json::json;

    fn with_images() -> PendingEdit {
        PendingEdit {
            commercial_name: Some("New Shop".into()),
            images: ImageBatch {
                logo: Some(ImageFile::new("logo.png", vec![1])),
                carousel: vec![ImageFile::new("a.jpg", vec![2])],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_rejected_with_images_goes_multipart() {
        let plan = plan_update(ModerationStatus::Rejected, with_images()).unwrap();
        let write = plan.write.unwrap();
        assert_eq!(write.strategy(), WriteStrategy::Multipart);
        assert_eq!(write.target(), WriteTarget::Rejected);
        assert!(write.carries_images());
        assert_eq!(plan.advisories, vec![Advisory::ResubmittedForReview]);
        assert_eq!(plan.advisories[0].code(), None);
    }

    #[test]
    fn test_rejected_without_images_goes_json_same_family() {
        let edit = PendingEdit {
            description: Some("Pan fresco".into()),
            ..Default::default()
        };
        let plan = plan_update(ModerationStatus::Rejected, edit).unwrap();
        let write = plan.write.unwrap();
        assert_eq!(write.strategy(), WriteStrategy::Json);
        assert_eq!(write.target(), WriteTarget::Rejected);
    }

    #[test]
    fn test_reviewed_with_images_degrades_to_json_with_advisory() {
        for status in [
            ModerationStatus::Validated,
            ModerationStatus::Approved,
            ModerationStatus::Pending,
        ] {
            let plan = plan_update(status, with_images()).unwrap();
            let write = plan.write.unwrap();
            assert_eq!(write.strategy(), WriteStrategy::Json);
            assert_eq!(write.target(), WriteTarget::Standard);
            assert!(!write.carries_images());
            assert_eq!(
                plan.advisories,
                vec![Advisory::ImagesFrozen { status, dropped: 2 }]
            );
            assert_eq!(plan.advisories[0].code(), Some(ErrorCode::ImagesFrozen));
        }
    }

    #[test]
    fn test_no_images_no_advisory() {
        for status in [
            ModerationStatus::Pending,
            ModerationStatus::Validated,
            ModerationStatus::Approved,
        ] {
            let edit = PendingEdit {
                commercial_name: Some("New Shop".into()),
                ..Default::default()
            };
            let plan = plan_update(status, edit).unwrap();
            assert_eq!(plan.write.unwrap().strategy(), WriteStrategy::Json);
            assert!(plan.advisories.is_empty());
        }
    }

    #[test]
    fn test_whitespace_field_is_omitted() {
        let edit = PendingEdit {
            commercial_name: Some("  New Shop ".into()),
            description: Some("   ".into()),
            ..Default::default()
        };
        let update = clean_fields(&edit).unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "commercialName": "New Shop" })
        );
    }

    #[test]
    fn test_phone_recomposition() {
        let edit = PendingEdit {
            phone_country_code: Some("+593".into()),
            phone_number: Some("99 123 4567".into()),
            whatsapp_country_code: Some("+57".into()),
            whatsapp_number: Some("  ".into()),
            ..Default::default()
        };
        let update = clean_fields(&edit).unwrap();
        assert_eq!(update.phone.as_deref(), Some("+593991234567"));
        assert_eq!(update.whatsapp_number, None);

        let edit = PendingEdit {
            phone_number: Some("991234567".into()),
            ..Default::default()
        };
        assert_eq!(clean_fields(&edit).unwrap().phone, None);
    }

    #[test]
    fn test_whatsapp_required_when_orders_enabled() {
        let edit = PendingEdit {
            accepts_whatsapp_orders: Some(true),
            whatsapp_country_code: Some("+593".into()),
            whatsapp_number: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(
            clean_fields(&edit),
            Err(ValidationError::MissingRequiredField("whatsappNumber"))
        );
    }

    #[test]
    fn test_schedule_halves() {
        let edit = PendingEdit {
            weekday_schedule: Some("08:00-18:00".into()),
            weekend_schedule: Some("cerrado".into()),
            ..Default::default()
        };
        assert_eq!(
            clean_fields(&edit).unwrap().schedules.as_deref(),
            Some("Lunes a Viernes: 08:00 - 18:00 | Sábado y Domingo: Cerrado")
        );

        let only_one = PendingEdit {
            weekday_schedule: Some("08:00 - 18:00".into()),
            ..Default::default()
        };
        assert_eq!(
            clean_fields(&only_one),
            Err(ValidationError::InvalidScheduleFormat {
                field: "weekendSchedule",
                value: String::new()
            })
        );

        let malformed = PendingEdit {
            weekday_schedule: Some("de 8 a 6".into()),
            weekend_schedule: Some("Cerrado".into()),
            ..Default::default()
        };
        assert!(matches!(
            clean_fields(&malformed),
            Err(ValidationError::InvalidScheduleFormat { field: "weekdaySchedule", .. })
        ));
    }

    #[test]
    fn test_coordinates_block_the_write() {
        for (raw, expected) in [
            ("", ValidationError::MissingRequiredField("googleMapsCoordinates")),
            ("abc", ValidationError::InvalidCoordinates("abc".into())),
            ("91.0, 10.0", ValidationError::InvalidCoordinates("91.0, 10.0".into())),
            ("1.0, 181.0", ValidationError::InvalidCoordinates("1.0, 181.0".into())),
            ("0, 0", ValidationError::InvalidCoordinates("0, 0".into())),
        ] {
            let edit = PendingEdit {
                google_maps_coordinates: Some(raw.into()),
                ..Default::default()
            };
            assert_eq!(plan_update(ModerationStatus::Pending, edit), Err(expected));
        }

        let edit = PendingEdit {
            google_maps_coordinates: Some(" 0.351600, -78.122500 ".into()),
            ..Default::default()
        };
        assert_eq!(
            clean_fields(&edit).unwrap().google_maps_coordinates.as_deref(),
            Some("0.351600, -78.122500")
        );
    }

    #[test]
    fn test_required_and_length_limits() {
        let edit = PendingEdit {
            commercial_name: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(
            clean_fields(&edit),
            Err(ValidationError::MissingRequiredField("commercialName"))
        );

        let edit = PendingEdit {
            description: Some("x".repeat(201)),
            ..Default::default()
        };
        assert_eq!(
            clean_fields(&edit),
            Err(ValidationError::FieldTooLong {
                field: "description",
                max: 200
            })
        );
    }

    #[test]
    fn test_nothing_to_send() {
        let edit = PendingEdit {
            description: Some(" ".into()),
            ..Default::default()
        };
        let plan = plan_update(ModerationStatus::Validated, edit).unwrap();
        assert!(plan.write.is_none());
        assert_eq!(plan.advisories, vec![Advisory::NoChanges]);

        // Only frozen images: both notices, still no write
        let edit = PendingEdit {
            images: with_images().images,
            ..Default::default()
        };
        let plan = plan_update(ModerationStatus::Approved, edit).unwrap();
        assert!(plan.write.is_none());
        assert_eq!(plan.advisories.len(), 2);
    }

    #[test]
    fn test_prefill_from_record() {
        let record: BusinessRecord = serde_json::from_value(json!({
            "id": 1,
            "commercialName": "Sol",
            "phone": "+593991234567",
            "googleMapsCoordinates": "0.35, -78.12",
            "schedules": "Lunes a Viernes: 08:00 - 18:00 | Sábado y Domingo: Cerrado"
        }))
        .unwrap();
        let edit = PendingEdit::from_record(&record);
        assert_eq!(edit.phone_country_code.as_deref(), Some("+593"));
        assert_eq!(edit.phone_number.as_deref(), Some("991234567"));
        assert_eq!(edit.weekend_schedule.as_deref(), Some("Cerrado"));

        // Re-submitting an untouched form is valid
        let update = clean_fields(&edit).unwrap();
        assert_eq!(update.phone.as_deref(), Some("+593991234567"));
        assert_eq!(update.schedules, record.schedules.as_str().map(str::to_string));
    }
}
