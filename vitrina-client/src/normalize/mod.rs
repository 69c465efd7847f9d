//! Normalizer: loosely-typed server payloads to display-ready values
//!
//! Every function here is total. Malformed input produces the most
//! conservative default (empty list, unset coordinate, unknown-day label)
//! instead of an error.

pub mod contact;
pub mod location;
pub mod photos;
pub mod schedule;

pub use contact::{PhoneParts, SocialPlatform, social_link, split_phone_number, whatsapp_link};
pub use location::{Coordinates, parse_coordinates};
pub use photos::extract_photo_urls;
pub use schedule::{ScheduleLine, format_schedule};

use serde::Serialize;
use shared::models::{BusinessRecord, ModerationStatus};

/// Shown when a listing has no usable photo
pub const PHOTO_PLACEHOLDER: &str = "assets/icon/ibarra.jpg";

/// Display-ready projection of a [`BusinessRecord`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessView {
    pub id: i64,
    pub name: String,
    pub status: ModerationStatus,
    pub edit_label: &'static str,
    pub logo_url: Option<String>,
    pub photo_urls: Vec<String>,
    pub schedule: Vec<ScheduleLine>,
    /// `None` when the record has no usable location
    pub coordinates: Option<Coordinates>,
    pub maps_link: Option<String>,
    pub phone: Option<PhoneParts>,
    pub whatsapp_link: Option<String>,
    pub links: Vec<(SocialPlatform, String)>,
    pub delivery_text: &'static str,
    pub sale_place_text: &'static str,
}

impl BusinessView {
    pub fn photo_count(&self) -> usize {
        self.photo_urls.len()
    }

    /// Photo at `index`, falling back to the placeholder
    pub fn image_at(&self, index: usize) -> &str {
        self.photo_urls
            .get(index)
            .map(String::as_str)
            .unwrap_or(PHOTO_PLACEHOLDER)
    }

    pub fn has_multiple_images(&self) -> bool {
        self.photo_urls.len() > 1
    }
}

/// Build the display view of a record
pub fn normalize(record: &BusinessRecord) -> BusinessView {
    let coordinates = parse_coordinates(record.google_maps_coordinates.as_deref()).as_option();

    let phone = record
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(split_phone_number);

    let whatsapp = if record.accepts_whatsapp_orders.unwrap_or(false) {
        record.whatsapp_number.as_deref().and_then(whatsapp_link)
    } else {
        None
    };

    let links = [
        (SocialPlatform::Facebook, &record.facebook),
        (SocialPlatform::Instagram, &record.instagram),
        (SocialPlatform::Tiktok, &record.tiktok),
        (SocialPlatform::Website, &record.website),
    ]
    .into_iter()
    .filter_map(|(platform, handle)| {
        handle
            .as_deref()
            .and_then(|h| social_link(platform, h))
            .map(|url| (platform, url))
    })
    .collect();

    BusinessView {
        id: record.id,
        name: record.commercial_name.trim().to_string(),
        status: record.validation_status,
        edit_label: record.validation_status.edit_label(),
        logo_url: photos::logo_url(record.logo_url.as_deref()),
        photo_urls: extract_photo_urls(&record.photos),
        schedule: format_schedule(&record.schedules),
        maps_link: coordinates.and_then(|c| c.maps_link()),
        coordinates,
        phone,
        whatsapp_link: whatsapp,
        links,
        delivery_text: contact::delivery_text(record.delivery_service),
        sale_place_text: contact::sale_place_text(record.sale_place),
    }
}
