//! Business listing model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::BusinessUpdate;

/// Server-assigned moderation stage of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Validated,
    Approved,
    Rejected,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "PENDING",
            ModerationStatus::Validated => "VALIDATED",
            ModerationStatus::Approved => "APPROVED",
            ModerationStatus::Rejected => "REJECTED",
            ModerationStatus::Unknown => "UNKNOWN",
        }
    }

    /// Only a listing sent back for correction may replace its images.
    pub fn allows_image_replacement(&self) -> bool {
        matches!(self, ModerationStatus::Rejected)
    }

    /// Whether the owner may open the edit form at all
    pub fn is_editable(&self) -> bool {
        !matches!(self, ModerationStatus::Unknown)
    }

    /// Label for the edit button
    pub fn edit_label(&self) -> &'static str {
        match self {
            ModerationStatus::Rejected => "Corregir y editar negocio",
            _ => "Editar datos del negocio",
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery option offered by the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryService {
    #[default]
    No,
    Si,
    BajoPedido,
    #[serde(other)]
    Other,
}

/// Where the business sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalePlace {
    #[default]
    No,
    Ferias,
    LocalFijo,
    #[serde(other)]
    Other,
}

/// Category reference embedded in a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// The backend sends either a number or a string here
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Owner reference embedded in a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A business listing as served by the backend
///
/// `photos` and `schedules` stay as raw JSON: their shape varies between
/// backend revisions and only the normalizer interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commercial_name: String,
    #[serde(default)]
    pub representative_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub parish_community_sector: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub delivery_service: Option<DeliveryService>,
    #[serde(default)]
    pub sale_place: Option<SalePlace>,
    #[serde(default)]
    pub accepts_whatsapp_orders: Option<bool>,
    /// Support-program participation flag
    #[serde(default)]
    pub received_udel_support: Option<bool>,
    #[serde(default)]
    pub udel_support_details: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validation_status: ModerationStatus,
    #[serde(default)]
    pub registration_date: Option<String>,
    #[serde(default)]
    pub google_maps_coordinates: Option<String>,
    #[serde(default)]
    pub schedules: Value,
    #[serde(default)]
    pub photos: Value,
    #[serde(default)]
    pub user: Option<OwnerRef>,
}

impl BusinessRecord {
    /// Merge an accepted update into this record.
    ///
    /// Only fields present in the update are touched.
    pub fn apply(&mut self, update: &BusinessUpdate) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        if let Some(name) = &update.commercial_name {
            self.commercial_name = name.clone();
        }
        if let Some(category_id) = &update.category_id {
            self.category
                .get_or_insert_with(CategoryRef::default)
                .id = Some(category_id.clone());
        }
        set(&mut self.description, &update.description);
        set(&mut self.address, &update.address);
        set(&mut self.parish_community_sector, &update.parish_community_sector);
        set(&mut self.phone, &update.phone);
        set(&mut self.email, &update.email);
        set(&mut self.whatsapp_number, &update.whatsapp_number);
        set(&mut self.facebook, &update.facebook);
        set(&mut self.instagram, &update.instagram);
        set(&mut self.tiktok, &update.tiktok);
        set(&mut self.website, &update.website);
        set(&mut self.google_maps_coordinates, &update.google_maps_coordinates);
        set(&mut self.udel_support_details, &update.udel_support_details);
        if let Some(schedules) = &update.schedules {
            self.schedules = Value::String(schedules.clone());
        }
        if update.delivery_service.is_some() {
            self.delivery_service = update.delivery_service;
        }
        if update.sale_place.is_some() {
            self.sale_place = update.sale_place;
        }
        if update.accepts_whatsapp_orders.is_some() {
            self.accepts_whatsapp_orders = update.accepts_whatsapp_orders;
        }
        if update.received_udel_support.is_some() {
            self.received_udel_support = update.received_udel_support;
        }
    }
}

/// Explicit `null` reads like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
