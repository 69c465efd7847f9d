//! Partial update payload

use serde::{Deserialize, Serialize};

use super::{DeliveryService, SalePlace};

/// Cleaned partial update sent to the backend
///
/// Absent fields are left untouched server-side, so every `None` is
/// omitted from the JSON instead of being sent as `null` or `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parish_community_sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts_whatsapp_orders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_coordinates: Option<String>,
    /// Combined weekday/weekend schedule string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_service: Option<DeliveryService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_place: Option<SalePlace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_udel_support: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udel_support_details: Option<String>,
}

impl BusinessUpdate {
    /// True when nothing would change server-side
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
