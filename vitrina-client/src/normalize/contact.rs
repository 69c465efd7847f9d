//! Phone numbers and outbound links

use serde::Serialize;
use shared::models::{DeliveryService, SalePlace};

/// Country code assumed for numbers without a known prefix (Ecuador)
pub const DEFAULT_COUNTRY_CODE: &str = "+593";

/// Dial prefixes recognized when splitting a stored number
const KNOWN_PREFIXES: &[&str] = &["593", "57"];

/// Shortest local part accepted after stripping a prefix
const MIN_LOCAL_DIGITS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneParts {
    /// `+` followed by the dial prefix
    pub country_code: String,
    /// Digits only
    pub local_number: String,
}

/// Split a stored number into country code and local digits.
pub fn split_phone_number(raw: &str) -> PhoneParts {
    let digits = digits_only(raw);

    for prefix in KNOWN_PREFIXES {
        if let Some(local) = digits.strip_prefix(prefix) {
            if local.len() >= MIN_LOCAL_DIGITS {
                return PhoneParts {
                    country_code: format!("+{prefix}"),
                    local_number: local.to_string(),
                };
            }
        }
    }

    PhoneParts {
        country_code: DEFAULT_COUNTRY_CODE.to_string(),
        local_number: digits,
    }
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `https://wa.me/<digits>`, or `None` for numbers too short to be real
pub fn whatsapp_link(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    (digits.len() > 5).then(|| format!("https://wa.me/{digits}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Facebook,
    Instagram,
    Tiktok,
    Website,
}

/// Build an outbound link from a stored handle or URL
pub fn social_link(platform: SocialPlatform, handle: &str) -> Option<String> {
    let handle = handle.trim();
    if handle.is_empty() {
        return None;
    }

    let url = if handle.starts_with("http") {
        handle.to_string()
    } else {
        match platform {
            SocialPlatform::Facebook => format!("https://facebook.com/{handle}"),
            SocialPlatform::Instagram => {
                format!("https://instagram.com/{}", handle.trim_start_matches('@'))
            }
            SocialPlatform::Tiktok => {
                format!("https://tiktok.com/@{}", handle.trim_start_matches('@'))
            }
            SocialPlatform::Website => handle.to_string(),
        }
    };

    // Anything this short cannot be a real profile or site
    (url.len() > 10).then_some(url)
}

pub fn delivery_text(delivery: Option<DeliveryService>) -> &'static str {
    match delivery {
        Some(DeliveryService::Si) => "Servicio de delivery disponible",
        Some(DeliveryService::BajoPedido) => "Delivery bajo pedido",
        _ => "Sin servicio de delivery",
    }
}

pub fn sale_place_text(place: Option<SalePlace>) -> &'static str {
    match place {
        Some(SalePlace::LocalFijo) => "Local físico",
        Some(SalePlace::Ferias) => "Ferias",
        Some(SalePlace::No) => "Sin punto de venta",
        Some(SalePlace::Other) | None => "No especificado",
    }
}
