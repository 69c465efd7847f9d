//! Coordinate parsing
//!
//! `(0, 0)` is the "no location" sentinel. The Gulf of Guinea is not a
//! valid business location for this directory, so callers must go through
//! [`Coordinates::as_option`] or [`Coordinates::is_unset`] before using a
//! parsed value.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const UNSET: Coordinates = Coordinates { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// `None` for the sentinel
    pub fn as_option(self) -> Option<Self> {
        (!self.is_unset()).then_some(self)
    }

    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Map link, `None` when unset
    pub fn maps_link(&self) -> Option<String> {
        self.as_option()
            .map(|c| format!("https://www.google.com/maps?q={},{}", c.lat, c.lng))
    }
}

/// Parse `"lat, lng"`. Returns [`Coordinates::UNSET`] for anything that is
/// not exactly two finite numbers.
pub fn parse_coordinates(text: Option<&str>) -> Coordinates {
    try_parse(text.unwrap_or("")).unwrap_or(Coordinates::UNSET)
}

/// Strict variant used by validation: `None` when the format is wrong
pub(crate) fn try_parse(text: &str) -> Option<Coordinates> {
    let parts: Vec<&str> = text.split(',').collect();
    let [lat, lng] = parts.as_slice() else {
        return None;
    };
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    (lat.is_finite() && lng.is_finite()).then_some(Coordinates { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let c = parse_coordinates(Some("0.3516, -78.1225"));
        assert_eq!(c, Coordinates::new(0.3516, -78.1225));
        assert!(!c.is_unset());
        assert!(c.in_range());
    }

    #[test]
    fn test_sentinel_for_bad_input() {
        assert_eq!(parse_coordinates(None), Coordinates::UNSET);
        assert_eq!(parse_coordinates(Some("")), Coordinates::UNSET);
        assert_eq!(parse_coordinates(Some("abc")), Coordinates::UNSET);
        assert_eq!(parse_coordinates(Some("1.0")), Coordinates::UNSET);
        assert_eq!(parse_coordinates(Some("1.0, 2.0, 3.0")), Coordinates::UNSET);
        assert_eq!(parse_coordinates(Some("1.0, north")), Coordinates::UNSET);
        assert_eq!(parse_coordinates(Some("NaN, 1.0")), Coordinates::UNSET);
    }

    #[test]
    fn test_sentinel_is_treated_as_absent() {
        let unset = parse_coordinates(Some("abc"));
        assert!(unset.is_unset());
        assert_eq!(unset.as_option(), None);
        assert_eq!(unset.maps_link(), None);

        // Explicit zeros are indistinguishable from the sentinel
        assert_eq!(parse_coordinates(Some("0, 0")).as_option(), None);

        // A point near, but not at, the intersection is real
        let near = parse_coordinates(Some("0.0001, -0.0001"));
        assert!(near.as_option().is_some());
        assert_eq!(
            near.maps_link().as_deref(),
            Some("https://www.google.com/maps?q=0.0001,-0.0001")
        );
    }

    #[test]
    fn test_range() {
        assert!(!Coordinates::new(91.0, 0.0).in_range());
        assert!(!Coordinates::new(0.0, -180.5).in_range());
        assert!(Coordinates::new(-90.0, 180.0).in_range());
    }
}
