//! Station references.

use std::fmt;

/// A station as resolved by the station lookup endpoint.
///
/// The provider distinguishes between single stops, which carry a `name`,
/// and aggregate entries (a whole city or group of stops), which carry a
/// `meta` name instead. Both are represented here with a single display
/// name plus the [`is_aggregate`](Self::is_aggregate) flag.
///
/// # Examples
///
/// ```
/// use oebb::domain::StationRef;
///
/// let stop = StationRef::from_names(48185184, 16376413, Some("Wien Hbf"), None, 1290401);
/// assert_eq!(stop.display_name(), "Wien Hbf");
/// assert!(!stop.is_aggregate());
///
/// let city = StationRef::from_names(48208174, 16373819, None, Some("Wien"), 1190100);
/// assert_eq!(city.display_name(), "Wien");
/// assert!(city.is_aggregate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationRef {
    latitude: i64,
    longitude: i64,
    display_name: String,
    is_aggregate: bool,
    number: i64,
}

impl StationRef {
    /// Build a station from the provider's two mutually exclusive name fields.
    ///
    /// A non-empty `name` takes precedence. Otherwise `meta` is used and the
    /// station is marked as an aggregate.
    pub fn from_names(
        latitude: i64,
        longitude: i64,
        name: Option<&str>,
        meta: Option<&str>,
        number: i64,
    ) -> Self {
        let (display_name, is_aggregate) = match name.filter(|n| !n.is_empty()) {
            Some(name) => (name.to_string(), false),
            None => (meta.unwrap_or_default().to_string(), true),
        };

        Self {
            latitude,
            longitude,
            display_name,
            is_aggregate,
            number,
        }
    }

    /// Latitude in micro-degrees, as delivered by the provider.
    pub fn latitude(&self) -> i64 {
        self.latitude
    }

    /// Longitude in micro-degrees, as delivered by the provider.
    pub fn longitude(&self) -> i64 {
        self.longitude
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether this entry groups several stops (city or region).
    pub fn is_aggregate(&self) -> bool {
        self.is_aggregate
    }

    /// Provider station number.
    pub fn number(&self) -> i64 {
        self.number
    }
}

impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_takes_precedence_over_meta() {
        let s = StationRef::from_names(1, 2, Some("Linz Hbf"), Some("Linz"), 3);
        assert_eq!(s.display_name(), "Linz Hbf");
        assert!(!s.is_aggregate());
        assert_eq!(s.latitude(), 1);
        assert_eq!(s.longitude(), 2);
        assert_eq!(s.number(), 3);
    }

    #[test]
    fn empty_name_falls_back_to_meta() {
        let s = StationRef::from_names(0, 0, Some(""), Some("Salzburg"), 7);
        assert_eq!(s.display_name(), "Salzburg");
        assert!(s.is_aggregate());
    }

    #[test]
    fn display_uses_name() {
        let s = StationRef::from_names(0, 0, Some("Graz Hbf"), None, 1);
        assert_eq!(s.to_string(), "Graz Hbf");
    }
}
