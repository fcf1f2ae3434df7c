//! ÖBB ticket API request and response DTOs.
//!
//! These types map directly to the JSON spoken by `tickets.oebb.at`.
//! Responses use `#[serde(default)]` liberally because the API omits
//! fields rather than sending nulls, and sends empty strings where a value
//! is unknown.

use serde::{Deserialize, Serialize};

use crate::domain::{PageRequest, StationRef};

/// Passenger id the web shop uses for its anonymous default adult.
const DEFAULT_PASSENGER_ID: i64 = 1554277150;

//
// AUTH
//

/// Response from `GET /api/domain/v3/init`.
///
/// Only the fields needed for later requests are mapped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    /// Duplicate of `token.access_token` in some responses.
    pub access_token: String,
    pub token: TokenDto,
    pub channel: String,
    pub support_id: String,
    pub session_id: String,
    /// Session lifetime in seconds.
    pub session_timeout: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenDto {
    pub access_token: String,
    pub refresh_token: String,
}

//
// STATIONS
//

/// A station record as returned by `/api/hafas/v1/stations` and as echoed
/// back inside timetable requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationDto {
    pub latitude: i64,
    pub longitude: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name of a city or group of stops; set instead of `name` for aggregates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    pub number: i64,
}

impl From<&StationRef> for StationDto {
    fn from(station: &StationRef) -> Self {
        Self {
            latitude: station.latitude(),
            longitude: station.longitude(),
            name: Some(station.display_name().to_string()),
            meta: None,
            number: station.number(),
        }
    }
}

//
// TIMETABLE REQUEST
//

/// Body of `POST /api/hafas/v4/timetable`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsRequest {
    pub reverse: bool,
    pub datetime_departure: String,
    pub filter: ConnectionsFilter,
    pub passengers: Vec<Passenger>,
    pub count: u8,
    pub debug_filter: DebugFilter,
    pub sort_type: String,
    pub from: StationDto,
    pub to: StationDto,
    pub timeout: Timeout,
}

impl ConnectionsRequest {
    /// Build a forward, departure-sorted request with the default filters
    /// and a single adult passenger.
    pub fn new(from: &StationRef, to: &StationRef, page: &PageRequest) -> Self {
        Self {
            reverse: false,
            datetime_departure: page.cursor.to_string(),
            filter: ConnectionsFilter::default(),
            passengers: vec![Passenger::default_adult()],
            count: page.count,
            debug_filter: DebugFilter::default(),
            sort_type: "DEPARTURE".to_string(),
            from: from.into(),
            to: to.into(),
            timeout: Timeout {},
        }
    }
}

/// Result filters; all disabled by default.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsFilter {
    pub regionaltrains: bool,
    pub direct: bool,
    pub change_time: bool,
    pub wheelchair: bool,
    pub bikes: bool,
    pub trains: bool,
    pub motorail: bool,
    pub dropped_connections: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengedFlags {
    pub has_handicapped_pass: bool,
    pub has_assistance_dog: bool,
    pub has_wheelchair: bool,
    pub has_attendant: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub me: bool,
    pub remembered: bool,
    pub challenged_flags: ChallengedFlags,
    pub relations: Vec<serde_json::Value>,
    pub cards: Vec<serde_json::Value>,
    pub birthdate_changeable: bool,
    pub birthdate_deletable: bool,
    pub name_changeable: bool,
    pub passenger_deletable: bool,
    pub is_selected: bool,
}

impl Passenger {
    /// The anonymous adult the web shop sends when nobody is logged in.
    pub fn default_adult() -> Self {
        Self {
            kind: "ADULT".to_string(),
            id: DEFAULT_PASSENGER_ID,
            me: false,
            remembered: false,
            challenged_flags: ChallengedFlags::default(),
            relations: Vec::new(),
            cards: Vec::new(),
            birthdate_changeable: true,
            birthdate_deletable: true,
            name_changeable: true,
            passenger_deletable: true,
            is_selected: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugFilter {
    pub no_aggregation_filter: bool,
    pub no_eqclass_filter: bool,
    pub no_nrtpath_filter: bool,
    pub no_payment_filter: bool,
    pub use_tripart_filter: bool,
    pub no_vbx_filter: bool,
    pub no_categories_filter: bool,
}

/// Serialized as an empty object.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeout {}

//
// TIMETABLE RESPONSE
//

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionsResponse {
    pub connections: Vec<ConnectionDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepartureDto {
    pub name: String,
    pub esn: i64,
    pub departure: String,
    pub departure_delay: String,
    pub departure_platform: String,
    pub departure_platform_deviation: String,
    pub show_as_resolved_meta_station: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrivalDto {
    pub name: String,
    pub esn: i64,
    pub arrival: String,
    pub arrival_delay: String,
    pub arrival_platform: String,
    pub arrival_platform_deviation: String,
    pub show_as_resolved_meta_station: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TranslatedString {
    pub de: String,
    pub en: String,
    pub it: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryDto {
    pub name: String,
    pub number: String,
    pub short_name: String,
    pub display_name: String,
    pub long_name: TranslatedString,
    pub background_color: String,
    pub font_color: String,
    pub bar_color: String,
    pub place: TranslatedString,
    pub train: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionDto {
    pub from: DepartureDto,
    pub to: ArrivalDto,
    pub duration: i64,
    pub category: Option<CategoryDto>,
    #[serde(rename = "type")]
    pub kind: String,
    pub has_realtime: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionDto {
    pub id: String,
    pub from: DepartureDto,
    pub to: ArrivalDto,
    pub sections: Vec<SectionDto>,
    pub switches: u32,
    pub duration: i64,
}
