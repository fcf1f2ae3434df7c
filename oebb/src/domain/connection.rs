//! Connections and their sections.
//!
//! These are the validated counterparts of the timetable DTOs: every time
//! field has already been parsed into an [`ApiTime`], so code holding a
//! [`ConnectionRecord`] never has to deal with malformed timestamps.

use chrono::Duration;

use super::ApiTime;

/// One end of a connection or section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Station name as shown by the provider.
    pub name: String,
    /// Provider-internal station number (`esn`).
    pub esn: i64,
    /// Scheduled time at this stop.
    pub scheduled: ApiTime,
    /// Realtime estimate, when the provider reports a delay.
    pub delayed: Option<ApiTime>,
    pub platform: Option<String>,
    /// Platform the train actually uses, when it deviates from `platform`.
    pub platform_deviation: Option<String>,
}

impl Stop {
    /// Whether a realtime estimate differs from the timetable.
    pub fn is_delayed(&self) -> bool {
        self.delayed.is_some_and(|d| d != self.scheduled)
    }
}

/// Line or train type metadata of a section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Category {
    pub name: String,
    pub number: String,
    pub short_name: String,
    pub display_name: String,
    pub long_name: String,
    /// Hex colour (`#rrggbb`) of the line badge.
    pub bar_color: String,
    pub font_color: String,
    pub is_train: bool,
}

impl Category {
    /// Short label for the line badge, e.g. "RJX" or "S1".
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.short_name
        } else {
            &self.display_name
        }
    }
}

/// One leg of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub departure: Stop,
    pub arrival: Stop,
    /// Missing for walking sections.
    pub category: Option<Category>,
    pub duration_ms: i64,
    /// Provider section type, e.g. "journey" or "walk".
    pub kind: String,
    pub has_realtime: bool,
}

/// A single connection returned by the timetable endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Provider-assigned id, unique within a result set.
    pub id: String,
    pub departure: Stop,
    pub arrival: Stop,
    pub sections: Vec<Section>,
    /// Number of changes.
    pub switches: u32,
    pub duration_ms: i64,
}

impl ConnectionRecord {
    /// Scheduled departure time of the whole connection.
    pub fn departure_time(&self) -> ApiTime {
        self.departure.scheduled
    }

    /// Scheduled arrival time of the whole connection.
    pub fn arrival_time(&self) -> ApiTime {
        self.arrival.scheduled
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }
}
