//! Conversion from ÖBB DTOs to domain types.
//!
//! Every timestamp is parsed here. A connection with an unparsable time is
//! an error for the whole response: the paginator derives its cursor from
//! these values, so silently dropping records would corrupt the search.

use crate::domain::{ApiTime, Category, ConnectionRecord, Section, StationRef, Stop};

use super::types::{
    ArrivalDto, CategoryDto, ConnectionDto, DepartureDto, SectionDto, StationDto,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a time string
    #[error("invalid {field} time {value:?} in connection {connection}")]
    InvalidTime {
        connection: String,
        field: &'static str,
        value: String,
    },
}

/// Convert a station record, resolving `name` versus `meta`.
pub fn convert_station(dto: &StationDto) -> StationRef {
    StationRef::from_names(
        dto.latitude,
        dto.longitude,
        dto.name.as_deref(),
        dto.meta.as_deref(),
        dto.number,
    )
}

/// Convert all connections of a timetable page, preserving provider order.
pub fn convert_connections(
    dtos: &[ConnectionDto],
) -> Result<Vec<ConnectionRecord>, ConversionError> {
    dtos.iter().map(convert_connection).collect()
}

/// Convert a single connection.
pub fn convert_connection(dto: &ConnectionDto) -> Result<ConnectionRecord, ConversionError> {
    let parser = TimeParser { connection: &dto.id };

    let sections = dto
        .sections
        .iter()
        .map(|s| convert_section(s, &parser))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConnectionRecord {
        id: dto.id.clone(),
        departure: departure_stop(&dto.from, &parser)?,
        arrival: arrival_stop(&dto.to, &parser)?,
        sections,
        switches: dto.switches,
        duration_ms: dto.duration,
    })
}

fn convert_section(dto: &SectionDto, parser: &TimeParser<'_>) -> Result<Section, ConversionError> {
    Ok(Section {
        departure: departure_stop(&dto.from, parser)?,
        arrival: arrival_stop(&dto.to, parser)?,
        category: dto.category.as_ref().map(convert_category),
        duration_ms: dto.duration,
        kind: dto.kind.clone(),
        has_realtime: dto.has_realtime,
    })
}

fn convert_category(dto: &CategoryDto) -> Category {
    Category {
        name: dto.name.clone(),
        number: dto.number.clone(),
        short_name: dto.short_name.clone(),
        display_name: dto.display_name.clone(),
        long_name: dto.long_name.en.clone(),
        bar_color: dto.bar_color.clone(),
        font_color: dto.font_color.clone(),
        is_train: dto.train,
    }
}

fn departure_stop(dto: &DepartureDto, parser: &TimeParser<'_>) -> Result<Stop, ConversionError> {
    Ok(Stop {
        name: dto.name.clone(),
        esn: dto.esn,
        scheduled: parser.required("departure", &dto.departure)?,
        delayed: parser.optional("departure delay", &dto.departure_delay)?,
        platform: non_empty(&dto.departure_platform),
        platform_deviation: non_empty(&dto.departure_platform_deviation),
    })
}

fn arrival_stop(dto: &ArrivalDto, parser: &TimeParser<'_>) -> Result<Stop, ConversionError> {
    Ok(Stop {
        name: dto.name.clone(),
        esn: dto.esn,
        scheduled: parser.required("arrival", &dto.arrival)?,
        delayed: parser.optional("arrival delay", &dto.arrival_delay)?,
        platform: non_empty(&dto.arrival_platform),
        platform_deviation: non_empty(&dto.arrival_platform_deviation),
    })
}

/// Parses times and attributes failures to the connection being converted.
struct TimeParser<'a> {
    connection: &'a str,
}

impl TimeParser<'_> {
    fn required(&self, field: &'static str, value: &str) -> Result<ApiTime, ConversionError> {
        ApiTime::parse(value).map_err(|_| ConversionError::InvalidTime {
            connection: self.connection.to_string(),
            field,
            value: value.to_string(),
        })
    }

    /// The API sends an empty string when there is no value.
    fn optional(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<ApiTime>, ConversionError> {
        if value.is_empty() {
            return Ok(None);
        }
        self.required(field, value).map(Some)
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
