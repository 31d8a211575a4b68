//! Converting a source city and time into a destination city's wall clock time.
use crate::{city, time_of_day::TimeOfDay};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Text shown in place of a destination time when its conversion failed.
pub const ERROR_TEXT: &str = "Error converting time";

/// The reasons a single conversion can fail.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConversionError {
    /// A selected city name is not part of the registry.
    #[error("invalid city selected: {0}")]
    InvalidCity(String),

    /// The converter was unreachable or answered with something unusable.
    #[error("failed to convert time: {0}")]
    ConversionFailed(String),
}

/// The wall clock time in the destination zone as reported by a converter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Converted {
    /// Display time, formatted by the converter (usually `HH:MM`).
    pub time: String,

    /// Full destination timestamp.
    pub date_time: NaiveDateTime,
}

/// Interprets a naive timestamp as wall clock time in `from_zone` and returns
/// the equivalent wall clock time in `to_zone`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ZoneConverter: Send + Sync {
    async fn convert(
        &self,
        from_zone: &str,
        at: NaiveDateTime,
        to_zone: &str,
    ) -> Result<Converted, ConversionError>;
}

/// Calendar day relation between the source and destination timestamps.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOffset {
    /// Same calendar day, or a difference the heuristic does not detect.
    #[default]
    Same,

    /// The destination is on the following calendar day.
    Next,

    /// The destination is on the preceding calendar day.
    Previous,
}

impl DayOffset {
    /// Month lengths are assumed to be 31 days when detecting a month rollover,
    /// so boundaries after 28, 29 or 30 day months go unannotated.
    const ROLLOVER: i64 = 30;

    /// Compare the day of month of both timestamps.
    pub fn between(source: NaiveDateTime, dest: NaiveDateTime) -> Self {
        let diff = i64::from(dest.day()) - i64::from(source.day());
        if diff == 1 || (diff <= -Self::ROLLOVER && dest > source) {
            Self::Next
        } else if diff == -1 || (diff >= Self::ROLLOVER && dest < source) {
            Self::Previous
        } else {
            Self::Same
        }
    }

    /// The label appended to a destination time.
    pub fn annotation(self) -> &'static str {
        match self {
            Self::Same => "",
            Self::Next => " (Next Day)",
            Self::Previous => " (Previous Day)",
        }
    }
}

/// A successful conversion for one destination.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConversionResult {
    pub time: String,
    pub day_offset: DayOffset,
}

/// Everything needed to run one conversion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConversionRequest {
    pub source_city: String,
    pub source_time: TimeOfDay,
    pub dest_city: String,
    pub date: NaiveDate,
}

impl ConversionRequest {
    /// Build a request, or `None` if any of the inputs is unset.
    pub fn from_parts(
        source_city: Option<&str>,
        source_time: Option<TimeOfDay>,
        dest_city: Option<&str>,
        date: NaiveDate,
    ) -> Option<Self> {
        Some(Self {
            source_city: source_city.filter(|s| !s.is_empty())?.into(),
            source_time: source_time?,
            dest_city: dest_city.filter(|s| !s.is_empty())?.into(),
            date,
        })
    }
}

/// Resolve both cities, ask the converter and annotate the day offset.
pub async fn convert<C>(
    converter: &C,
    request: &ConversionRequest,
) -> Result<ConversionResult, ConversionError>
where
    C: ZoneConverter + ?Sized,
{
    let source = city::find(&request.source_city)
        .ok_or_else(|| ConversionError::InvalidCity(request.source_city.clone()))?;
    let dest = city::find(&request.dest_city)
        .ok_or_else(|| ConversionError::InvalidCity(request.dest_city.clone()))?;

    let at = request.source_time.on(request.date);
    debug!("Converting {} from {} to {}", at, source.timezone, dest.timezone);

    let converted = converter.convert(source.timezone, at, dest.timezone).await?;
    Ok(ConversionResult {
        day_offset: DayOffset::between(at, converted.date_time),
        time: converted.time,
    })
}
