//! Zone conversion using the system time zone database.
use crate::conversion::{ConversionError, Converted, ZoneConverter};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use tracing::trace;
use tz::TimeZone;

#[derive(Clone, Copy, Debug, Default)]
/// Offline converter backed by the tz database on the local machine.
pub struct LocalZones;

impl LocalZones {
    fn load(zone: &str) -> Result<TimeZone, ConversionError> {
        TimeZone::from_posix_tz(zone).map_err(|e| {
            ConversionError::ConversionFailed(format!("load time zone {zone}: {e}"))
        })
    }

    fn offset(tz: &TimeZone, unix_time: i64) -> Result<i64, ConversionError> {
        tz.find_local_time_type(unix_time)
            .map(|t| i64::from(t.ut_offset()))
            .map_err(|e| ConversionError::ConversionFailed(format!("find local time type: {e}")))
    }

    /// Resolve a wall clock time in `tz` to a unix timestamp.
    ///
    /// Wall clock times inside a transition resolve to one of the neighbouring offsets.
    fn to_unix(tz: &TimeZone, at: NaiveDateTime) -> Result<i64, ConversionError> {
        let wall = at.and_utc().timestamp();
        let first = Self::offset(tz, wall)?;
        let second = Self::offset(tz, wall - first)?;
        if first == second {
            return Ok(wall - first);
        }
        let candidate = wall - second;
        if Self::offset(tz, candidate)? == second {
            Ok(candidate)
        } else {
            Ok(wall - first)
        }
    }

    /// The wall clock time in `to` matching the wall clock time `at` in `from`.
    fn between(
        from: &TimeZone,
        at: NaiveDateTime,
        to: &TimeZone,
    ) -> Result<NaiveDateTime, ConversionError> {
        let unix = Self::to_unix(from, at)?;
        let local = unix + Self::offset(to, unix)?;
        DateTime::from_timestamp(local, 0)
            .map(|d| d.naive_utc())
            .ok_or_else(|| {
                ConversionError::ConversionFailed(format!("timestamp {local} out of range"))
            })
    }
}

#[async_trait]
impl ZoneConverter for LocalZones {
    async fn convert(
        &self,
        from_zone: &str,
        at: NaiveDateTime,
        to_zone: &str,
    ) -> Result<Converted, ConversionError> {
        let from = Self::load(from_zone)?;
        let to = Self::load(to_zone)?;

        let date_time = Self::between(&from, at, &to)?;
        trace!("{} in {} is {} in {}", at, from_zone, date_time, to_zone);

        Ok(Converted {
            time: date_time.format("%H:%M").to_string(),
            date_time,
        })
    }
}
