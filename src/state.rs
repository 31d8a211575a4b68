//! The interaction state: a source selection and an ordered list of destinations.
//!
//! Every transition is synchronous and returns the conversions it wants issued as
//! [`Ticket`]s. Tickets remember the row and its generation so a result can be
//! dropped once the row changed or disappeared in the meantime.
use crate::{
    conversion::{ConversionError, ConversionRequest, ConversionResult, ERROR_TEXT},
    time_of_day::TimeOfDay,
};
use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use serde::{ser::SerializeStruct, Serialize, Serializer};
use strum::AsRefStr;
use thiserror::Error;
use tracing::debug;

/// Stable identifier of a destination row, independent of its position.
pub type RowId = u64;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StateError {
    #[error("destination {index} does not exist, there are {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("the last destination cannot be removed")]
    LastDestination,
}

/// What a destination row currently displays.
#[derive(AsRefStr, Clone, Debug, Default, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// Nothing computed yet.
    #[default]
    Blank,

    /// A converted time.
    Ready(ConversionResult),

    /// The conversion failed.
    Failed,
}

impl Outcome {
    /// The time text of the row, empty if nothing was computed.
    pub fn time(&self) -> &str {
        match self {
            Outcome::Blank => "",
            Outcome::Ready(r) => &r.time,
            Outcome::Failed => ERROR_TEXT,
        }
    }

    /// The day annotation of the row.
    pub fn date(&self) -> &str {
        match self {
            Outcome::Ready(r) => r.day_offset.annotation(),
            _ => "",
        }
    }
}

/// Serialized as its status next to the displayed `time` and `date` texts.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 4)?;
        state.serialize_field("status", self.as_ref())?;
        state.serialize_field("time", self.time())?;
        state.serialize_field("date", self.date())?;
        match self {
            Outcome::Ready(r) => state.serialize_field("day_offset", &r.day_offset)?,
            _ => state.skip_field("day_offset")?,
        }
        state.end()
    }
}

#[derive(Clone, Debug, CopyGetters, Eq, Getters, PartialEq, Serialize)]
/// A single destination row.
pub struct Destination {
    #[getset(get_copy = "pub")]
    #[serde(skip)]
    id: RowId,

    #[getset(get = "pub")]
    city: Option<String>,

    #[getset(get = "pub")]
    #[serde(flatten)]
    outcome: Outcome,

    #[serde(skip)]
    generation: u64,

    #[getset(get_copy = "pub")]
    /// Whether a conversion for the current inputs is outstanding.
    pending: bool,
}

impl Destination {
    fn new(id: RowId) -> Self {
        Self {
            id,
            city: None,
            outcome: Outcome::Blank,
            generation: 0,
            pending: false,
        }
    }

    /// Drop the displayed result and invalidate outstanding conversions.
    fn clear(&mut self) {
        self.outcome = Outcome::Blank;
        self.generation += 1;
        self.pending = false;
    }

    fn issue(&mut self, source_city: Option<&str>, source_time: Option<TimeOfDay>) -> Option<Ticket> {
        let ticket = Ticket {
            row: self.id,
            generation: self.generation,
            source_city: source_city.filter(|c| !c.is_empty())?.into(),
            source_time: source_time?,
            dest_city: self.city.as_deref().filter(|c| !c.is_empty())?.into(),
        };
        self.pending = true;
        Some(ticket)
    }
}

#[derive(Clone, Debug, CopyGetters, Eq, Getters, PartialEq)]
/// A conversion to be run for one destination row.
pub struct Ticket {
    #[getset(get_copy = "pub")]
    row: RowId,

    #[getset(get_copy = "pub")]
    generation: u64,

    #[getset(get = "pub")]
    source_city: String,

    #[getset(get_copy = "pub")]
    source_time: TimeOfDay,

    #[getset(get = "pub")]
    dest_city: String,
}

impl Ticket {
    /// The conversion request for the provided calendar date.
    pub fn request(&self, date: NaiveDate) -> ConversionRequest {
        ConversionRequest {
            source_city: self.source_city.clone(),
            source_time: self.source_time,
            dest_city: self.dest_city.clone(),
            date,
        }
    }
}

#[derive(Clone, Debug, CopyGetters, Getters, Serialize)]
/// Source selection plus the destination rows.
pub struct Board {
    #[getset(get = "pub")]
    source_city: Option<String>,

    #[getset(get_copy = "pub")]
    source_time: Option<TimeOfDay>,

    #[getset(get = "pub")]
    destinations: Vec<Destination>,

    #[serde(skip)]
    next_id: RowId,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board without source selection and a single empty destination.
    pub fn new() -> Self {
        Self {
            source_city: None,
            source_time: None,
            destinations: vec![Destination::new(0)],
            next_id: 1,
        }
    }

    /// Whether a destination may be removed.
    pub fn can_remove(&self) -> bool {
        self.destinations.len() > 1
    }

    /// Whether any destination waits for a conversion.
    pub fn is_loading(&self) -> bool {
        self.destinations.iter().any(|d| d.pending)
    }

    /// Replace the source city and recompute every destination with a city.
    pub fn set_source_city<S: Into<String>>(&mut self, value: S) -> Vec<Ticket> {
        self.source_city = Some(value.into());
        self.recompute_all()
    }

    /// Replace the source time and recompute every destination with a city.
    pub fn set_source_time(&mut self, value: TimeOfDay) -> Vec<Ticket> {
        self.source_time = Some(value);
        self.recompute_all()
    }

    /// Replace the city of the destination at `index` and recompute only that row.
    pub fn set_destination_city<S: Into<String>>(
        &mut self,
        index: usize,
        value: S,
    ) -> Result<Vec<Ticket>, StateError> {
        let len = self.destinations.len();
        let row = self
            .destinations
            .get_mut(index)
            .ok_or(StateError::IndexOutOfRange { index, len })?;

        row.city = Some(value.into());
        row.clear();
        Ok(row
            .issue(self.source_city.as_deref(), self.source_time)
            .into_iter()
            .collect())
    }

    /// Append an empty destination.
    pub fn add_destination(&mut self) -> Vec<Ticket> {
        let id = self.next_id;
        self.next_id += 1;
        self.destinations.push(Destination::new(id));
        self.backfill()
    }

    /// Remove the destination at `index`, keeping at least one row.
    pub fn remove_destination(&mut self, index: usize) -> Result<Vec<Ticket>, StateError> {
        let len = self.destinations.len();
        if index >= len {
            return Err(StateError::IndexOutOfRange { index, len });
        }
        if !self.can_remove() {
            return Err(StateError::LastDestination);
        }

        self.destinations.remove(index);
        Ok(self.backfill())
    }

    /// Record the result of a ticket, returns `false` if the result is stale.
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        result: Result<ConversionResult, ConversionError>,
    ) -> bool {
        let Some(row) = self.destinations.iter_mut().find(|d| d.id == ticket.row) else {
            debug!("Dropping result for removed destination {}", ticket.row);
            return false;
        };
        if row.generation != ticket.generation {
            debug!(
                "Dropping stale result for destination {} (generation {} != {})",
                ticket.row, ticket.generation, row.generation
            );
            return false;
        }

        row.pending = false;
        row.outcome = match result {
            Ok(result) => Outcome::Ready(result),
            Err(_) => Outcome::Failed,
        };
        true
    }

    fn recompute_all(&mut self) -> Vec<Ticket> {
        let source_city = self.source_city.as_deref();
        let source_time = self.source_time;
        self.destinations
            .iter_mut()
            .filter_map(|row| {
                row.clear();
                row.issue(source_city, source_time)
            })
            .collect()
    }

    /// Runs after the number of destinations changed.
    fn backfill(&mut self) -> Vec<Ticket> {
        let source_city = self.source_city.as_deref();
        let source_time = self.source_time;
        self.destinations
            .iter_mut()
            .filter(|row| row.city.is_some() && row.outcome == Outcome::Blank && !row.pending)
            .filter_map(|row| row.issue(source_city, source_time))
            .collect()
    }
}
