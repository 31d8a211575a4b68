//! Text and JSON projections of a [`Board`].
use crate::{city, state::Board, time_of_day::TimeOfDay};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

const TITLE: &str = "World Time Converter";
const CONVERTING: &str = "Converting...";
const SELECT_SOURCE_CITY: &str = "Select source city";
const SELECT_TIME: &str = "Select time";
const SELECT_DESTINATION_CITY: &str = "Select destination city";
const SELECT_CITIES_AND_TIME: &str = "Select cities and time";

/// Render the board as human readable text.
///
/// A row shows `Converting...` while its own conversion is outstanding.
/// The trailing status line reflects the shared `loading` flag.
pub fn board(board: &Board, loading: bool) -> String {
    TextView { board, loading }.to_string()
}

struct TextView<'a> {
    board: &'a Board,
    loading: bool,
}

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TITLE)?;
        writeln!(
            f,
            "Source City: {}",
            self.board.source_city().as_deref().unwrap_or(SELECT_SOURCE_CITY)
        )?;
        match self.board.source_time() {
            Some(t) => writeln!(f, "Source Time: {} HRS", t)?,
            None => writeln!(f, "Source Time: {}", SELECT_TIME)?,
        }

        for (i, row) in self.board.destinations().iter().enumerate() {
            writeln!(
                f,
                "Destination City {}: {}",
                i + 1,
                row.city().as_deref().unwrap_or(SELECT_DESTINATION_CITY)
            )?;
            if row.pending() {
                writeln!(f, "  Time: {}", CONVERTING)?;
            } else if row.outcome().time().is_empty() {
                writeln!(f, "  Time: {}", SELECT_CITIES_AND_TIME)?;
            } else {
                writeln!(f, "  Time: {}{}", row.outcome().time(), row.outcome().date())?;
            }
        }

        if self.loading {
            writeln!(f, "{}", CONVERTING)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct View<'a> {
    loading: bool,

    #[serde(flatten)]
    board: &'a Board,
}

/// Render the board as a single line JSON document.
pub fn json(board: &Board, loading: bool) -> Result<String> {
    serde_json::to_string(&View { loading, board }).context("serialize board")
}

/// All selectable cities together with their time zone.
pub fn cities() -> String {
    let width = city::all().iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
    city::all()
        .iter()
        .map(|c| format!("{:<width$}  {}\n", c.name, c.timezone, width = width))
        .collect()
}

/// All selectable source times.
pub fn times() -> String {
    TimeOfDay::all().map(|t| format!("{} HRS\n", t)).collect()
}
