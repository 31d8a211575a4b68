//! Drives a [`Board`] by running the conversions its transitions ask for.
use crate::{
    conversion::{self, ConversionError, ConversionResult, ZoneConverter},
    inflight::InFlight,
    state::{Board, Ticket},
    time_of_day::TimeOfDay,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use getset::CopyGetters;
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, debug_span, error, warn, Instrument};

#[derive(CopyGetters)]
/// A board together with the converter used to fill it.
pub struct Session {
    board: Arc<Mutex<Board>>,

    converter: Arc<dyn ZoneConverter>,

    inflight: InFlight,

    #[getset(get_copy = "pub")]
    /// Calendar date used for the source time, `None` means today.
    date: Option<NaiveDate>,
}

impl Session {
    /// Create a new session with an empty board.
    pub fn new(converter: Arc<dyn ZoneConverter>) -> Self {
        Self {
            board: Arc::default(),
            converter,
            inflight: InFlight::new(),
            date: None,
        }
    }

    /// Use a fixed calendar date instead of the current local date.
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    /// A copy of the current board.
    pub fn snapshot(&self) -> Result<Board> {
        Ok(lock!(self.board).clone())
    }

    /// Whether at least one conversion is outstanding.
    pub fn is_loading(&self) -> bool {
        self.inflight.is_loading()
    }

    /// Wait until every outstanding conversion finished.
    pub async fn settle(&self) {
        self.inflight.wait_idle().await
    }

    pub fn set_source_city(&self, value: &str) -> Result<()> {
        let tickets = lock!(self.board).set_source_city(value);
        self.dispatch(tickets);
        Ok(())
    }

    pub fn set_source_time(&self, value: TimeOfDay) -> Result<()> {
        let tickets = lock!(self.board).set_source_time(value);
        self.dispatch(tickets);
        Ok(())
    }

    pub fn set_destination_city(&self, index: usize, value: &str) -> Result<()> {
        let tickets = lock!(self.board).set_destination_city(index, value)?;
        self.dispatch(tickets);
        Ok(())
    }

    pub fn add_destination(&self) -> Result<()> {
        let tickets = lock!(self.board).add_destination();
        self.dispatch(tickets);
        Ok(())
    }

    pub fn remove_destination(&self, index: usize) -> Result<()> {
        let tickets = lock!(self.board).remove_destination(index)?;
        self.dispatch(tickets);
        Ok(())
    }

    /// Spawn one conversion task per ticket.
    fn dispatch(&self, tickets: Vec<Ticket>) {
        if tickets.is_empty() {
            return;
        }
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());

        for ticket in tickets {
            let activity = self.inflight.activity();
            let board = self.board.clone();
            let converter = self.converter.clone();
            let span = debug_span!("conversion", row = ticket.row(), dest = %ticket.dest_city());

            task::spawn(
                async move {
                    let result = conversion::convert(&*converter, &ticket.request(date)).await;
                    if let Err(e) = &result {
                        warn!("Error converting time: {}", e);
                    }
                    if let Err(e) = Self::complete(&board, &ticket, result) {
                        error!("Unable to record conversion result: {:#}", e);
                    }
                    drop(activity);
                }
                .instrument(span),
            );
        }
    }

    fn complete(
        board: &Mutex<Board>,
        ticket: &Ticket,
        result: Result<ConversionResult, ConversionError>,
    ) -> Result<()> {
        if lock!(board).complete(ticket, result) {
            debug!("Updated destination {}", ticket.row());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        conversion::{Converted, DayOffset, MockZoneConverter, ERROR_TEXT},
        state::Outcome,
    };
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::time::Duration;
    use tokio::{sync::Notify, time};

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, 15)
    }

    fn time(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn echo(at: NaiveDateTime) -> Result<Converted, ConversionError> {
        Ok(Converted {
            time: at.format("%H:%M").to_string(),
            date_time: at,
        })
    }

    fn new_sut(mock: MockZoneConverter) -> Session {
        Session::new(Arc::new(mock)).with_date(date())
    }

    #[tokio::test]
    async fn failure_shows_error_and_clears_loading() -> Result<()> {
        let mut mock = MockZoneConverter::new();
        mock.expect_convert()
            .times(1)
            .returning(|_, _, _| Err(ConversionError::ConversionFailed("status 500".into())));

        let sut = new_sut(mock);
        sut.set_source_city("London")?;
        sut.set_source_time(time("09:00"))?;
        sut.set_destination_city(0, "Tokyo")?;
        sut.settle().await;

        let board = sut.snapshot()?;
        let row = &board.destinations()[0];
        assert_eq!(row.outcome(), &Outcome::Failed);
        assert_eq!(row.outcome().time(), ERROR_TEXT);
        assert_eq!(row.outcome().date(), "");
        assert!(!sut.is_loading());
        assert!(!board.is_loading());
        Ok(())
    }

    #[tokio::test]
    async fn same_zone_keeps_source_time() -> Result<()> {
        let mut mock = MockZoneConverter::new();
        mock.expect_convert()
            .withf(|from, at, to| {
                from.to_string() == "Asia/Kolkata"
                    && to.to_string() == "Asia/Kolkata"
                    && at.to_string() == "2024-01-15 21:30:00"
            })
            .times(1)
            .returning(|_, at, _| echo(at));

        let sut = new_sut(mock);
        sut.set_destination_city(0, "New Delhi")?;
        sut.set_source_city("Mumbai")?;
        sut.set_source_time(time("21:30"))?;
        sut.settle().await;

        let board = sut.snapshot()?;
        let outcome = board.destinations()[0].outcome();
        assert_eq!(outcome.time(), "21:30");
        assert_eq!(outcome.date(), "");
        Ok(())
    }

    #[tokio::test]
    async fn adding_a_row_only_converts_once_it_has_a_city() -> Result<()> {
        let mut mock = MockZoneConverter::new();
        mock.expect_convert()
            .withf(|_, _, to| to.to_string() == "Europe/Paris")
            .times(1)
            .returning(|_, at, _| echo(at));

        let sut = new_sut(mock);
        sut.set_source_city("London")?;
        sut.set_source_time(time("09:00"))?;
        sut.add_destination()?;
        assert!(!sut.is_loading());

        sut.set_destination_city(1, "Paris")?;
        sut.settle().await;
        assert_eq!(sut.snapshot()?.destinations()[1].outcome().time(), "09:00");
        Ok(())
    }

    #[tokio::test]
    async fn next_day_annotation() -> Result<()> {
        let mut mock = MockZoneConverter::new();
        mock.expect_convert().times(1).returning(|_, _, _| {
            Ok(Converted {
                time: "16:00".into(),
                date_time: NaiveDateTime::parse_from_str("2024-01-16 16:00", "%Y-%m-%d %H:%M")
                    .unwrap(),
            })
        });

        let sut = new_sut(mock);
        sut.set_source_city("Los Angeles")?;
        sut.set_source_time(time("23:00"))?;
        sut.set_destination_city(0, "Tokyo")?;
        sut.settle().await;

        let board = sut.snapshot()?;
        let outcome = board.destinations()[0].outcome();
        assert_eq!(outcome.time(), "16:00");
        assert_eq!(outcome.date(), DayOffset::Next.annotation());
        Ok(())
    }

    #[tokio::test]
    async fn removing_the_last_row_fails() -> Result<()> {
        let sut = new_sut(MockZoneConverter::new());
        assert!(sut.remove_destination(0).is_err());
        assert_eq!(sut.snapshot()?.destinations().len(), 1);
        Ok(())
    }

    /// Blocks every conversion until released.
    struct Gated(Arc<Notify>);

    #[async_trait]
    impl ZoneConverter for Gated {
        async fn convert(
            &self,
            _: &str,
            at: NaiveDateTime,
            _: &str,
        ) -> Result<Converted, ConversionError> {
            self.0.notified().await;
            echo(at)
        }
    }

    #[tokio::test]
    async fn loading_while_in_flight() -> Result<()> {
        let gate = Arc::new(Notify::new());
        let sut = Session::new(Arc::new(Gated(gate.clone()))).with_date(date());
        sut.set_source_city("London")?;
        sut.set_source_time(time("09:00"))?;
        sut.set_destination_city(0, "Tokyo")?;

        assert!(sut.is_loading());
        assert!(sut.snapshot()?.destinations()[0].pending());

        gate.notify_one();
        time::timeout(Duration::from_secs(5), sut.settle()).await?;
        assert!(!sut.is_loading());
        assert!(!sut.snapshot()?.destinations()[0].pending());
        Ok(())
    }

    /// Answers slower for Tokyo than for any other zone.
    struct Slow;

    #[async_trait]
    impl ZoneConverter for Slow {
        async fn convert(
            &self,
            _: &str,
            at: NaiveDateTime,
            to_zone: &str,
        ) -> Result<Converted, ConversionError> {
            if to_zone == "Asia/Tokyo" {
                time::sleep(Duration::from_millis(100)).await;
            }
            Ok(Converted {
                time: to_zone.into(),
                date_time: at,
            })
        }
    }

    #[tokio::test]
    async fn late_results_do_not_overwrite_newer_selection() -> Result<()> {
        let sut = Session::new(Arc::new(Slow)).with_date(date());
        sut.set_source_city("London")?;
        sut.set_source_time(time("09:00"))?;
        sut.set_destination_city(0, "Tokyo")?;
        sut.set_destination_city(0, "Sydney")?;
        time::timeout(Duration::from_secs(5), sut.settle()).await?;

        let board = sut.snapshot()?;
        assert_eq!(board.destinations()[0].city().as_deref(), Some("Sydney"));
        assert_eq!(board.destinations()[0].outcome().time(), "Australia/Sydney");
        Ok(())
    }
}
