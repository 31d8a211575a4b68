//! Configuration related structures
use crate::time_of_day::TimeOfDay;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use getset::{CopyGetters, Getters};
use hyper::Uri;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{AsRefStr, Display};

macro_rules! prefix {
    () => {
        "WORLDTIME_"
    };
}

#[derive(CopyGetters, Debug, Deserialize, Eq, Getters, Parser, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[command(version, after_help("Cities are matched by their exact display name, see `worldtime cities`."))]
/// Convert a time of day in one city into the local time of other cities.
pub struct Config {
    #[get = "pub"]
    #[command(subcommand)]
    /// Possible subcommands, defaults to `interactive`.
    command: Option<Commands>,

    #[get_copy = "pub"]
    #[arg(
        default_value_t,
        env(concat!(prefix!(), "LOG_LEVEL")),
        long("log-level"),
        short('l'),
        value_enum,
        value_name("LEVEL")
    )]
    /// The logging level, logs are written to stderr.
    log_level: LogLevel,

    #[get_copy = "pub"]
    #[arg(
        default_value_t,
        env(concat!(prefix!(), "BACKEND")),
        long("backend"),
        short('b'),
        value_enum,
        value_name("BACKEND")
    )]
    /// The time zone conversion backend.
    backend: Backend,

    #[get = "pub"]
    #[arg(
        default_value(crate::backend::DEFAULT_ENDPOINT),
        env(concat!(prefix!(), "ENDPOINT")),
        long("endpoint"),
        short('e'),
        value_name("URL")
    )]
    /// Conversion endpoint used by the `timeapi` backend.
    endpoint: String,

    #[get_copy = "pub"]
    #[arg(
        default_value_t = 10,
        env(concat!(prefix!(), "TIMEOUT")),
        long("timeout"),
        short('t'),
        value_name("SECONDS")
    )]
    /// Maximum duration of a single conversion request.
    timeout: u64,

    #[get_copy = "pub"]
    #[arg(
        env(concat!(prefix!(), "DATE")),
        long("date"),
        short('d'),
        value_name("YYYY-MM-DD")
    )]
    /// Calendar date of the source time, defaults to today.
    date: Option<NaiveDate>,

    #[get_copy = "pub"]
    #[arg(
        default_value_t,
        env(concat!(prefix!(), "OUTPUT")),
        long("output"),
        short('o'),
        value_enum,
        value_name("FORMAT")
    )]
    /// Output format of the rendered board.
    output: Output,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Subcommand)]
/// Possible subcommands.
pub enum Commands {
    /// Run an interactive prompt to pick a source and any number of destinations.
    Interactive,

    /// Convert a source time once and print the result.
    Convert {
        #[arg(long("from"), short('f'), value_name("CITY"))]
        /// The source city.
        from: String,

        #[arg(long("at"), short('a'), value_name("HH:MM"))]
        /// The source time of day, on a full or half hour.
        at: TimeOfDay,

        #[arg(long("to"), required(true), value_name("CITY"))]
        /// Destination cities, may be given multiple times.
        to: Vec<String>,
    },

    /// List all known cities and their time zones.
    Cities,

    /// List all selectable source times.
    Times,
}

#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    PartialEq,
    Serialize,
    ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
/// Available log levels.
pub enum LogLevel {
    /// Trace level, the most verbose one.
    Trace,

    /// Debug level, less verbose than trace.
    Debug,

    /// Info level, less verbose than debug.
    Info,

    /// Warn level, less verbose than info.
    #[default]
    Warn,

    /// Error level, showing only errors.
    Error,

    /// Disable logging.
    Off,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
/// Available conversion backends.
pub enum Backend {
    /// Convert through the timeapi.io web service.
    #[default]
    #[value(name = "timeapi")]
    TimeApi,

    /// Convert with the local tz database.
    Local,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
/// Available output formats.
pub enum Output {
    /// Human readable text.
    #[default]
    Text,

    /// One JSON document per rendering.
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse()
    }
}

impl Config {
    /// Validate the configuration integrity.
    pub fn validate(&self) -> Result<()> {
        const TIMEOUT_FLAG: &str = "--timeout";
        if self.timeout() == 0 {
            bail!("{} must be greater than zero", TIMEOUT_FLAG)
        }

        if self.backend() == Backend::TimeApi {
            self.endpoint_uri()?;
        }

        Ok(())
    }

    /// The parsed conversion endpoint.
    pub fn endpoint_uri(&self) -> Result<Uri> {
        const ENDPOINT_FLAG: &str = "--endpoint";
        let uri: Uri = self
            .endpoint()
            .parse()
            .with_context(|| {
                format!("{} '{}' is not a valid URL", ENDPOINT_FLAG, self.endpoint())
            })?;

        match uri.scheme_str() {
            Some("http") | Some("https") if uri.host().is_some() => Ok(uri),
            _ => bail!(
                "{} '{}' must be an absolute http or https URL",
                ENDPOINT_FLAG,
                self.endpoint()
            ),
        }
    }

    /// The per request timeout.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout())
    }
}
