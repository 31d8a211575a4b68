#![deny(missing_docs)]

use crate::{
    backend, city,
    command::{Command, HELP},
    config::{Commands, Config, Output},
    render,
    session::Session,
    state::{Board, Outcome},
    time_of_day::TimeOfDay,
};
use anyhow::{bail, format_err, Context, Result};
use getset::Getters;
use std::{
    io::{self, IsTerminal, Write},
    str::FromStr,
};
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    runtime::Builder,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, prelude::*};

#[derive(Debug, Getters)]
/// The main application structure.
pub struct App {
    /// Application configuration.
    #[getset(get = "pub(crate)")]
    config: Config,
}

impl App {
    /// Create a new `App` instance from the command line.
    pub fn new() -> Result<Self> {
        let app = Self {
            config: Default::default(),
        };
        app.config().validate().context("validate config")?;
        Ok(app)
    }

    /// Start the `App` instance and consume it.
    pub fn start(self) -> Result<()> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        rt.block_on(self.run())
    }

    fn init_logging(&self) -> Result<()> {
        let level = LevelFilter::from_str(self.config().log_level().as_ref())
            .context("convert log level filter")?;

        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_writer(io::stderr)
            .with_filter(level);
        tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .context("init stderr fmt layer")?;

        info!("Set log level to: {}", self.config().log_level());
        Ok(())
    }

    async fn run(self) -> Result<()> {
        self.init_logging().context("init logging")?;

        match self.config().command().clone().unwrap_or(Commands::Interactive) {
            Commands::Cities => Self::print(&render::cities()),
            Commands::Times => Self::print(&render::times()),
            Commands::Convert { from, at, to } => self.convert(&from, at, &to).await,
            Commands::Interactive => self.interactive().await,
        }
    }

    fn session(&self) -> Result<Session> {
        let converter = backend::build(self.config()).context("build converter")?;
        Ok(Session::new(converter).with_date(self.config().date()))
    }

    /// Convert once and print the settled board.
    async fn convert(&self, from: &str, at: TimeOfDay, to: &[String]) -> Result<()> {
        Self::known_city(from)?;
        for city in to {
            Self::known_city(city)?;
        }

        let session = self.session()?;
        session.set_source_city(from)?;
        session.set_source_time(at)?;
        for (index, city) in to.iter().enumerate() {
            if index > 0 {
                session.add_destination()?;
            }
            session.set_destination_city(index, city)?;
        }
        session.settle().await;

        let board = session.snapshot()?;
        self.emit(&board, false)?;

        let failed = board
            .destinations()
            .iter()
            .filter(|d| d.outcome() == &Outcome::Failed)
            .count();
        if failed > 0 {
            bail!("{} of {} conversions failed", failed, board.destinations().len())
        }
        Ok(())
    }

    /// Run the prompt until `quit` or the end of input.
    async fn interactive(&self) -> Result<()> {
        let session = self.session()?;
        let prompt = io::stdin().is_terminal();
        let mut lines = BufReader::new(stdin()).lines();

        if prompt {
            Self::print(HELP)?;
        }
        self.emit(&session.snapshot()?, false)?;

        loop {
            if prompt {
                Self::print("> ")?;
            }
            let Some(line) = lines.next_line().await.context("read command")? else {
                debug!("Reached end of input");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            };
            debug!("Got command: {:?}", command);

            match command {
                Command::Quit => break,
                Command::Help => Self::print(HELP)?,
                Command::Cities => Self::print(&render::cities())?,
                Command::Times => Self::print(&render::times())?,
                Command::Show => self.emit(&session.snapshot()?, session.is_loading())?,
                command => match Self::apply(&session, command) {
                    Ok(()) => self.refresh(&session).await?,
                    Err(e) => {
                        warn!("Unable to apply command: {:#}", e);
                        eprintln!("{:#}", e);
                    }
                },
            }
        }

        session.settle().await;
        Ok(())
    }

    /// Apply a state changing command.
    fn apply(session: &Session, command: Command) -> Result<()> {
        match command {
            Command::Source(city) => session.set_source_city(Self::known_city(&city)?),
            Command::Time(time) => session.set_source_time(time),
            Command::Dest(index, city) => {
                session.set_destination_city(index, Self::known_city(&city)?)
            }
            Command::Add => session.add_destination(),
            Command::Remove(index) => session.remove_destination(index),
            other => Err(format_err!("{:?} does not change the converter", other)),
        }
    }

    /// Print the board, once while conversions are running and once when they settled.
    async fn refresh(&self, session: &Session) -> Result<()> {
        if session.is_loading() {
            self.emit(&session.snapshot()?, true)?;
            session.settle().await;
        }
        self.emit(&session.snapshot()?, false)
    }

    /// Resolve a city name case sensitively against the registry.
    fn known_city(name: &str) -> Result<&'static str> {
        city::find(name)
            .map(|c| c.name)
            .with_context(|| format!("unknown city '{}', see 'cities'", name))
    }

    fn emit(&self, board: &Board, loading: bool) -> Result<()> {
        match self.config().output() {
            Output::Text => Self::print(&render::board(board, loading)),
            Output::Json => Self::print(&format!("{}\n", render::json(board, loading)?)),
        }
    }

    fn print(text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).context("write to stdout")?;
        stdout.flush().context("flush stdout")
    }
}
