//! The line oriented command language of the interactive prompt.
use crate::time_of_day::{ParseTimeOfDayError, TimeOfDay};
use std::str::FromStr;
use thiserror::Error;

/// Help text of the interactive prompt.
pub const HELP: &str = "\
Commands:
  source <city>       select the source city
  time <HH:MM>        select the source time (full or half hour)
  dest <n> <city>     select the city of destination n
  add                 add a destination
  remove <n>          remove destination n
  show                print the converter
  cities              list all cities
  times               list all source times
  help                print this help
  quit                leave the prompt
";

/// A single parsed prompt line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Source(String),
    Time(TimeOfDay),
    /// Zero based destination index plus city.
    Dest(usize, String),
    Add,
    /// Zero based destination index.
    Remove(usize),
    Show,
    Cities,
    Times,
    Help,
    Quit,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{0}' expects {1}")]
    MissingArgument(&'static str, &'static str),

    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(&'static str),

    #[error("invalid destination number '{0}', numbering starts at 1")]
    InvalidIndex(String),

    #[error(transparent)]
    InvalidTime(#[from] ParseTimeOfDayError),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "" => Err(ParseCommandError::Empty),
            "source" => Ok(Self::Source(required("source", "a city", rest)?.into())),
            "time" => Ok(Self::Time(required("time", "a time", rest)?.parse()?)),
            "dest" => {
                let rest = required("dest", "a number and a city", rest)?;
                let (index, city) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(ParseCommandError::MissingArgument("dest", "a number and a city"))?;
                Ok(Self::Dest(parse_index(index)?, city.trim().into()))
            }
            "remove" => Ok(Self::Remove(parse_index(required("remove", "a number", rest)?)?)),
            "add" => no_argument("add", rest, Self::Add),
            "show" => no_argument("show", rest, Self::Show),
            "cities" => no_argument("cities", rest, Self::Cities),
            "times" => no_argument("times", rest, Self::Times),
            "help" => no_argument("help", rest, Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(ParseCommandError::Unknown(name.into())),
        }
    }
}

fn required<'a>(
    name: &'static str,
    what: &'static str,
    rest: &'a str,
) -> Result<&'a str, ParseCommandError> {
    if rest.is_empty() {
        Err(ParseCommandError::MissingArgument(name, what))
    } else {
        Ok(rest)
    }
}

fn no_argument(name: &'static str, rest: &str, command: Command) -> Result<Command, ParseCommandError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseCommandError::UnexpectedArgument(name))
    }
}

/// Parse a one based index into a zero based one.
fn parse_index(s: &str) -> Result<usize, ParseCommandError> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(ParseCommandError::InvalidIndex(s.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        let cases = [
            ("source New York", Command::Source("New York".into())),
            ("  SOURCE   São Paulo  ", Command::Source("São Paulo".into())),
            ("time 09:30", Command::Time("09:30".parse().unwrap())),
            ("dest 1 Tokyo", Command::Dest(0, "Tokyo".into())),
            ("dest 3   Los Angeles", Command::Dest(2, "Los Angeles".into())),
            ("add", Command::Add),
            ("remove 2", Command::Remove(1)),
            ("show", Command::Show),
            ("cities", Command::Cities),
            ("times", Command::Times),
            ("help", Command::Help),
            ("quit", Command::Quit),
            ("exit", Command::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>(), Ok(expected), "{}", line);
        }
    }

    #[test]
    fn parse_failures() {
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!("   ".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "jump".parse::<Command>(),
            Err(ParseCommandError::Unknown("jump".into()))
        );
        assert_eq!(
            "source".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("source", "a city"))
        );
        assert_eq!(
            "dest 1".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("dest", "a number and a city"))
        );
        assert_eq!(
            "dest 0 Tokyo".parse::<Command>(),
            Err(ParseCommandError::InvalidIndex("0".into()))
        );
        assert_eq!(
            "remove two".parse::<Command>(),
            Err(ParseCommandError::InvalidIndex("two".into()))
        );
        assert_eq!(
            "add 2".parse::<Command>(),
            Err(ParseCommandError::UnexpectedArgument("add"))
        );
        assert!(matches!(
            "time 09:15".parse::<Command>(),
            Err(ParseCommandError::InvalidTime(_))
        ));
    }
}
