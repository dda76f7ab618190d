//! Line commands understood by the interactive host.

use anyhow::{anyhow, bail, Result};

use crate::timer::Mode;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle,
    Start,
    Pause,
    /// Reset to the given mode, or to the current one when `None`
    Reset(Option<Mode>),
    Switch,
    SetMode(Mode),
    Sound(String),
    StopSound,
    Volume(f32),
    Status,
    Sounds,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("too many arguments for '{}'", verb);
        }

        let command = match (verb.to_lowercase().as_str(), arg) {
            ("toggle" | "t", None) => Command::Toggle,
            ("start", None) => Command::Start,
            ("pause", None) => Command::Pause,
            ("reset" | "r", None) => Command::Reset(None),
            ("reset" | "r", Some(mode)) => Command::Reset(Some(parse_mode(mode)?)),
            ("switch" | "skip" | "s", None) => Command::Switch,
            ("mode", Some(mode)) => Command::SetMode(parse_mode(mode)?),
            ("sound", Some(id)) => Command::Sound(id.to_string()),
            ("stop", None) => Command::StopSound,
            ("volume" | "vol", Some(value)) => Command::Volume(
                value
                    .parse()
                    .map_err(|_| anyhow!("volume must be a number, got '{}'", value))?,
            ),
            ("status", None) => Command::Status,
            ("sounds", None) => Command::Sounds,
            ("quit" | "exit" | "q", None) => Command::Quit,
            (other, _) => bail!("unknown command '{}'", other),
        };
        Ok(Some(command))
    }
}

fn parse_mode(raw: &str) -> Result<Mode> {
    Ok(raw.parse::<Mode>()?)
}
