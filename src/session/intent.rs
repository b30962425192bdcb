//! Player intents forwarded from the presentation layer

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Something the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    SelectHorse(usize),
    SelectBet(u64),
    Start,
    Pause,
    Resume,
    Exit,
    ResetBalance,
}

/// Whether an intent changed the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Guard failed or the intent has no transition from the current mode
    Ignored,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIntentError(pub String);

impl std::fmt::Display for ParseIntentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognised command: {}", self.0)
    }
}

impl std::error::Error for ParseIntentError {}

/// Parses terminal commands. Horses are numbered from 1 as shown on screen.
impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        let err = || ParseIntentError(s.trim().to_string());

        let intent = match (command.as_str(), arg) {
            ("horse" | "h", Some(n)) => {
                let number: usize = n.parse().map_err(|_| err())?;
                Intent::SelectHorse(number.checked_sub(1).ok_or_else(err)?)
            }
            ("bet" | "b", Some(a)) => Intent::SelectBet(a.parse().map_err(|_| err())?),
            ("start" | "go", None) => Intent::Start,
            ("pause" | "p", None) => Intent::Pause,
            ("resume" | "r", None) => Intent::Resume,
            ("exit" | "menu" | "x", None) => Intent::Exit,
            ("reset", None) => Intent::ResetBalance,
            _ => return Err(err()),
        };

        if words.next().is_some() {
            return Err(err());
        }
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_horse_is_one_based() {
        assert_eq!("horse 3".parse::<Intent>(), Ok(Intent::SelectHorse(2)));
        assert_eq!("h 1".parse::<Intent>(), Ok(Intent::SelectHorse(0)));
        assert!("horse 0".parse::<Intent>().is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("start".parse::<Intent>(), Ok(Intent::Start));
        assert_eq!(" PAUSE ".parse::<Intent>(), Ok(Intent::Pause));
        assert_eq!("r".parse::<Intent>(), Ok(Intent::Resume));
        assert_eq!("menu".parse::<Intent>(), Ok(Intent::Exit));
        assert_eq!("reset".parse::<Intent>(), Ok(Intent::ResetBalance));
        assert_eq!("bet 50".parse::<Intent>(), Ok(Intent::SelectBet(50)));
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!("bet fifty".parse::<Intent>().is_err());
        assert!("start now".parse::<Intent>().is_err());
        assert!("".parse::<Intent>().is_err());
        assert!("horse".parse::<Intent>().is_err());
    }
}
