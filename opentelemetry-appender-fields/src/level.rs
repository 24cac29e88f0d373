use std::fmt;
use std::str::FromStr;

/// Logging priority of an entry, as assigned by the upstream logger.
///
/// Levels are ordered, higher is more important. The well-known levels are
/// exposed as associated constants; any other `i8` is still a valid (if
/// unrecognized) level so that conversions stay total. Defaults to
/// [`Level::INFO`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i8);

impl Level {
    /// Debug logs are typically voluminous and disabled in production.
    pub const DEBUG: Level = Level(-1);
    /// Default logging priority.
    pub const INFO: Level = Level(0);
    /// More important than info, but does not need individual human review.
    pub const WARN: Level = Level(1);
    /// High-priority; an application running smoothly should not emit any.
    pub const ERROR: Level = Level(2);
    /// Particularly important errors. In development the upstream logger panics.
    pub const DPANIC: Level = Level(3);
    /// The upstream logger panics after writing the entry.
    pub const PANIC: Level = Level(4);
    /// The upstream logger exits the process after writing the entry.
    pub const FATAL: Level = Level(5);

    /// Creates a level from its raw representation.
    pub const fn from_i8(value: i8) -> Self {
        Level(value)
    }

    /// Returns the raw representation of this level.
    pub const fn as_i8(self) -> i8 {
        self.0
    }

    /// Returns the upper-case name of a well-known level, `None` otherwise.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            -1 => Some("DEBUG"),
            0 => Some("INFO"),
            1 => Some("WARN"),
            2 => Some("ERROR"),
            3 => Some("DPANIC"),
            4 => Some("PANIC"),
            5 => Some("FATAL"),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "LEVEL({})", self.0),
        }
    }
}

/// Error returned when a string cannot be parsed into a [`Level`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized level: {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::DEBUG),
            "info" | "" => Ok(Level::INFO),
            "warn" | "warning" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            "dpanic" => Ok(Level::DPANIC),
            "panic" => Ok(Level::PANIC),
            "fatal" => Ok(Level::FATAL),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::DEBUG < Level::INFO);
        assert!(Level::WARN < Level::ERROR);
        assert!(Level::ERROR < Level::DPANIC);
        assert!(Level::PANIC < Level::FATAL);
        assert!(Level::from_i8(42) > Level::FATAL);
    }

    #[test]
    fn parse_level_names() {
        assert_eq!("debug".parse::<Level>(), Ok(Level::DEBUG));
        assert_eq!("INFO".parse::<Level>(), Ok(Level::INFO));
        assert_eq!(" Warning ".parse::<Level>(), Ok(Level::WARN));
        assert_eq!("dpanic".parse::<Level>(), Ok(Level::DPANIC));
        assert_eq!("Fatal".parse::<Level>(), Ok(Level::FATAL));

        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized level: \"verbose\"");
    }

    #[test]
    fn default_is_info() {
        assert_eq!(Level::default(), Level::INFO);
    }

    #[test]
    fn display_unknown_level() {
        assert_eq!(Level::ERROR.to_string(), "ERROR");
        assert_eq!(Level::from_i8(-7).to_string(), "LEVEL(-7)");
        assert_eq!(Level::from_i8(-7).name(), None);
    }
}
