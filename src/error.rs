// error.rs - Error types for rescan.
//
// One variant per fatal failure class. Recoverable conditions (unknown
// encoding names, per-element encoding mismatches) are logged and degrade
// the affected element instead of surfacing here.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for compilation, I/O and substitution operations.
#[derive(Debug)]
pub enum Error {
    /// The pattern was rejected by the matching engine. Carries the
    /// engine's own diagnostic message.
    Compile { message: String },
    /// An unknown syntax dialect name was supplied.
    Config { message: String },
    /// A file source could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// Reading from a file or stream source failed mid-way.
    Read { source: io::Error },
    /// The engine violated a driver invariant (a reported match with no
    /// region 0, for instance).
    Engine { message: String },
    /// A `\k<name>` back-reference names no declared group.
    Reference { name: String },
    /// A `\N` back-reference is outside the pattern's group count.
    Range { number: usize, count: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile { message } => write!(f, "compile error: {}", message),
            Error::Config { message } => write!(f, "configuration error: {}", message),
            Error::Open { path, source } => {
                write!(f, "could not open {}: {}", path.display(), source)
            }
            Error::Read { source } => write!(f, "read failed: {}", source),
            Error::Engine { message } => write!(f, "engine error: {}", message),
            Error::Reference { name } => {
                write!(f, "back-reference \\k<{}> does not match a named group", name)
            }
            Error::Range { number, count } => write!(
                f,
                "back-reference \\{} is out of range for a pattern with {} group(s)",
                number, count
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { source, .. } | Error::Read { source } => Some(source),
            _ => None,
        }
    }
}

impl Error {
    pub(crate) fn engine(message: impl Into<String>) -> Error {
        Error::Engine { message: message.into() }
    }
}
