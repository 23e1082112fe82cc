use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use crate::KeyIdentifier;

/// The result type used across the network core.
pub type Result<T> = std::result::Result<T, NetErr>;

/// The network core's error type.
#[derive(Debug)]
pub enum NetErr {
    /// Zero sized grids, layers or other unusable geometry.
    InvalidGeometry(String),
    EmptyOutputs,
    DuplicateLabel(KeyIdentifier),
    UnknownLabel(String),
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    InputSizeMismatch {
        got: usize,
        expected: usize,
    },
    NetworkNotFound {
        name: String,
    },
    /// A checkpoint record that can't be turned back into a network.
    Malformed {
        line: u64,
        reason: String,
    },
    Io(io::Error),
    Csv(csv::Error),
}

impl Display for NetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetErr::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            NetErr::EmptyOutputs => write!(f, "a network needs at least one output unit"),
            NetErr::DuplicateLabel(key) => write!(f, "output label {key} is used more than once"),
            NetErr::UnknownLabel(name) => write!(f, "unknown output label '{name}'"),
            NetErr::IndexOutOfRange { what, index, len } => {
                write!(f, "{what} index {index} is out of range, there are {len}")
            }
            NetErr::InputSizeMismatch { got, expected } => write!(
                f,
                "got {got} input intensities but the network has {expected} input units"
            ),
            NetErr::NetworkNotFound { name } => write!(f, "there is no network named '{name}'"),
            NetErr::Malformed { line, reason } => {
                write!(f, "malformed network record at line {line}: {reason}")
            }
            NetErr::Io(e) => write!(f, "io error: {e}"),
            NetErr::Csv(e) => write!(f, "record error: {e}"),
        }
    }
}

impl Error for NetErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetErr::Io(e) => Some(e),
            NetErr::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NetErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for NetErr {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}
