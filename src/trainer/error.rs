use std::{error::Error, fmt, io};

use crate::NetErr;

/// The trainer module's result type.
pub type Result<T> = std::result::Result<T, TrainerErr>;

/// Training session failures.
#[derive(Debug)]
pub enum TrainerErr {
    AlreadyRunning,
    NotRunning,
    /// The collaborators were lost with a session that didn't finish cleanly.
    CollaboratorsLost,
    InvalidConfig(String),
    InvalidReward(String),
    /// The reward program hung up.
    ChannelClosed,
    Io(io::Error),
    Json(serde_json::Error),
    Net(NetErr),
    Join(String),
}

impl fmt::Display for TrainerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerErr::AlreadyRunning => write!(f, "a session is already running"),
            TrainerErr::NotRunning => write!(f, "no session is running"),
            TrainerErr::CollaboratorsLost => {
                write!(f, "the collaborators were lost with the last session")
            }
            TrainerErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            TrainerErr::InvalidReward(line) => write!(f, "invalid reward '{line}'"),
            TrainerErr::ChannelClosed => write!(f, "the reward channel was closed"),
            TrainerErr::Io(e) => write!(f, "io error: {e}"),
            TrainerErr::Json(e) => write!(f, "json error: {e}"),
            TrainerErr::Net(e) => write!(f, "network error: {e}"),
            TrainerErr::Join(msg) => write!(f, "training task failed: {msg}"),
        }
    }
}

impl Error for TrainerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainerErr::Io(e) => Some(e),
            TrainerErr::Json(e) => Some(e),
            TrainerErr::Net(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrainerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for TrainerErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<NetErr> for TrainerErr {
    fn from(value: NetErr) -> Self {
        Self::Net(value)
    }
}
