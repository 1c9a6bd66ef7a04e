//! Error type for machine operations

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum MachineError {
    /// A caller passed a value outside the operation's domain
    InvalidArgument { name: &'static str, reason: String },
    /// A configuration value breaks a table or timing invariant
    InvalidConfig { field: &'static str, reason: String },
    /// The host failed to render an outcome
    Display(String),
    /// Configuration JSON could not be parsed
    Parse(String),
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { name, reason } => {
                write!(f, "invalid argument `{name}`: {reason}")
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config field `{field}`: {reason}")
            }
            Self::Display(msg) => write!(f, "outcome display failed: {msg}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for MachineError {}

impl From<serde_json::Error> for MachineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
