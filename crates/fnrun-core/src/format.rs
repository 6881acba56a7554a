use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

/// Wire convention used to hand a request to a function container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionFormat {
    /// Request metadata in `FN_*` environment variables, body on stdin.
    /// One request per container.
    #[default]
    Default,
    /// Full HTTP/1.1 request frames on stdin. Hot.
    Http,
    /// One JSON record per line on stdin, one response record per line on
    /// stdout. Hot.
    Json,
}

impl ExecutionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionFormat::Default => "default",
            ExecutionFormat::Http => "http",
            ExecutionFormat::Json => "json",
        }
    }

    /// Whether a single container reads several multiplexed requests from
    /// one stdin stream.
    pub fn is_hot(&self) -> bool {
        match self {
            ExecutionFormat::Default => false,
            ExecutionFormat::Http | ExecutionFormat::Json => true,
        }
    }
}

impl fmt::Display for ExecutionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionFormat {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(ExecutionFormat::Default),
            "http" => Ok(ExecutionFormat::Http),
            "json" => Ok(ExecutionFormat::Json),
            _ => Err(EnvelopeError::UnknownFormat(s.to_string())),
        }
    }
}
