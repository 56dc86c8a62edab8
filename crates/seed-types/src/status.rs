use std::fmt;

use serde::{Deserialize, Serialize};

/// Batch lifecycle as reported by the ledger's status endpoint.
///
/// A batch is `Pending` from submission until the ledger processes it, then
/// moves to exactly one of `Committed` or `Invalid`. `Unknown` means the
/// ledger has no record of the id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Pending,
    Committed,
    Invalid,
    Unknown,
}

impl BatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Invalid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Committed => "COMMITTED",
            Self::Invalid => "INVALID",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
