use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three fixed workload classes. Each queue owns an independent
/// pool of VMs; there is no cross-queue sharing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueId {
    Export,
    Url,
    General,
}

impl QueueId {
    /// All queues, in the order pools are initialized and drained.
    pub const ALL: [QueueId; 3] = [QueueId::Export, QueueId::Url, QueueId::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueId::Export => "export",
            QueueId::Url => "url",
            QueueId::General => "general",
        }
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "export" => Ok(QueueId::Export),
            "url" => Ok(QueueId::Url),
            "general" => Ok(QueueId::General),
            other => Err(Error::UnknownQueue(other.to_string())),
        }
    }
}
