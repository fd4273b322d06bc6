use crate::types::{QueueId, Timestamp};
use std::fmt;

/// A VM lifecycle verb on the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Launch,
    Terminate,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandKind::Launch => "launch",
            CommandKind::Terminate => "terminate",
        })
    }
}

/// An output record instructing the fleet to launch or terminate one VM in
/// a queue. Wire shape: `YYYY-MM-DD HH:MM:SS launch|terminate <queue>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub at: Timestamp,
    pub kind: CommandKind,
    pub queue: QueueId,
}

impl Command {
    pub fn launch(at: Timestamp, queue: QueueId) -> Self {
        Command {
            at,
            kind: CommandKind::Launch,
            queue,
        }
    }

    pub fn terminate(at: Timestamp, queue: QueueId) -> Self {
        Command {
            at,
            kind: CommandKind::Terminate,
            queue,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.at, self.kind, self.queue)
    }
}
