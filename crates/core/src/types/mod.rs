mod command;
mod job;
mod queue;
mod time;

pub use command::{Command, CommandKind};
pub use job::Job;
pub use queue::QueueId;
pub use time::Timestamp;
