use crate::error::Error;
use crate::types::{QueueId, Timestamp};
use std::str::FromStr;

/// A unit of work pulled from the input trace.
///
/// Immutable after construction except for `start_time`, which is set
/// exactly once when the job is placed on a VM.
#[derive(Debug, Clone)]
pub struct Job {
    uid: String,
    queue: QueueId,
    arrival: Timestamp,
    length: f64,
    start_time: Option<Timestamp>,
}

impl Job {
    pub fn new(uid: impl Into<String>, queue: QueueId, arrival: Timestamp, length: f64) -> Result<Self, Error> {
        if !length.is_finite() || length < 0.0 {
            return Err(Error::Parse(format!("bad job length: {length}")));
        }
        Ok(Job {
            uid: uid.into(),
            queue,
            arrival,
            length,
            start_time: None,
        })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn queue(&self) -> QueueId {
        self.queue
    }

    pub fn arrival(&self) -> Timestamp {
        self.arrival
    }

    /// Run length in seconds; may be fractional.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    /// Records where the job was started. One-shot: a second call fails.
    pub fn place(&mut self, at: Timestamp) -> Result<(), Error> {
        if self.start_time.is_some() {
            return Err(Error::AlreadyPlaced(self.uid.clone()));
        }
        self.start_time = Some(at);
        Ok(())
    }

    /// The instant the job stops occupying its VM, in fractional epoch
    /// seconds. `None` until the job is placed.
    pub fn finish_secs(&self) -> Option<f64> {
        self.start_time
            .map(|start| start.as_secs() as f64 + self.length)
    }
}

impl FromStr for Job {
    type Err = Error;

    /// Parses one five-field input record:
    /// `YYYY-MM-DD HH:MM:SS <uid> <queue> <length>`.
    fn from_str(line: &str) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [date, time, uid, queue, length] = fields.as_slice() else {
            return Err(Error::Parse(format!(
                "expected 5 fields, got {}: {line:?}",
                fields.len()
            )));
        };
        let arrival = Timestamp::parse(date, time)?;
        let queue: QueueId = queue.parse()?;
        let length: f64 = length
            .parse()
            .map_err(|e| Error::Parse(format!("bad job length '{length}': {e}")))?;
        Job::new(*uid, queue, arrival, length)
    }
}
