use crate::types::Timestamp;

/// Errors that can occur while driving the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed input record: {0}")]
    Parse(String),

    #[error("unknown queue: {0}")]
    UnknownQueue(String),

    #[error("no VM free within slack for job {uid} at {at}")]
    PlacementFailed { uid: String, at: Timestamp },

    #[error("job {0} has already been placed")]
    AlreadyPlaced(String),

    #[error("VM is already running a job")]
    VmBusy,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_parse() {
        let err = Error::Parse("expected 5 fields, got 3".to_string());
        assert_eq!(
            err.to_string(),
            "malformed input record: expected 5 fields, got 3"
        );
    }

    #[test]
    fn error_display_unknown_queue() {
        let err = Error::UnknownQueue("batch".to_string());
        assert_eq!(err.to_string(), "unknown queue: batch");
    }

    #[test]
    fn error_display_placement_failed() {
        let err = Error::PlacementFailed {
            uid: "job-17".to_string(),
            at: Timestamp::from_secs(0),
        };
        assert_eq!(
            err.to_string(),
            "no VM free within slack for job job-17 at 1970-01-01 00:00:00"
        );
    }

    #[test]
    fn error_display_invalid_config() {
        let err = Error::InvalidConfig("floor must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: floor must be at least 1"
        );
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
