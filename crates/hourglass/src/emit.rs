//! The output sink.
//!
//! Everything the run produces flows through one [`Emitter`] in strict
//! emission order: lifecycle commands as the scheduler decides them, then
//! the echoed job record that triggered them.

use hourglass_core::{Command, Result};
use std::io::Write;

/// Sink for command records and echoed job records.
pub trait Emitter {
    /// Emits one `launch`/`terminate` command record.
    fn command(&mut self, command: &Command) -> Result<()>;

    /// Echoes one job record, verbatim as it was read.
    fn job_line(&mut self, line: &str) -> Result<()>;
}

/// An [`Emitter`] that writes one record per line to any [`Write`].
#[derive(Debug)]
pub struct LineEmitter<W: Write> {
    writer: W,
}

impl<W: Write> LineEmitter<W> {
    pub fn new(writer: W) -> Self {
        LineEmitter { writer }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Emitter for LineEmitter<W> {
    fn command(&mut self, command: &Command) -> Result<()> {
        writeln!(self.writer, "{command}")?;
        Ok(())
    }

    fn job_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")?;
        Ok(())
    }
}
