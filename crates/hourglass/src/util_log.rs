//! Optional per-job utilization logging.

use crate::scheduler::UtilizationSample;
use hourglass_core::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only side file of utilization counters, one line per scheduled
/// job: `<date> <time> <queue> <pool_size> <free> <min_idle>`.
///
/// Lines are flushed as they are written so the file is complete even when
/// the run dies on a broken pipe.
#[derive(Debug)]
pub struct UtilizationLog {
    writer: BufWriter<File>,
}

impl UtilizationLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(UtilizationLog {
            writer: BufWriter::new(file),
        })
    }

    pub fn record(&mut self, sample: &UtilizationSample) -> Result<()> {
        writeln!(self.writer, "{sample}")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for UtilizationLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
