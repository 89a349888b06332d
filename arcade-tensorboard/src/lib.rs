//! Write training records as TensorBoard event files.
use arcade_core::record::{Record, RecordStorage, RecordValue, Recorder};
use log::{trace, warn};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Scalars are written with the step taken from the key `iteration` of each
/// record. Other values are skipped.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    storage: RecordStorage,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "iteration".to_string(),
            storage: RecordStorage::new(),
        }
    }

    fn step(&self, record: &Record) -> Option<usize> {
        match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) if *v >= 0.0 => Some(*v as usize),
            _ => None,
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// Records without a non-negative scalar step are dropped with a warning.
    fn write(&mut self, record: Record) {
        let step = match self.step(&record) {
            Some(step) => step,
            None => {
                warn!("Record without key {:?} is not written", self.step_key);
                return;
            }
        };

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                _ => trace!("Skipped non-scalar value {}", k),
            }
        }
        self.writer.flush();
    }

    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert(self.step_key.clone(), RecordValue::Scalar(step as _));
        self.write(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn writes_event_file_on_flush() -> std::io::Result<()> {
        let dir = TempDir::new("tensorboard")?;
        let mut recorder = TensorboardRecorder::new(dir.path());
        recorder.store(Record::from_scalar("learners/total_loss", 0.5));
        recorder.flush(1);
        // A record without the step key is dropped.
        recorder.write(Record::from_scalar("learners/vf_loss", 0.1));

        let n_files = std::fs::read_dir(dir.path())?.count();
        assert!(n_files > 0);
        Ok(())
    }
}
