//! Logging to the console and to a file in the output directory.
use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
};

/// Name of the log file in the output directory.
pub const LOG_FILE: &str = "train.log";

/// Writes everything to stderr and to a file.
pub struct TeeWriter {
    file: File,
}

impl TeeWriter {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Initializes the global logger.
///
/// Lines look like `2024-05-01 12:00:00,123 INFO: message` and are appended to
/// `<save_dir>/train.log`. The level is `info` unless `RUST_LOG` says otherwise.
pub fn init(save_dir: &Path) -> Result<()> {
    let path = save_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter::new(file))))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn tee_writes_to_file() -> Result<()> {
        let dir = TempDir::new("logging")?;
        let path = dir.path().join(LOG_FILE);
        let mut tee = TeeWriter::new(File::create(&path)?);
        writeln!(tee, "first")?;
        writeln!(tee, "second")?;
        tee.flush()?;
        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }
}
