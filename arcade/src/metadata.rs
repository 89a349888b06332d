//! Summary of a run written next to its outputs.
use anyhow::Result;
use arcade_core::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Name of the metadata file in the output directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Evaluation metrics of the final evaluation, `null` when not available.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EvalResultSummary {
    pub episode_return_mean: Option<f32>,
    pub episode_len_mean: Option<f32>,
}

impl From<&Record> for EvalResultSummary {
    fn from(record: &Record) -> Self {
        Self {
            episode_return_mean: record.get_scalar("evaluation/episode_return_mean").ok(),
            episode_len_mean: record.get_scalar("evaluation/episode_len_mean").ok(),
        }
    }
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunMetadata {
    /// Directory of the final checkpoint.
    pub checkpoint_path: String,

    pub eval_result_summary: EvalResultSummary,

    /// UTC time in ISO 8601 with a trailing `Z`.
    pub timestamp: String,
}

/// Formats like `2024-05-01T12:00:00.123456Z`.
pub fn timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

impl RunMetadata {
    pub fn new(checkpoint_path: &Path, eval_record: &Record, time: DateTime<Utc>) -> Self {
        Self {
            checkpoint_path: checkpoint_path.to_string_lossy().to_string(),
            eval_result_summary: eval_record.into(),
            timestamp: timestamp(time),
        }
    }

    /// Writes pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::record::RecordValue;
    use chrono::TimeZone;
    use tempdir::TempDir;

    #[test]
    fn timestamp_is_utc_iso8601() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        assert_eq!(timestamp(time), "2024-05-01T12:30:05.000000Z");
    }

    #[test]
    fn missing_metrics_are_null() -> Result<()> {
        let record = Record::from_slice(&[(
            "evaluation/episode_len_mean",
            RecordValue::Scalar(120.0),
        )]);
        let metadata = RunMetadata::new(Path::new("/out/checkpoint"), &record, Utc::now());
        assert_eq!(metadata.eval_result_summary.episode_len_mean, Some(120.0));
        assert_eq!(metadata.eval_result_summary.episode_return_mean, None);

        let json: serde_json::Value = serde_json::to_value(&metadata)?;
        assert!(json["eval_result_summary"]["episode_return_mean"].is_null());
        assert_eq!(json["checkpoint_path"], "/out/checkpoint");
        assert!(json["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
        Ok(())
    }

    #[test]
    fn save_and_load() -> Result<()> {
        let dir = TempDir::new("metadata")?;
        let path = dir.path().join(METADATA_FILE);
        let record = Record::from_slice(&[
            ("evaluation/episode_return_mean", RecordValue::Scalar(70.0)),
            ("evaluation/episode_len_mean", RecordValue::Scalar(600.0)),
        ]);
        let metadata = RunMetadata::new(&dir.path().join("checkpoint"), &record, Utc::now());
        metadata.save(&path)?;
        assert_eq!(RunMetadata::load(&path)?, metadata);
        assert!(std::fs::read_to_string(&path)?.contains("\n  \"checkpoint_path\""));
        Ok(())
    }
}
