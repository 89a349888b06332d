//! Types and traits for recording training metrics.
//!
//! * [`Record`] - key-value pairs of metrics emitted by samplers, agents and evaluators
//! * [`RecordValue`] - the values that can be stored in a [`Record`]
//! * [`Recorder`] - writes records to some destination, optionally aggregating them first
//! * [`RecordStorage`] - aggregation of scalars (min, max, mean, median)
//! * [`BufferedRecorder`] - keeps records in memory
//!
//! ```rust
//! use arcade_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("iteration", RecordValue::Scalar(1.0));
//! record.insert("learners/policy_loss", RecordValue::Scalar(-0.01));
//! ```
mod base;
mod buffered_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
