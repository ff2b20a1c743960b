//! Key/value records emitted by environments and filters.
//!
//! An environment returns a [`Record`] along with every [`Step`](crate::Step).
//! Observation and action filters put whatever they consider worth logging into it,
//! and the caller merges and forwards the records to its own logging backend.
//!
//! ```rust
//! use mosim_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("reward", -1.0);
//! record.insert("position", RecordValue::Array1(vec![0.1, 0.2]));
//! assert_eq!(record.get_scalar("reward").unwrap(), -1.0);
//! ```
mod base;

pub use base::{Record, RecordValue};
