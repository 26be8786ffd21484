//! Runtime-agnostic protocol logic for the adaptive UDP sender.
//!
//! This crate holds everything that can be exercised without a socket or an
//! async runtime: the wire codec, the append-only ack log, the pure
//! arithmetic behind the three estimator stages, and `find_s`. The binary
//! crate (`sender`) owns the tokio runtime, the transport, and the
//! suspension points (sleeps, timeouts) that drive these functions.

pub mod ack_log;
pub mod error;
pub mod estimator;
pub mod find_s;
pub mod wire;

pub use ack_log::{AckLog, AckRecord};
pub use error::EstimatorError;
