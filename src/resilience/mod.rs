//! Resilience subsystem.
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a failed call is reported and the run moves on

pub mod timeouts;

pub use timeouts::{build_client, HttpTimeouts};
