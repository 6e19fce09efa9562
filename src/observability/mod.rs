//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / reconcile / hub:
//!     → tracing events with structured fields (fqdn, id, entity_id, status)
//!     → logging.rs subscriber (stderr, env-filtered)
//!
//! binaries:
//!     → end-of-run summaries on stdout
//! ```

pub mod logging;

pub use logging::init_logging;
