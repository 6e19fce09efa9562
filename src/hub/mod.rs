//! Home automation hub subsystem (stale entity purge).
//!
//! # Data Flow
//! ```text
//! client.rs fetch_all (GET /api/states)
//!     → purge.rs StaleFilter (last_updated < now - N days)
//!     → stale listing printed as JSON
//!     → confirm.rs (interactive "yes", or --yes)
//!     → client.rs delete_entity per stale entity (DELETE /api/states/{id})
//!     → PurgeReport
//! ```
//!
//! # Security Constraints
//! - The access token is sent as a sensitive header and never logged
//! - Nothing is deleted without an explicit confirmation

pub mod client;
pub mod confirm;
pub mod purge;
pub mod types;

pub use client::{HubClient, StateStore};
pub use confirm::{AssumeYes, Confirm, PromptConfirm};
pub use purge::{PurgeReport, Purger, StaleFilter};
pub use types::{DeleteOutcome, HubError, HubResult, StaleEntity, StateEntity};
