//! Proxy host reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! sync.rs authenticate (fails → nothing else is called)
//!     → ProxyHostApi::list_hosts
//!     → index.rs (fqdn → host id, last write wins)
//!     → engine.rs plan (Create / Update / Skip per service)
//!     → engine.rs apply (one call per service, in order)
//!     → ReconcileReport
//! ```
//!
//! # Design Decisions
//! - The index is rebuilt every run; nothing is cached between runs
//! - Planning is pure so dry runs and tests need no network
//! - Additive only: no host is ever deleted

pub mod engine;
pub mod index;
pub mod sync;

pub use engine::{plan, Action, HostOutcome, Outcome, PlannedAction, ReconcileReport, Reconciler};
pub use index::DomainIndex;
pub use sync::sync_proxy_hosts;
