//! Homelab automation library.
//!
//! Backs two binaries:
//! - `npm-sync`: publishes configured services as Nginx Proxy Manager proxy
//!   hosts, creating missing ones and optionally updating existing ones
//! - `ha-purge`: deletes Home Assistant entities not updated for a while,
//!   after confirmation

// Core subsystems
pub mod config;
pub mod hub;
pub mod npm;
pub mod reconcile;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use config::schema::AutomationConfig;
pub use npm::ProxyManagerClient;
pub use reconcile::Reconciler;
