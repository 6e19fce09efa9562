//! Proxy manager integration subsystem.
//!
//! # Data Flow
//! ```text
//! CLI credentials (email, password)
//!     → client.rs authenticate (POST /api/tokens → bearer token)
//!     → client.rs list/create/update (/api/nginx/proxy-hosts)
//!     → types.rs (payload built from a ServiceDescriptor)
//! ```
//!
//! # Security Constraints
//! - The password and token are never logged
//! - Every call carries a request timeout

pub mod client;
pub mod types;

pub use client::{ProxyHostApi, ProxyManagerClient};
pub use types::{HostId, ProxyHostPayload, ProxyHostRecord, ProxyManagerError, ProxyManagerResult};
