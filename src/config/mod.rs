//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AutomationConfig (validated, immutable)
//!     → CLI flags override individual fields
//!     → passed by reference to the client and reconciler
//! ```
//!
//! # Design Decisions
//! - Config is loaded once per process and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::AutomationConfig;
pub use schema::ForwardScheme;
pub use schema::HubConfig;
pub use schema::ProxyManagerConfig;
pub use schema::ServiceDescriptor;
