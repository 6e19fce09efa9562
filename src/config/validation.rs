//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check service names form valid, unique DNS labels
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check URLs parse before any request is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AutomationConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{AutomationConfig, ServiceDescriptor};

/// Upper bound for `hub.threshold_days` (about a century).
pub const MAX_THRESHOLD_DAYS: u32 = 36_500;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `services[2].forward_port`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a loaded configuration.
pub fn validate_config(config: &AutomationConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "proxy_manager.url", &config.proxy_manager.url);
    if config.proxy_manager.domain.trim().is_empty() {
        errors.push(ValidationError::new("proxy_manager.domain", "must not be empty"));
    }
    check_timeout(&mut errors, "proxy_manager.timeout_secs", config.proxy_manager.timeout_secs);
    check_timeout(
        &mut errors,
        "proxy_manager.connect_timeout_secs",
        config.proxy_manager.connect_timeout_secs,
    );

    let mut seen = HashSet::new();
    for (i, service) in config.services.iter().enumerate() {
        validate_service(&mut errors, i, service);
        if !seen.insert(service.name.to_ascii_lowercase()) {
            errors.push(ValidationError::new(
                format!("services[{}].name", i),
                format!("duplicate service name '{}'", service.name),
            ));
        }
    }

    check_url(&mut errors, "hub.url", &config.hub.url);
    if config.hub.threshold_days == 0 {
        errors.push(ValidationError::new("hub.threshold_days", "must be at least 1"));
    } else if config.hub.threshold_days > MAX_THRESHOLD_DAYS {
        errors.push(ValidationError::new(
            "hub.threshold_days",
            format!("must be at most {}", MAX_THRESHOLD_DAYS),
        ));
    }
    check_timeout(&mut errors, "hub.timeout_secs", config.hub.timeout_secs);
    check_timeout(&mut errors, "hub.connect_timeout_secs", config.hub.connect_timeout_secs);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_service(errors: &mut Vec<ValidationError>, index: usize, service: &ServiceDescriptor) {
    let field = |name: &str| format!("services[{}].{}", index, name);

    if !is_dns_label(&service.name) {
        errors.push(ValidationError::new(
            field("name"),
            format!("'{}' is not a valid DNS label", service.name),
        ));
    }
    if service.forward_host.trim().is_empty() {
        errors.push(ValidationError::new(field("forward_host"), "must not be empty"));
    }
    if service.forward_port == 0 {
        errors.push(ValidationError::new(field("forward_port"), "must be between 1 and 65535"));
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = url::Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}

fn check_timeout(errors: &mut Vec<ValidationError>, field: &str, secs: u64) {
    if secs == 0 {
        errors.push(ValidationError::new(field, "must be greater than 0"));
    }
}

/// 1-63 chars of ASCII alphanumerics or '-', not starting or ending with '-'.
fn is_dns_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
