//! Idempotent proxy host reconciliation.
//!
//! # Responsibilities
//! - Decide per service: create, update (forced) or skip
//! - Drive the proxy manager one call at a time, in service order
//! - Record an outcome for every service, failed or not
//!
//! Reconciliation only adds and updates. Hosts that match no configured
//! service are left alone.

use std::fmt;

use crate::config::schema::ServiceDescriptor;
use crate::npm::client::ProxyHostApi;
use crate::npm::types::HostId;
use crate::reconcile::index::DomainIndex;

/// What reconciliation intends to do for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update(HostId),
    Skip(HostId),
}

/// An action bound to the service and domain it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction<'a> {
    pub service: &'a ServiceDescriptor,
    pub fqdn: String,
    pub action: Action,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update(id) => write!(f, "update (ID: {})", id),
            Action::Skip(id) => write!(f, "skip, already exists (ID: {})", id),
        }
    }
}

/// One dry-run line: padded fqdn, then the action.
impl fmt::Display for PlannedAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<40} {}", self.fqdn, self.action)
    }
}

/// Compute the action for every service without touching the network.
pub fn plan<'a>(
    services: &'a [ServiceDescriptor],
    base_domain: &str,
    force_update: bool,
    index: &DomainIndex,
) -> Vec<PlannedAction<'a>> {
    services
        .iter()
        .map(|service| {
            let fqdn = service.fqdn(base_domain);
            let action = match index.get(&fqdn) {
                None => Action::Create,
                Some(id) if force_update => Action::Update(id),
                Some(id) => Action::Skip(id),
            };
            PlannedAction {
                service,
                fqdn,
                action,
            }
        })
        .collect()
}

/// Result of reconciling one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created(HostId),
    Updated(HostId),
    Skipped(HostId),
    /// The create or update call failed; the attempted action is kept.
    Failed(Action),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created(id) => write!(f, "created (ID: {})", id),
            Outcome::Updated(id) => write!(f, "updated (ID: {})", id),
            Outcome::Skipped(id) => write!(f, "already exists (ID: {}), skipped", id),
            Outcome::Failed(Action::Update(id)) => write!(f, "update of ID {} failed", id),
            Outcome::Failed(_) => write!(f, "create failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOutcome {
    pub service: String,
    pub fqdn: String,
    pub outcome: Outcome,
}

/// Ordered outcomes of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: Vec<HostOutcome>,
}

impl ReconcileReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created(_)))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Drives a [`ProxyHostApi`] to publish every configured service.
pub struct Reconciler<'a, A> {
    api: &'a A,
    base_domain: &'a str,
    force_update: bool,
}

impl<'a, A: ProxyHostApi> Reconciler<'a, A> {
    pub fn new(api: &'a A, base_domain: &'a str, force_update: bool) -> Self {
        Self {
            api,
            base_domain,
            force_update,
        }
    }

    /// List existing hosts, index them, then reconcile `services`.
    pub async fn run(&self, services: &[ServiceDescriptor]) -> ReconcileReport {
        let hosts = self.api.list_hosts().await;
        let index = DomainIndex::from_hosts(&hosts);
        tracing::info!(
            hosts = hosts.len(),
            domains = index.len(),
            services = services.len(),
            force_update = self.force_update,
            "Reconciling proxy hosts"
        );
        self.reconcile(services, &index).await
    }

    /// Reconcile `services` against an already built index.
    ///
    /// Issues at most one create or update per service. A failure is
    /// recorded and the next service is processed.
    pub async fn reconcile(
        &self,
        services: &[ServiceDescriptor],
        index: &DomainIndex,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for planned in plan(services, self.base_domain, self.force_update, index) {
            let outcome = self.apply(&planned).await;
            report.outcomes.push(HostOutcome {
                service: planned.service.name.clone(),
                fqdn: planned.fqdn,
                outcome,
            });
        }

        tracing::info!(
            created = report.created(),
            updated = report.updated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "All proxy hosts have been processed"
        );
        report
    }

    async fn apply(&self, planned: &PlannedAction<'_>) -> Outcome {
        let fqdn = &planned.fqdn;
        match planned.action {
            Action::Skip(id) => {
                tracing::info!(fqdn = %fqdn, id = %id, "Proxy host already exists, skipping");
                Outcome::Skipped(id)
            }
            Action::Create => match self.api.create_host(planned.service, self.base_domain).await {
                Some(record) => {
                    tracing::info!(fqdn = %fqdn, id = %record.id, "Successfully created proxy host");
                    Outcome::Created(record.id)
                }
                None => Outcome::Failed(Action::Create),
            },
            Action::Update(id) => {
                match self.api.update_host(id, planned.service, self.base_domain).await {
                    Some(_) => {
                        tracing::info!(fqdn = %fqdn, id = %id, "Successfully updated proxy host");
                        Outcome::Updated(id)
                    }
                    None => Outcome::Failed(Action::Update(id)),
                }
            }
        }
    }
}
