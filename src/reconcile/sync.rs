//! Authenticate-then-reconcile entry point used by `npm-sync`.

use crate::config::schema::ServiceDescriptor;
use crate::npm::client::ProxyManagerClient;
use crate::npm::types::ProxyManagerResult;
use crate::reconcile::engine::{ReconcileReport, Reconciler};

/// Authenticate, then publish `services` under `base_domain`.
///
/// An authentication error is returned before any proxy host is listed,
/// created or updated. Per-host failures are only recorded in the report.
pub async fn sync_proxy_hosts(
    client: &mut ProxyManagerClient,
    identity: &str,
    secret: &str,
    services: &[ServiceDescriptor],
    base_domain: &str,
    force_update: bool,
) -> ProxyManagerResult<ReconcileReport> {
    client.authenticate(identity, secret).await?;

    let report = Reconciler::new(&*client, base_domain, force_update)
        .run(services)
        .await;
    Ok(report)
}
