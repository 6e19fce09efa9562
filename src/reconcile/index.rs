//! Domain → proxy host lookup built from a host listing.

use std::collections::HashMap;

use crate::npm::types::{HostId, ProxyHostRecord};

/// Maps every domain name served by an existing proxy host to that host's id.
///
/// Built once per run from a fresh listing and read-only afterwards. When
/// several hosts list the same domain, the host seen last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainIndex {
    domains: HashMap<String, HostId>,
}

impl DomainIndex {
    pub fn from_hosts(hosts: &[ProxyHostRecord]) -> Self {
        let mut domains = HashMap::new();
        for host in hosts {
            for domain in &host.domain_names {
                if let Some(previous) = domains.insert(domain.clone(), host.id) {
                    if previous != host.id {
                        tracing::warn!(
                            domain = %domain,
                            previous = %previous,
                            id = %host.id,
                            "Domain listed by more than one proxy host, using the last one"
                        );
                    }
                }
            }
        }
        Self { domains }
    }

    pub fn get(&self, fqdn: &str) -> Option<HostId> {
        self.domains.get(fqdn).copied()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
