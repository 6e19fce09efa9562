//! Stale entity selection and deletion.
//!
//! # Responsibilities
//! - Select entities whose last update predates a fixed threshold
//! - Show the selection and ask for confirmation
//! - Delete each selected entity, continuing past individual failures

use std::io::Write;

use chrono::{DateTime, Duration, Utc};

use crate::hub::client::StateStore;
use crate::hub::confirm::Confirm;
use crate::hub::types::{DeleteOutcome, HubError, HubResult, StaleEntity, StateEntity};

pub const CONFIRM_PROMPT: &str = "Do you want to delete these entities?";

/// Entities last updated before `threshold` are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleFilter {
    threshold: DateTime<Utc>,
    days: u32,
}

impl StaleFilter {
    /// Threshold `days` before `now`. Compute once per process.
    ///
    /// Clamps to the earliest representable instant instead of overflowing.
    pub fn days_before(now: DateTime<Utc>, days: u32) -> Self {
        let threshold = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { threshold, days }
    }

    pub fn threshold(&self) -> DateTime<Utc> {
        self.threshold
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn is_stale(&self, last_updated: DateTime<Utc>) -> bool {
        last_updated < self.threshold
    }

    /// Stale entities in listing order. Unparseable timestamps are kept.
    pub fn select(&self, entities: &[StateEntity]) -> Vec<StaleEntity> {
        entities
            .iter()
            .filter_map(|entity| match entity.last_updated_utc() {
                Some(ts) if self.is_stale(ts) => Some(StaleEntity {
                    entity_id: entity.entity_id.clone(),
                    last_updated: ts,
                }),
                Some(_) => None,
                None => {
                    tracing::warn!(
                        entity_id = %entity.entity_id,
                        last_updated = ?entity.last_updated,
                        "Unparseable last_updated, keeping entity"
                    );
                    None
                }
            })
            .collect()
    }
}

/// What one purge run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub stale: Vec<StaleEntity>,
    pub confirmed: bool,
    pub removed: Vec<String>,
    /// Entity id and reason.
    pub failed: Vec<(String, String)>,
}

impl PurgeReport {
    pub fn deleted_any(&self) -> bool {
        !self.removed.is_empty()
    }
}

pub struct Purger<'a, S> {
    store: &'a S,
    filter: StaleFilter,
}

impl<'a, S: StateStore> Purger<'a, S> {
    pub fn new(store: &'a S, filter: StaleFilter) -> Self {
        Self { store, filter }
    }

    pub async fn find_stale(&self) -> HubResult<Vec<StaleEntity>> {
        let entities = self.store.fetch_all().await?;
        let stale = self.filter.select(&entities);
        tracing::info!(
            total = entities.len(),
            stale = stale.len(),
            threshold = %self.filter.threshold(),
            "Scanned hub entities"
        );
        Ok(stale)
    }

    /// Fetch, list the stale entities on `out`, confirm, then delete.
    pub async fn run<C, W>(&self, confirm: &mut C, out: &mut W) -> HubResult<PurgeReport>
    where
        C: Confirm,
        W: Write,
    {
        let stale = self.find_stale().await?;
        let mut report = PurgeReport::default();

        if stale.is_empty() {
            writeln!(
                out,
                "No entities found that haven't been updated in over {} days.",
                self.filter.days()
            )?;
            return Ok(report);
        }

        writeln!(
            out,
            "Entities that haven't been updated in over {} days:",
            self.filter.days()
        )?;
        let listing = serde_json::to_string_pretty(&stale)
            .map_err(|e| HubError::Decode(e.to_string()))?;
        writeln!(out, "{}", listing)?;
        out.flush()?;

        report.stale = stale;
        report.confirmed = confirm.confirm(CONFIRM_PROMPT)?;
        if !report.confirmed {
            writeln!(out, "No entities were deleted.")?;
            return Ok(report);
        }

        self.delete_all(&mut report).await;
        Ok(report)
    }

    async fn delete_all(&self, report: &mut PurgeReport) {
        for entity in &report.stale {
            let id = &entity.entity_id;
            match self.store.delete_entity(id).await {
                Ok(DeleteOutcome::Removed) => {
                    tracing::info!(entity_id = %id, "Successfully removed entity");
                    report.removed.push(id.clone());
                }
                Ok(DeleteOutcome::Rejected { status }) => {
                    tracing::error!(entity_id = %id, status, "Failed to remove entity");
                    report.failed.push((id.clone(), format!("status code {}", status)));
                }
                Err(e) => {
                    tracing::error!(entity_id = %id, error = %e, "Failed to remove entity");
                    report.failed.push((id.clone(), e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::confirm::AssumeYes;
    use std::sync::Mutex;

    /// In-memory hub recording delete calls.
    struct FakeStore {
        entities: Vec<StateEntity>,
        rejected: Vec<String>,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new(entities: Vec<StateEntity>) -> Self {
            Self {
                entities,
                rejected: Vec::new(),
                deleted: Mutex::new(Vec::new()),
            }
        }

        fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    impl StateStore for FakeStore {
        async fn fetch_all(&self) -> HubResult<Vec<StateEntity>> {
            Ok(self.entities.clone())
        }

        async fn delete_entity(&self, entity_id: &str) -> HubResult<DeleteOutcome> {
            self.deleted.lock().unwrap().push(entity_id.to_string());
            if self.rejected.iter().any(|r| r == entity_id) {
                Ok(DeleteOutcome::Rejected { status: 404 })
            } else {
                Ok(DeleteOutcome::Removed)
            }
        }
    }

    struct BrokenStore;

    impl StateStore for BrokenStore {
        async fn fetch_all(&self) -> HubResult<Vec<StateEntity>> {
            Err(HubError::Status {
                status: 401,
                body: "401: Unauthorized".to_string(),
            })
        }

        async fn delete_entity(&self, _entity_id: &str) -> HubResult<DeleteOutcome> {
            panic!("delete must not be called");
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entity(id: &str, days_ago: i64) -> StateEntity {
        StateEntity {
            entity_id: id.to_string(),
            last_updated: Some((now() - Duration::days(days_ago)).to_rfc3339()),
        }
    }

    fn filter() -> StaleFilter {
        StaleFilter::days_before(now(), 90)
    }

    #[test]
    fn test_select_threshold() {
        let entities = vec![
            entity("sensor.ancient", 100),
            entity("sensor.fresh", 10),
            entity("sensor.edge", 90),
            StateEntity {
                entity_id: "sensor.garbled".to_string(),
                last_updated: Some("not-a-date".to_string()),
            },
            StateEntity {
                entity_id: "sensor.unknown".to_string(),
                last_updated: None,
            },
        ];

        let stale = filter().select(&entities);
        let ids: Vec<&str> = stale.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["sensor.ancient"]);
    }

    #[test]
    fn test_huge_threshold_does_not_overflow() {
        let filter = StaleFilter::days_before(now(), u32::MAX);
        assert_eq!(filter.threshold(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(filter.days(), u32::MAX);
        assert!(filter.select(&[entity("sensor.ancient", 10_000)]).is_empty());
    }

    #[tokio::test]
    async fn test_yes_deletes_stale() {
        let store = FakeStore::new(vec![entity("a", 100), entity("b", 5)]);
        let mut out = Vec::new();
        let mut yes = |_: &str| true;

        let report = Purger::new(&store, filter()).run(&mut yes, &mut out).await.unwrap();

        assert_eq!(store.deleted(), vec!["a".to_string()]);
        assert_eq!(report.removed, vec!["a".to_string()]);
        assert!(report.confirmed);

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("\"entity_id\": \"a\""));
        assert!(!shown.contains("\"entity_id\": \"b\""));
    }

    #[tokio::test]
    async fn test_no_deletes_nothing() {
        let store = FakeStore::new(vec![entity("a", 100)]);
        let mut out = Vec::new();
        let mut no = |_: &str| false;

        let report = Purger::new(&store, filter()).run(&mut no, &mut out).await.unwrap();

        assert!(store.deleted().is_empty());
        assert!(!report.confirmed);
        assert!(!report.deleted_any());
        assert!(String::from_utf8(out).unwrap().contains("No entities were deleted."));
    }

    #[tokio::test]
    async fn test_nothing_stale_skips_prompt() {
        let store = FakeStore::new(vec![entity("a", 1)]);
        let mut out = Vec::new();
        let mut asked = false;
        let mut confirm = |_: &str| {
            asked = true;
            true
        };

        let report = Purger::new(&store, filter()).run(&mut confirm, &mut out).await.unwrap();

        assert!(!asked);
        assert!(report.stale.is_empty());
        assert!(String::from_utf8(out).unwrap().starts_with("No entities found"));
    }

    #[tokio::test]
    async fn test_rejected_delete_continues() {
        let mut store = FakeStore::new(vec![entity("a", 100), entity("b", 200), entity("c", 300)]);
        store.rejected.push("b".to_string());
        let mut out = Vec::new();

        let report = Purger::new(&store, filter())
            .run(&mut AssumeYes, &mut out)
            .await
            .unwrap();

        assert_eq!(store.deleted().len(), 3);
        assert_eq!(report.removed, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(report.failed, vec![("b".to_string(), "status code 404".to_string())]);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let mut out = Vec::new();
        let result = Purger::new(&BrokenStore, filter())
            .run(&mut AssumeYes, &mut out)
            .await;
        assert!(matches!(result, Err(HubError::Status { status: 401, .. })));
    }
}
