//! End-to-end purge runs against a mock hub.

use chrono::{Duration, Utc};
use homelab_automation::hub::{HubClient, PromptConfirm, Purger, StaleFilter};
use homelab_automation::resilience::HttpTimeouts;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::TOKEN;

fn entities() -> Value {
    let now = Utc::now();
    json!([
        {
            "entity_id": "a",
            "state": "unavailable",
            "last_updated": (now - Duration::days(100)).to_rfc3339()
        },
        {
            "entity_id": "b",
            "state": "on",
            "last_updated": (now - Duration::days(2)).to_rfc3339()
        }
    ])
}

async fn mount_delete(mock_server: &MockServer, expected: u64) {
    Mock::given(method("DELETE"))
        .and(path("/api/states/a"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected)
        .mount(mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/states/b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(mock_server)
        .await;
}

async fn purge(mock_server: &MockServer, answer: &str) -> (homelab_automation::hub::PurgeReport, String) {
    let client = HubClient::new(&mock_server.uri(), TOKEN, HttpTimeouts::default()).unwrap();
    let filter = StaleFilter::days_before(Utc::now(), 90);
    let mut prompt_out = Vec::new();
    let mut listing = Vec::new();

    let report = {
        let mut confirm = PromptConfirm::new(answer.as_bytes(), &mut prompt_out);
        Purger::new(&client, filter)
            .run(&mut confirm, &mut listing)
            .await
            .unwrap()
    };

    (report, String::from_utf8(listing).unwrap())
}

#[tokio::test]
async fn test_yes_deletes_stale_entity() {
    let mock_server = common::start_hub(entities()).await;
    mount_delete(&mock_server, 1).await;

    let (report, listing) = purge(&mock_server, "yes\n").await;

    assert_eq!(report.removed, vec!["a".to_string()]);
    assert!(report.failed.is_empty());
    assert!(listing.contains("\"entity_id\": \"a\""));
}

#[tokio::test]
async fn test_uppercase_yes_is_accepted() {
    let mock_server = common::start_hub(entities()).await;
    mount_delete(&mock_server, 1).await;

    let (report, _) = purge(&mock_server, "  YES\n").await;

    assert!(report.confirmed);
    assert_eq!(report.removed.len(), 1);
}

#[tokio::test]
async fn test_no_deletes_nothing() {
    let mock_server = common::start_hub(entities()).await;
    mount_delete(&mock_server, 0).await;

    let (report, listing) = purge(&mock_server, "no\n").await;

    assert!(!report.confirmed);
    assert_eq!(report.stale.len(), 1);
    assert!(listing.contains("No entities were deleted."));
}

#[tokio::test]
async fn test_failed_delete_is_reported() {
    let now = Utc::now();
    let mock_server = common::start_hub(json!([
        {"entity_id": "a", "last_updated": (now - Duration::days(120)).to_rfc3339()},
        {"entity_id": "c", "last_updated": (now - Duration::days(95)).to_rfc3339()}
    ]))
    .await;
    Mock::given(method("DELETE"))
        .and(path("/api/states/a"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/states/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (report, _) = purge(&mock_server, "yes\n").await;

    assert_eq!(report.removed, vec!["c".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "a");
}

#[tokio::test]
async fn test_null_timestamp_does_not_abort_run() {
    let now = Utc::now();
    let mock_server = common::start_hub(json!([
        {"entity_id": "a", "last_updated": (now - Duration::days(100)).to_rfc3339()},
        {"entity_id": "b", "last_updated": null},
        {"entity_id": "c"}
    ]))
    .await;
    mount_delete(&mock_server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/states/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (report, listing) = purge(&mock_server, "yes\n").await;

    assert_eq!(report.removed, vec!["a".to_string()]);
    assert!(!listing.contains("\"entity_id\": \"b\""));
}
