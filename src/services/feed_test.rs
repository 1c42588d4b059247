use super::*;
use crate::state::test_helpers;
use uuid::Uuid;

#[test]
fn parses_trigger_payload() {
    let id = Uuid::new_v4();
    let payload = format!(r#"{{"eventType":"UPDATE","id":"{id}"}}"#);
    assert_eq!(parse_notification(&payload), Some(Notification { event_type: ChangeKind::Update, id }));
}

#[test]
fn rejects_unknown_operation() {
    let payload = format!(r#"{{"eventType":"TRUNCATE","id":"{}"}}"#, Uuid::nil());
    assert_eq!(parse_notification(&payload), None);
}

#[test]
fn rejects_garbage() {
    assert_eq!(parse_notification("not json"), None);
    assert_eq!(parse_notification(r#"{"eventType":"DELETE"}"#), None);
}

#[tokio::test]
async fn delete_resolves_without_database() {
    let state = test_helpers::test_app_state();
    let id = Uuid::new_v4();
    let event = resolve(&state.pool, Notification { event_type: ChangeKind::Delete, id }).await.unwrap();
    assert_eq!(event, Some(ChangeEvent::Delete(id)));
}

#[tokio::test]
async fn relay_broadcasts_deletes() {
    let state = test_helpers::test_app_state();
    let mut rx = state.changes.subscribe();
    let id = Uuid::new_v4();

    relay(&state, &format!(r#"{{"eventType":"DELETE","id":"{id}"}}"#)).await;

    assert_eq!(rx.try_recv().unwrap(), ChangeEvent::Delete(id));
}

#[tokio::test]
async fn relay_drops_malformed_payloads() {
    let state = test_helpers::test_app_state();
    let mut rx = state.changes.subscribe();

    relay(&state, "{}").await;

    assert!(rx.try_recv().is_err());
}
