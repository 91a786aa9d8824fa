use chrono::{DateTime, Utc};
use maillist_core::db::open_db_in_memory;
use maillist_core::{RepoError, SqliteSubscriberRepository, SubscriberService};

#[test]
fn subscribe_confirm_unsubscribe_flow() {
    let conn = open_db_in_memory().unwrap();
    let service = SubscriberService::new(SqliteSubscriberRepository::new(&conn));

    let id = service.subscribe("ada@example.com").unwrap();
    assert_eq!(service.list_active(1, 10).unwrap().len(), 1);

    let confirmed_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let confirmed = service.confirm_at("ada@example.com", confirmed_at).unwrap();
    assert_eq!(confirmed.id, id);
    assert_eq!(confirmed.confirmed_at, Some(confirmed_at));
    assert!(!confirmed.opt_out);

    service.unsubscribe("ada@example.com").unwrap();
    assert!(service.list_active(1, 10).unwrap().is_empty());
    assert!(service.get("ada@example.com").unwrap().unwrap().opt_out);
}

#[test]
fn duplicate_subscribe_is_detectable() {
    let conn = open_db_in_memory().unwrap();
    let service = SubscriberService::new(SqliteSubscriberRepository::new(&conn));

    service.subscribe("ada@example.com").unwrap();
    let err = service.subscribe("ada@example.com").unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[test]
fn confirm_uses_current_time_at_second_precision() {
    let conn = open_db_in_memory().unwrap();
    let service = SubscriberService::new(SqliteSubscriberRepository::new(&conn));

    let before = Utc::now().timestamp();
    let confirmed = service.confirm("grace@example.com").unwrap();
    let after = Utc::now().timestamp();

    let stamp = confirmed.confirmed_at.unwrap().timestamp();
    assert!(before <= stamp && stamp <= after);
}

#[test]
fn confirming_opted_out_subscriber_reactivates_it() {
    let conn = open_db_in_memory().unwrap();
    let service = SubscriberService::new(SqliteSubscriberRepository::new(&conn));

    let id = service.subscribe("ada@example.com").unwrap();
    service.unsubscribe("ada@example.com").unwrap();

    let confirmed = service.confirm("ada@example.com").unwrap();
    assert_eq!(confirmed.id, id);
    assert!(confirmed.is_active());
    assert_eq!(service.list_active(1, 10).unwrap().len(), 1);
}
