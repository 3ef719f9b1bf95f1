use std::time::Duration;

use optimistic_records::{
    HttpRecordService, Record, RecordDraft, RecordService, RemoteError, SyncConfig,
};
use serde_json::json;

use crate::support::{start_server, users, MockApi};

#[tokio::test]
async fn list_decodes_records_with_username() {
    let base = start_server(MockApi::with_users(users())).await;
    let service = HttpRecordService::new(&base, "users");

    let records = service.list().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0],
        Record::new(1, "Leanne Graham", "Sincere@april.biz").with_username("Bret")
    );
}

#[tokio::test]
async fn create_posts_name_and_email() {
    let api = MockApi::default();
    let base = start_server(api.clone()).await;
    let service = HttpRecordService::new(&base, "users");

    let created = service
        .create(&RecordDraft::new("Grace", "grace@x.com"))
        .await
        .unwrap();

    assert_eq!(created.id, Some(11));
    let seen = api.seen();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(
        seen[0].body,
        Some(json!({ "name": "Grace", "email": "grace@x.com" }))
    );
}

#[tokio::test]
async fn update_puts_the_full_record() {
    let api = MockApi::with_users(users());
    let base = start_server(api.clone()).await;
    let service = HttpRecordService::new(&base, "users");
    let record = Record::new(2, "Ervin H", "ervin@x.com").with_username("Antonette");

    let echoed = service.update(&record).await.unwrap();

    assert_eq!(echoed.name.as_deref(), Some("Ervin H"));
    let seen = api.seen();
    assert_eq!(seen[0].method, "PUT");
    assert_eq!(seen[0].path, "/users/2");
    assert_eq!(
        seen[0].body,
        Some(json!({ "id": 2, "name": "Ervin H", "email": "ervin@x.com", "username": "Antonette" }))
    );
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let api = MockApi::with_users(users());
    let base = start_server(api.clone()).await;
    let service = HttpRecordService::new(&base, "users");
    api.fail_with(Some(503));

    let err = service.delete(1).await.unwrap_err();

    assert!(matches!(err, RemoteError::Status { status: 503, .. }), "got {:?}", err);
}

#[tokio::test]
async fn unknown_id_on_update_is_a_status_error() {
    let base = start_server(MockApi::with_users(users())).await;
    let service = HttpRecordService::new(&base, "users");

    let err = service
        .update(&Record::new(-1, "Ghost", "ghost@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Status { status: 500, .. }));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let service = HttpRecordService::new(&format!("http://{addr}"), "users");

    let err = service.list().await.unwrap_err();

    assert!(matches!(err, RemoteError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn configured_timeout_bounds_a_hung_request() {
    let api = MockApi::with_users(users());
    api.delay(Duration::from_secs(5));
    let base = start_server(api).await;
    let config = SyncConfig {
        base_url: base,
        request_timeout_ms: Some(100),
        ..SyncConfig::default()
    };
    let service = HttpRecordService::from_config(&config).unwrap();

    let err = service.list().await.unwrap_err();

    assert!(matches!(err, RemoteError::Transport(_)), "got {:?}", err);
}
