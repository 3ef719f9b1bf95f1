use optimistic_records::{
    HttpRecordService, RecordCoordinator, RecordDraft, RecordPatch, RemoteError, SyncError,
};
use serde_json::json;

use crate::support::{start_server, users, MockApi};

async fn coordinator(api: &MockApi) -> RecordCoordinator<HttpRecordService> {
    let base = start_server(api.clone()).await;
    let coordinator = RecordCoordinator::with_service(HttpRecordService::new(&base, "users"));
    coordinator.list().await.unwrap();
    coordinator
}

#[tokio::test]
async fn repeated_creates_against_constant_id_stay_unique() {
    let api = MockApi::with_users(users());
    let coordinator = coordinator(&api).await;

    let first = coordinator
        .create(RecordDraft::new("Grace", "grace@x.com"))
        .await
        .unwrap();
    let second = coordinator
        .create(RecordDraft::new("Barbara", "barbara@x.com"))
        .await
        .unwrap();

    assert_eq!(first.id, 11);
    assert!(second.is_placeholder());
    let ids: Vec<_> = coordinator.records().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, 11, 1, 2]);
}

#[tokio::test]
async fn create_response_without_name_uses_generic_title() {
    let api = MockApi::with_users(users());
    api.create_response(json!({}));
    let coordinator = coordinator(&api).await;

    let created = coordinator
        .create(RecordDraft::new("Grace", "grace@x.com"))
        .await
        .unwrap();

    assert_eq!(created.name, "Grace");
    assert!(created.is_placeholder());
    let history = coordinator.notifier().history();
    assert_eq!(history[0].description, "New user has been added successfully.");
}

#[tokio::test]
async fn server_error_on_update_rolls_back() {
    let api = MockApi::with_users(users());
    let coordinator = coordinator(&api).await;
    let before = coordinator.collection().unwrap();
    api.fail_with(Some(500));

    let err = coordinator
        .update(1, RecordPatch::new("Leanne G", "Sincere@april.biz"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Remote(RemoteError::Status { status: 500, .. })
    ));
    assert_eq!(coordinator.collection().unwrap(), before);
    assert!(coordinator.notifier().history()[0].is_error());
}

#[tokio::test]
async fn update_then_reconcile_issues_put_and_get() {
    let api = MockApi::with_users(users());
    let coordinator = coordinator(&api).await;

    coordinator
        .update(2, RecordPatch::new("Ervin H", "Shanna@melissa.tv"))
        .await
        .unwrap();

    let methods: Vec<_> = api.seen().iter().map(|s| s.method).collect();
    assert_eq!(methods, vec!["GET", "PUT", "GET"]);
    assert_eq!(coordinator.get(2).unwrap().unwrap().name, "Ervin H");
    assert_eq!(coordinator.get(2).unwrap().unwrap().username, "Antonette");
}

#[tokio::test]
async fn delete_removes_after_confirmation() {
    let api = MockApi::with_users(users());
    let coordinator = coordinator(&api).await;

    coordinator.delete(1).await.unwrap();

    assert!(coordinator.get(1).unwrap().is_none());
    assert_eq!(api.seen().last().unwrap().path, "/users/1");
}
