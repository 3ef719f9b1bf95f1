use std::sync::Arc;

use optimistic_records::{
    NotificationKind, Operation, Record, RecordPatch, RemoteError, SyncError,
};

use crate::support::{drain, loaded, names, seed, service};

#[tokio::test]
async fn failed_update_restores_exact_snapshot() {
    // every record, so the property is not tied to position 0
    for id in [1, 2, 3] {
        let service = service();
        let coordinator = loaded(&service).await.unwrap();
        let before = coordinator.collection().unwrap();
        service.fail(Operation::Update);

        let result = coordinator
            .update(id, RecordPatch::new("Changed", "changed@x.com"))
            .await;

        assert!(matches!(result, Err(SyncError::Remote(RemoteError::Unavailable(_)))));
        assert_eq!(coordinator.collection().unwrap(), before);
    }
}

#[tokio::test]
async fn failed_update_does_not_refetch() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();
    let lists_before = service.call_count(Operation::List);
    service.fail(Operation::Update);

    let _ = coordinator.update(1, RecordPatch::new("Ada L", "ada@x.com")).await;

    assert_eq!(service.call_count(Operation::List), lists_before);
}

#[tokio::test]
async fn speculative_write_is_visible_before_service_answers() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();
    let gate = service.hold(Operation::Update);

    let (result, ()) = tokio::join!(
        coordinator.update(1, RecordPatch::new("Ada L", "ada@lovelace.dev")),
        async {
            gate.entered().await;
            let record = coordinator.get(1).unwrap().unwrap();
            assert_eq!(record.name, "Ada L");
            assert_eq!(record.email, "ada@lovelace.dev");
            // id, position and username unchanged
            assert_eq!(record.username, "ada");
            assert_eq!(coordinator.records().unwrap()[0].id, 1);
            gate.release();
        }
    );

    assert_eq!(result.unwrap().name, "Ada L");
}

#[tokio::test]
async fn confirmed_update_notifies_and_reconciles_with_full_refetch() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();
    let mut rx = coordinator.subscribe();
    let gate = service.hold(Operation::Update);

    let (result, ()) = tokio::join!(
        coordinator.update(2, RecordPatch::new("Grace H", "grace@x.com")),
        async {
            gate.entered().await;
            // another client adds a record while the update is in flight
            let mut records = service.records();
            records.push(Record::new(4, "Barbara", "barbara@x.com"));
            service.set_records(records);
            gate.release();
        }
    );
    result.unwrap();

    assert_eq!(names(&coordinator), vec!["Ada", "Grace H", "Linus", "Barbara"]);

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Success);
    assert_eq!(notifications[0].title, "User Updated");
    assert_eq!(
        notifications[0].description,
        "Grace H has been updated successfully."
    );
}

#[tokio::test]
async fn update_of_unknown_id_issues_no_call() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();

    let err = coordinator
        .update(42, RecordPatch::new("x", "x@x.com"))
        .await
        .unwrap_err();

    assert_eq!(err, SyncError::UnknownRecord(42));
    assert_eq!(service.call_count(Operation::Update), 0);
    assert!(coordinator.notifier().history().is_empty());
}

#[tokio::test]
async fn update_discards_stale_in_flight_list() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();
    let gate = service.hold(Operation::List);

    let (stale, ()) = tokio::join!(coordinator.list(), async {
        gate.entered().await;
        service.unhold(Operation::List);
        coordinator
            .update(1, RecordPatch::new("Ada L", "ada@x.com"))
            .await
            .unwrap();
        // the held response was computed before the write landed
        service.set_records(seed());
        gate.release();
    });

    assert_eq!(stale.unwrap_err(), SyncError::Superseded);
    assert_eq!(coordinator.get(1).unwrap().unwrap().name, "Ada L");
    assert!(coordinator.list_state().unwrap().loaded().is_some());
}

#[tokio::test]
async fn interleaved_updates_roll_back_independently() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();
    let mut rx = coordinator.subscribe();
    let gate = service.hold(Operation::Update);
    // the first update to reach the service fails
    service.fail_next(Operation::Update);

    let (first, second, ()) = tokio::join!(
        coordinator.update(1, RecordPatch::new("Ada L", "ada@x.com")),
        coordinator.update(2, RecordPatch::new("Grace H", "grace@x.com")),
        async {
            gate.entered().await;
            gate.entered().await;
            assert_eq!(names(&coordinator), vec!["Ada L", "Grace H", "Linus"]);
            gate.release();
            gate.release();
        }
    );

    assert!(first.is_err());
    assert!(second.is_ok());
    assert_eq!(names(&coordinator), vec!["Ada", "Grace H", "Linus"]);

    let mut kinds: Vec<_> = drain(&mut rx).into_iter().map(|n| n.kind).collect();
    kinds.sort_by_key(|k| *k == NotificationKind::Error);
    assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);
}

#[tokio::test]
async fn overlapping_failed_updates_to_one_record_restore_server_value() {
    let service = service();
    let coordinator = loaded(&service).await.unwrap();
    let mut rx = coordinator.subscribe();
    let gate = service.hold(Operation::Update);
    service.fail(Operation::Update);

    let (first, second, ()) = tokio::join!(
        coordinator.update(1, RecordPatch::new("First", "ada@x.com")),
        coordinator.update(1, RecordPatch::new("Second", "ada@x.com")),
        async {
            gate.entered().await;
            gate.entered().await;
            assert_eq!(names(&coordinator), vec!["Second", "Grace", "Linus"]);
            gate.release();
            gate.release();
        }
    );

    assert!(first.is_err());
    assert!(second.is_err());
    assert_eq!(coordinator.records().unwrap(), service.records());
    assert_eq!(names(&coordinator), vec!["Ada", "Grace", "Linus"]);

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|n| n.title == "Update Failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn updates_can_be_spawned() {
    let service = service();
    let coordinator = Arc::new(loaded(&service).await.unwrap());

    let handles: Vec<_> = [(1, "Ada L"), (3, "Linus T")]
        .into_iter()
        .map(|(id, name)| {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .update(id, RecordPatch::new(name, format!("{}@x.com", id)))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(names(&coordinator), vec!["Ada L", "Grace", "Linus T"]);
}
