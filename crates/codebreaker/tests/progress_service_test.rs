//! Key selection and sync policy of the progress service.

use std::collections::BTreeSet;

use codebreaker::{
    AuthenticatedUser, LocalLedger, PlayerKey, ProgressLedger, ProgressRepository,
    ProgressService, RemoteLedger,
};
use codebreaker_core::Catalog;
use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::NamedTempFile;

fn device() -> PlayerKey {
    PlayerKey::Device("dev-1".to_string())
}

fn ada() -> AuthenticatedUser {
    AuthenticatedUser::new("7".to_string(), "ada".to_string())
}

fn ada_key() -> PlayerKey {
    PlayerKey::User("7".to_string())
}

/// Temp database plus a second handle on it for assertions.
fn setup_local() -> (NamedTempFile, LocalLedger) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = ProgressRepository::open(db_path).expect("Failed to open repository");
    (db_file, LocalLedger::new(repo))
}

fn service(local: &LocalLedger, remote_url: Option<&str>) -> ProgressService {
    let remote =
        remote_url.map(|url| Box::new(RemoteLedger::new(url)) as Box<dyn ProgressLedger>);
    ProgressService::new(Box::new(local.clone()), remote, device())
}

#[tokio::test]
async fn test_anonymous_play_uses_device_key() {
    let (_db, local) = setup_local();
    let service = service(&local, None);
    let catalog = Catalog::generate();

    assert_eq!(service.active_key(), device());
    assert_eq!(service.record_win(1, &catalog).await.expect("win"), Some(2));
    assert_eq!(service.record_win(1, &catalog).await.expect("win"), Some(2));

    assert_eq!(
        local.completed_levels(&device()).await.expect("read"),
        BTreeSet::from([1])
    );
}

#[tokio::test]
async fn test_last_level_win_has_no_next() {
    let (_db, local) = setup_local();
    let service = service(&local, None);
    let catalog = Catalog::generate();

    assert_eq!(service.record_win(100, &catalog).await.expect("win"), None);
    assert!(service.completed_levels().await.expect("read").contains(&100));
}

#[tokio::test]
async fn test_first_login_without_remote_migrates_device_progress() {
    let (_db, local) = setup_local();
    let mut service = service(&local, None);
    service.mark_completed(1).await.expect("mark");
    service.mark_completed(2).await.expect("mark");

    service.on_login(ada()).await.expect("login");

    assert_eq!(service.active_key(), ada_key());
    assert_eq!(
        service.completed_levels().await.expect("read"),
        BTreeSet::from([1, 2])
    );
}

#[tokio::test]
async fn test_later_login_does_not_remigrate() {
    let (_db, local) = setup_local();
    let mut service = service(&local, None);
    service.mark_completed(1).await.expect("mark");
    service.on_login(ada()).await.expect("login");
    service.on_logout();

    service.mark_completed(5).await.expect("mark");
    service.on_login(ada()).await.expect("login");

    assert_eq!(
        service.completed_levels().await.expect("read"),
        BTreeSet::from([1])
    );
}

#[tokio::test]
async fn test_login_uploads_device_progress_when_remote_has_no_record() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/progress/user:7")
        .with_status(404)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/progress/user:7")
        .match_body(Matcher::Json(json!({ "completed_levels": [1, 3] })))
        .with_status(204)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    let mut service = service(&local, Some(&server.url()));
    service.mark_completed(1).await.expect("mark");
    service.mark_completed(3).await.expect("mark");

    service.on_login(ada()).await.expect("login");

    put.assert_async().await;
    assert_eq!(
        local.completed_levels(&ada_key()).await.expect("read"),
        BTreeSet::from([1, 3])
    );
}

#[tokio::test]
async fn test_login_pulls_existing_remote_record_into_empty_mirror() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/progress/user:7")
        .with_status(200)
        .with_body(json!({ "completed_levels": [10, 11] }).to_string())
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    let mut service = service(&local, Some(&server.url()));

    service.on_login(ada()).await.expect("login");

    put.assert_async().await;
    assert_eq!(
        local.completed_levels(&ada_key()).await.expect("read"),
        BTreeSet::from([10, 11])
    );
}

#[tokio::test]
async fn test_login_merges_remote_record_with_local_mirror() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/progress/user:7")
        .with_status(200)
        .with_body(json!({ "completed_levels": [10, 11] }).to_string())
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/progress/user:7")
        .match_body(Matcher::Json(json!({ "completed_levels": [1, 10, 11] })))
        .with_status(204)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    local
        .import(&ada_key(), &BTreeSet::from([1]))
        .await
        .expect("seed mirror");
    let mut service = service(&local, Some(&server.url()));

    service.on_login(ada()).await.expect("login");

    put.assert_async().await;
    assert_eq!(
        local.completed_levels(&ada_key()).await.expect("read"),
        BTreeSet::from([1, 10, 11])
    );
}

#[tokio::test]
async fn test_login_with_remote_down_still_migrates_device_progress() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/progress/user:7")
        .with_status(503)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    let mut service = service(&local, Some(&server.url()));
    service.mark_completed(1).await.expect("mark");
    service.mark_completed(2).await.expect("mark");

    service.on_login(ada()).await.expect("login");

    assert_eq!(
        local.completed_levels(&ada_key()).await.expect("read"),
        BTreeSet::from([1, 2])
    );
}

#[tokio::test]
async fn test_offline_win_survives_remote_recovery() {
    let mut server = Server::new_async().await;
    let outage = server
        .mock("GET", "/progress/user:7")
        .with_status(503)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/progress/user:7")
        .match_body(Matcher::Json(json!({ "completed_levels": [1, 2, 3, 4, 5] })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    let service = service(&local, Some(&server.url())).with_user(Some(ada()));
    service.mark_completed(5).await.expect("local write still succeeds");

    outage.remove_async().await;
    server
        .mock("GET", "/progress/user:7")
        .with_status(200)
        .with_body(json!({ "completed_levels": [1, 2, 3, 4] }).to_string())
        .create_async()
        .await;

    assert_eq!(
        service.completed_levels().await.expect("read"),
        BTreeSet::from([1, 2, 3, 4, 5])
    );
    assert_eq!(
        local.completed_levels(&ada_key()).await.expect("read"),
        BTreeSet::from([1, 2, 3, 4, 5])
    );
    put.assert_async().await;
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_local_mirror() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/progress/user:7")
        .with_status(503)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    local
        .import(&ada_key(), &BTreeSet::from([4]))
        .await
        .expect("seed mirror");
    let service = service(&local, Some(&server.url())).with_user(Some(ada()));

    assert_eq!(
        service.completed_levels().await.expect("read"),
        BTreeSet::from([4])
    );
    service.mark_completed(5).await.expect("local write still succeeds");
    assert_eq!(
        local.completed_levels(&ada_key()).await.expect("read"),
        BTreeSet::from([4, 5])
    );
}

#[tokio::test]
async fn test_anonymous_player_never_touches_remote() {
    let mut server = Server::new_async().await;
    let get = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (_db, local) = setup_local();
    let service = service(&local, Some(&server.url()));
    service.mark_completed(1).await.expect("mark");
    service.completed_levels().await.expect("read");

    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_snapshot_reports_unlock_and_percent() {
    let (_db, local) = setup_local();
    let service = service(&local, None);
    for id in 1..=4 {
        service.mark_completed(id).await.expect("mark");
    }

    let snapshot = service.snapshot(&Catalog::generate()).await.expect("snapshot");

    assert_eq!(snapshot.key(), &device());
    assert_eq!(*snapshot.highest_unlocked(), 5);
    assert_eq!(*snapshot.percent(), 4);
}
