mod common;

use clocksync::cli::commands::sync::run_once;
use clocksync::core::sync::{SyncOutcome, SyncSettings};
use clocksync::db::store::LocalStore;
use clocksync::errors::RemoteError;
use common::{
    FakeRemote, TABLE, clocksync, engine, insert_valid, open_store, setup_home, setup_test_db,
};
use predicates::str::contains;
use std::path::Path;

/// A command isolated from the real config, pointed at an unreachable
/// remote (port 1 refuses connections).
fn cmd(home: &Path) -> assert_cmd::Command {
    let mut c = clocksync();
    c.env("HOME", home)
        .env("APPDATA", home)
        .env("CLOCKSYNC_PG_HOST", "127.0.0.1")
        .env("CLOCKSYNC_PG_PORT", "1")
        .env("RUST_LOG", "warn");
    c
}

fn init(home: &Path, db: &Path) {
    cmd(home)
        .args(["--db", db.to_str().unwrap(), "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database"));
}

#[test]
fn init_creates_the_local_table() {
    let home = setup_home("cli_init");
    let db = setup_test_db("cli_init");
    init(&home, &db);

    assert!(db.exists());
    let store = LocalStore::open(&db, TABLE).unwrap();
    assert_eq!(store.counts().unwrap().total, 0);
    assert!(!home.join(".clocksync").join("clocksync.conf").exists());
}

#[test]
fn clock_in_and_out_show_up_in_list() {
    let home = setup_home("cli_clock");
    let db = setup_test_db("cli_clock");
    let db_arg = db.to_str().unwrap();
    init(&home, &db);

    cmd(&home)
        .args(["--db", db_arg, "clock-in", "17", "--at", "2025-03-03 08:15"])
        .assert()
        .success()
        .stdout(contains("Clock-in recorded for employee 17"));

    cmd(&home)
        .args(["--db", db_arg, "clock-out", "17", "--at", "2025-03-03 16:45"])
        .assert()
        .success()
        .stdout(contains("Clock-out recorded"));

    cmd(&home)
        .args(["--db", db_arg, "list", "--employee", "17"])
        .assert()
        .success()
        .stdout(contains("2025-03-03 08:15"))
        .stdout(contains("1 record(s)"));

    cmd(&home)
        .args(["--db", db_arg, "list", "--json"])
        .assert()
        .success()
        .stdout(contains("\"employee_id\": 17"))
        .stdout(contains("\"synced\": false"));
}

#[test]
fn clock_out_without_clock_in_fails() {
    let home = setup_home("cli_clock_out_alone");
    let db = setup_test_db("cli_clock_out_alone");
    init(&home, &db);

    cmd(&home)
        .args(["--db", db.to_str().unwrap(), "clock-out", "5"])
        .assert()
        .failure()
        .stderr(contains("No open clock-in found for employee 5"));
}

#[test]
fn sync_with_unreachable_server_exits_cleanly_and_keeps_rows() {
    let home = setup_home("cli_sync_offline");
    let db = setup_test_db("cli_sync_offline");
    let db_arg = db.to_str().unwrap();
    init(&home, &db);

    cmd(&home)
        .args(["--db", db_arg, "clock-in", "3", "--at", "2025-03-04 09:00"])
        .assert()
        .success();

    cmd(&home)
        .args(["sync", db_arg, TABLE])
        .assert()
        .success()
        .stdout(contains("unreachable"));

    let store = LocalStore::open(&db, TABLE).unwrap();
    assert_eq!(store.counts().unwrap().unsynced, 1);
}

#[test]
fn sync_refuses_an_invalid_table_name() {
    let home = setup_home("cli_sync_bad_table");
    let db = setup_test_db("cli_sync_bad_table");

    cmd(&home)
        .args(["sync", db.to_str().unwrap(), "clock;drop"])
        .assert()
        .failure()
        .stderr(contains("Invalid table name"));
}

#[test]
fn sync_requires_both_arguments() {
    let home = setup_home("cli_sync_usage");

    cmd(&home).args(["sync", "only_db"]).assert().failure();
}

#[test]
fn unsynced_record_is_kept_without_force() {
    let home = setup_home("cli_del");
    let db = setup_test_db("cli_del");
    let db_arg = db.to_str().unwrap();
    init(&home, &db);

    cmd(&home)
        .args(["--db", db_arg, "clock-in", "8", "--at", "2025-03-05 07:00"])
        .assert()
        .success();

    cmd(&home)
        .args(["--db", db_arg, "del", "1"])
        .assert()
        .failure()
        .stderr(contains("--force"));

    cmd(&home)
        .args(["--db", db_arg, "del", "1", "--force"])
        .assert()
        .success();

    let store = LocalStore::open(&db, TABLE).unwrap();
    assert_eq!(store.counts().unwrap().total, 0);
}

#[test]
fn status_reports_queue_and_unreachable_server() {
    let home = setup_home("cli_status");
    let db = setup_test_db("cli_status");
    let db_arg = db.to_str().unwrap();
    init(&home, &db);

    cmd(&home)
        .args(["--db", db_arg, "clock-in", "1", "--at", "2025-03-06 09:00"])
        .assert()
        .success();

    cmd(&home)
        .args(["--db", db_arg, "status"])
        .assert()
        .success()
        .stdout(contains("Unsynced"))
        .stdout(contains("unreachable"));
}

#[tokio::test]
async fn sync_command_reports_a_failed_push_without_failing() {
    let store = open_store("cli_sync_push_failed");
    let remote = FakeRemote::online();
    remote.set_fail_pushes(true);
    insert_valid(&store, 12, 6);

    let eng = engine(&store, &remote, SyncSettings::default());
    let outcome = run_once(&eng).await.expect("a failed push is not a command error");

    match outcome {
        SyncOutcome::PushFailed { error, .. } => {
            assert!(matches!(error, RemoteError::Connection(_)))
        }
        other => panic!("expected PushFailed, got {other:?}"),
    }
    assert_eq!(store.counts().unwrap().unsynced, 1);
}

#[tokio::test]
async fn sync_command_reports_a_rejected_batch_without_failing() {
    let store = open_store("cli_sync_rejected");
    let remote = FakeRemote::online().with_unique_clock_in();
    // same employee and clock-in twice in one batch
    insert_valid(&store, 13, 7);
    insert_valid(&store, 13, 7);

    let eng = engine(&store, &remote, SyncSettings::default());
    let outcome = run_once(&eng).await.expect("a rejected batch is not a command error");

    assert!(matches!(
        outcome,
        SyncOutcome::PushFailed {
            error: RemoteError::Constraint(_),
            ..
        }
    ));
    assert!(remote.rows().is_empty());
}
