mod common;

use clocksync::core::scheduler::Scheduler;
use clocksync::core::sync::{SyncOutcome, SyncSettings};
use common::{FakeRemote, engine, insert_valid, open_store};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn periodic_ticks_drain_the_queue_batch_by_batch() {
    let store = open_store("sched_periodic");
    let remote = FakeRemote::online();
    for emp in 1..=5 {
        insert_valid(&store, emp, 20);
    }

    let settings = SyncSettings {
        batch_size: 2,
        ..SyncSettings::default()
    };
    let eng = Arc::new(engine(&store, &remote, settings));
    let handle = Scheduler::new(eng, Duration::from_millis(20)).spawn(CancellationToken::new());

    let mut drained = false;
    for _ in 0..100 {
        if store.counts().unwrap().unsynced == 0 {
            drained = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.shutdown().await;

    assert!(drained, "queue should drain within a few periods");
    assert_eq!(remote.rows().len(), 5);
}

#[tokio::test]
async fn remote_that_comes_back_is_picked_up_by_the_next_tick() {
    let store = open_store("sched_reconnect");
    let remote = FakeRemote::offline();
    insert_valid(&store, 9, 21);

    let eng = Arc::new(engine(&store, &remote, SyncSettings::default()));
    let handle = Scheduler::new(eng, Duration::from_millis(20)).spawn(CancellationToken::new());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(store.counts().unwrap().unsynced, 1);

    remote.set_reachable(true);
    for _ in 0..100 {
        if store.counts().unwrap().unsynced == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.shutdown().await;

    assert_eq!(store.counts().unwrap().unsynced, 0);
}

#[tokio::test]
async fn manual_trigger_runs_a_cycle_between_ticks() {
    let store = open_store("sched_sync_now");
    let remote = FakeRemote::online();

    let eng = Arc::new(engine(&store, &remote, SyncSettings::default()));
    let handle = Scheduler::new(eng, Duration::from_secs(3600)).spawn(CancellationToken::new());

    // let the immediate first tick finish on the empty queue
    tokio::time::sleep(Duration::from_millis(50)).await;
    insert_valid(&store, 3, 22);

    let outcome = handle.sync_now().await.expect("manual cycle");
    assert!(matches!(outcome, SyncOutcome::Synced { pushed: 1, .. }));
    assert_eq!(remote.rows().len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn manual_trigger_during_a_running_cycle_is_dropped() {
    let store = open_store("sched_sync_now_busy");
    let remote = FakeRemote::online();
    remote.set_push_delay(Duration::from_millis(300));
    insert_valid(&store, 4, 23);

    let eng = Arc::new(engine(&store, &remote, SyncSettings::default()));
    let handle = Scheduler::new(eng, Duration::from_secs(3600)).spawn(CancellationToken::new());

    // the first tick is now blocked inside the slow push
    tokio::time::sleep(Duration::from_millis(50)).await;
    let outcome = handle.sync_now().await.expect("manual cycle");
    assert!(matches!(outcome, SyncOutcome::Busy));

    handle.shutdown().await;
    assert_eq!(remote.rows().len(), 1);
    assert_eq!(remote.inserts(), 1);
}

#[tokio::test]
async fn cancelling_the_token_stops_the_loop() {
    let store = open_store("sched_shutdown");
    let remote = FakeRemote::online();

    let eng = Arc::new(engine(&store, &remote, SyncSettings::default()));
    let token = CancellationToken::new();
    let handle = Scheduler::new(eng, Duration::from_millis(10)).spawn(token.clone());
    assert!(handle.is_running());

    token.cancel();
    for _ in 0..100 {
        if !handle.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!handle.is_running());

    let pings = remote.ping_calls.load(std::sync::atomic::Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(remote.ping_calls.load(std::sync::atomic::Ordering::SeqCst), pings);

    handle.shutdown().await;
}
