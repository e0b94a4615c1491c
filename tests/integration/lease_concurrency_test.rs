//! Concurrency tests for the lease engine.

use std::sync::Arc;
use std::sync::Barrier;
use std::time::Duration;

use chrono::TimeDelta;

use boxoffice_core::error::{ConflictReason, ErrorKind};
use boxoffice_core::events::SeatEvent;
use boxoffice_core::types::{HolderId, SeatStatus};
use boxoffice_lease::{Clock, LeaseManager, ManualClock, SeatRegistry, SystemClock};

fn manager(ids: &[&str]) -> Arc<LeaseManager> {
    manager_with_clock(ids, Arc::new(SystemClock), 1024)
}

fn manager_with_clock(ids: &[&str], clock: Arc<dyn Clock>, event_buffer: usize) -> Arc<LeaseManager> {
    let registry = Arc::new(SeatRegistry::new(ids.iter().copied()).unwrap());
    Arc::new(LeaseManager::new(
        registry,
        clock,
        Duration::from_secs(60),
        Duration::from_secs(600),
        event_buffer,
    ))
}

#[test]
fn test_racing_acquires_have_one_winner() {
    const CONTENDERS: usize = 32;
    let manager = manager(&["A1"]);
    let barrier = Barrier::new(CONTENDERS);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let manager = &manager;
                let barrier = &barrier;
                s.spawn(move || {
                    let holder = HolderId::new(format!("user-{i}"));
                    barrier.wait();
                    manager.acquire("A1", &holder, None).map(|_| holder)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.conflict, Some(ConflictReason::AlreadyHeld));
    }

    let seat = manager.get("A1").unwrap();
    assert_eq!(seat.state.holder(), Some(winners[0]));
}

#[test]
fn test_racing_acquires_on_lapsed_seat_have_one_winner() {
    const CONTENDERS: usize = 32;
    let clock = Arc::new(ManualClock::default());
    let manager = manager_with_clock(&["A1"], clock.clone(), 1024);
    let mut events = manager.subscribe();

    manager
        .acquire("A1", &HolderId::from("carl"), Some(Duration::from_secs(1)))
        .unwrap();
    clock.advance(TimeDelta::seconds(2));

    let barrier = Barrier::new(CONTENDERS);
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let (manager, barrier) = (&manager, &barrier);
                s.spawn(move || {
                    let holder = HolderId::new(format!("user-{i}"));
                    barrier.wait();
                    manager.acquire("A1", &holder, None).map(|_| holder)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.conflict, Some(ConflictReason::AlreadyHeld));
    }
    assert_eq!(manager.get("A1").unwrap().state.holder(), Some(winners[0]));

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| match e.payload {
            SeatEvent::Held { holder, .. } => format!("held:{holder}"),
            SeatEvent::Expired { holder, .. } => format!("expired:{holder}"),
            SeatEvent::Committed { holder, .. } => format!("committed:{holder}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "held:carl".to_string(),
            "expired:carl".to_string(),
            format!("held:{}", winners[0]),
        ]
    );
}

#[test]
fn test_events_replay_to_a_consistent_history() {
    const WORKERS: usize = 8;
    const ROUNDS: usize = 200;
    let clock = Arc::new(ManualClock::default());
    let manager = manager_with_clock(&["A1"], clock.clone(), WORKERS * ROUNDS * 4);
    let mut events = manager.subscribe();
    let barrier = Barrier::new(WORKERS);

    std::thread::scope(|s| {
        for i in 0..WORKERS {
            let (manager, clock, barrier) = (&manager, &clock, &barrier);
            s.spawn(move || {
                let me = HolderId::new(format!("user-{i}"));
                barrier.wait();
                for _ in 0..ROUNDS {
                    let _ = manager.acquire("A1", &me, Some(Duration::from_secs(1)));
                    clock.advance(TimeDelta::milliseconds(600));
                    let _ = manager.list();
                }
            });
        }
    });
    let _ = manager.list();

    let mut holder: Option<HolderId> = None;
    let mut seen = 0;
    while let Ok(event) = events.try_recv() {
        seen += 1;
        match event.payload {
            SeatEvent::Held { holder: next, .. } => {
                assert!(holder.is_none(), "lease granted while {holder:?} held the seat");
                holder = Some(next);
            }
            SeatEvent::Expired { holder: prev, .. } => {
                assert_eq!(holder.as_ref(), Some(&prev), "expiry of a lease not on record");
                holder = None;
            }
            SeatEvent::Committed { .. } => panic!("nothing was confirmed"),
        }
    }
    assert!(seen > 0);
    assert_eq!(
        manager.get("A1").unwrap().state.holder().cloned(),
        holder
    );
}

#[test]
fn test_racing_confirms_commit_once() {
    const CONTENDERS: usize = 16;
    let manager = manager(&["A1"]);
    let bob = HolderId::from("bob");
    manager.acquire("A1", &bob, None).unwrap();
    let barrier = Barrier::new(CONTENDERS);

    let successes = std::thread::scope(|s| {
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let (manager, barrier, bob) = (&manager, &barrier, &bob);
                s.spawn(move || {
                    barrier.wait();
                    manager.confirm("A1", bob).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(successes, 1);
    assert_eq!(
        manager.get("A1").unwrap().state.status(),
        SeatStatus::Committed
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_seats_do_not_interfere() {
    let ids: Vec<String> = (1..=20).map(|n| format!("S{n}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let manager = manager(&id_refs);

    let tasks: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                let holder = HolderId::new(format!("owner-of-{id}"));
                manager.acquire(&id, &holder, None)?;
                manager.confirm(&id, &holder)
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let pool = manager.pool_status();
    assert_eq!(pool.total, 20);
    assert_eq!(pool.committed, 20);
}

#[test]
fn test_short_lease_lapses_in_real_time() {
    let manager = manager(&["A1"]);
    let carl = HolderId::from("carl");
    manager
        .acquire("A1", &carl, Some(Duration::from_secs(1)))
        .unwrap();

    std::thread::sleep(Duration::from_millis(1100));

    let err = manager.confirm("A1", &carl).unwrap_err();
    assert_eq!(err.conflict, Some(ConflictReason::Expired));
    assert!(manager.acquire("A1", &HolderId::from("dan"), None).is_ok());
}

#[tokio::test]
async fn test_background_sweep_reclaims_without_access() {
    let manager = manager(&["A1"]);
    let mut events = manager.subscribe();
    manager
        .acquire("A1", &HolderId::from("bob"), Some(Duration::from_secs(1)))
        .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let reclaimer = manager.reclaimer();
    let sweep = tokio::spawn(async move {
        reclaimer.run(Duration::from_millis(50), shutdown_rx).await;
    });

    let expired = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            let event = events.recv().await.unwrap();
            if matches!(event.payload, boxoffice_core::events::SeatEvent::Expired { .. }) {
                break event;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(expired.payload.seat_id().as_str(), "A1");

    shutdown_tx.send(true).unwrap();
    sweep.await.unwrap();
}
