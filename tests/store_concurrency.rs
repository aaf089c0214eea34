//! Concurrency properties of the lock-coordination protocol.
//!
//! Covers the core guarantees: per-key mutual exclusion, single-entry
//! creation under racing creators, independence of distinct keys, and
//! wakeup of blocked acquirers on release.

use lockstore::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn key(s: &str) -> Key {
    Key::parse(s).unwrap()
}

/// At most one caller is ever inside a key's critical section.
#[test]
fn mutual_exclusion_on_one_key() {
    const THREADS: usize = 8;
    const ITERS: usize = 200;

    let store = Arc::new(Store::new());
    let in_section = Arc::new(AtomicU32::new(0));

    let handles = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            let in_section = Arc::clone(&in_section);
            thread::spawn(move || {
                let k = key("shared");
                for _ in 0..ITERS {
                    let token = store.put(&k, "payload").unwrap();
                    assert_eq!(in_section.fetch_add(1, Ordering::AcqRel), 0);
                    assert_eq!(in_section.fetch_sub(1, Ordering::AcqRel), 1);
                    store.update(&k, &token, "payload", ReleaseFlag::Release).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();

    handles.into_iter().for_each(|h| h.join().unwrap());
    assert_eq!(store.len(), 1);
}

/// Two workers racing to create the same brand-new key observe a single
/// entry: one wins the first acquisition, the other blocks until release.
#[test]
fn racing_creators_share_one_entry() {
    let store = Arc::new(Store::new());
    let barrier = Arc::new(Barrier::new(2));
    let in_section = Arc::new(AtomicU32::new(0));

    let handles = (0..2)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let in_section = Arc::clone(&in_section);
            thread::spawn(move || {
                let k = key("x");
                barrier.wait();
                let token = store.put(&k, format!("writer-{i}")).unwrap();
                assert_eq!(in_section.fetch_add(1, Ordering::AcqRel), 0);
                thread::sleep(Duration::from_millis(10));
                assert_eq!(in_section.fetch_sub(1, Ordering::AcqRel), 1);
                store.update(&k, &token, format!("writer-{i}"), ReleaseFlag::Release).unwrap();
                token
            })
        })
        .collect::<Vec<_>>();

    let tokens = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();

    assert_eq!(store.len(), 1, "racers must share a single entry");
    assert_ne!(tokens[0], tokens[1], "waiter must get its own fresh token");
}

/// A held lock on one key never delays progress on another key.
#[test]
fn busy_key_does_not_block_other_keys() {
    let store = Arc::new(Store::new());
    let busy = key("busy");
    let token = store.put(&busy, "held").unwrap();

    let (tx, rx) = mpsc::channel();
    {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let other = key("other");
            let token = store.put(&other, "free").unwrap();
            store.update(&other, &token, "free", ReleaseFlag::Release).unwrap();
            tx.send(()).unwrap();
        });
    }

    // Must complete while "busy" is still locked.
    rx.recv_timeout(Duration::from_secs(5))
        .expect("operation on an unrelated key was blocked by a busy key");

    store.update(&busy, &token, "held", ReleaseFlag::Release).unwrap();
}

/// A blocked reservation wakes on release and sees the final written value.
#[test]
fn blocked_reservation_wakes_on_release() {
    let store = Arc::new(Store::new());
    let k = key("handoff");
    let token = store.put(&k, "draft").unwrap();

    let (tx, rx) = mpsc::channel();
    {
        let store = Arc::clone(&store);
        let k = k.clone();
        thread::spawn(move || {
            // Blocks: the lock is currently held by the main thread.
            let reservation = store.reserve(&k).unwrap();
            tx.send(reservation).unwrap();
        });
    }

    // Give the waiter time to block, then write the final value and release.
    thread::sleep(Duration::from_millis(50));
    store.update(&k, &token, "final", ReleaseFlag::Release).unwrap();

    let reservation = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("blocked reservation never woke up");
    assert_eq!(reservation.value, b"final");
    assert_ne!(reservation.token, token, "waiter must not inherit the old token");

    store
        .update(&k, &reservation.token, "final", ReleaseFlag::Release)
        .unwrap();
}

/// Each release wakes exactly one waiter; a queue of waiters drains one
/// acquisition at a time without losing anyone.
#[test]
fn release_wakes_exactly_one_waiter_until_queue_drains() {
    const WAITERS: usize = 6;

    let store = Arc::new(Store::new());
    let k = key("queue");
    let token = store.put(&k, "0").unwrap();

    let (tx, rx) = mpsc::channel();
    let handles = (0..WAITERS)
        .map(|_| {
            let store = Arc::clone(&store);
            let k = k.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let reservation = store.reserve(&k).unwrap();
                tx.send(reservation.token.clone()).unwrap();
                store
                    .update(&k, &reservation.token, "pass", ReleaseFlag::Release)
                    .unwrap();
            })
        })
        .collect::<Vec<_>>();
    drop(tx);

    thread::sleep(Duration::from_millis(50));
    store.update(&k, &token, "1", ReleaseFlag::Release).unwrap();

    let mut tokens = Vec::new();
    while let Ok(t) = rx.recv_timeout(Duration::from_secs(5)) {
        tokens.push(t);
    }
    handles.into_iter().for_each(|h| h.join().unwrap());

    assert_eq!(tokens.len(), WAITERS, "every waiter must eventually acquire");
    for (i, a) in tokens.iter().enumerate() {
        for b in tokens.iter().skip(i + 1) {
            assert_ne!(a, b, "two waiters received the same token");
        }
    }
}
