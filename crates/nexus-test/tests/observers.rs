//! Read, write, and commit observer scenarios.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use nexus_common::config::FrameConfig;
use nexus_frames::{CommitSet, FrameOptions, FrameScheduler, FramedObject, ObjectHandle};
use nexus_test::model::{Address, NEW_STREET, OLD_CITY, OLD_STREET};
use nexus_test::utils::{frame, observed_frame, scheduler};
use parking_lot::Mutex;

fn recorder() -> (Arc<Mutex<Vec<ObjectHandle>>>, impl Fn(ObjectHandle) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |handle| sink.lock().push(handle))
}

#[test]
fn test_observe_read_single() {
    let scheduler = scheduler();
    let address = frame(&scheduler, |f| Address::new(f, OLD_STREET, OLD_CITY)).unwrap();

    let (seen, observer) = recorder();
    observed_frame(&scheduler, observer, |f| {
        assert_eq!(address.street(f)?, OLD_STREET);
        Ok(())
    })
    .unwrap();

    assert_eq!(*seen.lock(), vec![address.street_handle()]);
}

#[test]
fn test_frame_and_global_read_observers() {
    let scheduler = scheduler();
    let address = frame(&scheduler, |f| Address::new(f, OLD_STREET, OLD_CITY)).unwrap();

    let (frame_seen, frame_observer) = recorder();
    let (global_seen, global_observer) = recorder();

    let f = scheduler
        .open(FrameOptions::writable().with_read_observer(frame_observer))
        .unwrap();
    scheduler.observe_reads(global_observer, || {
        assert_eq!(address.street(&f).unwrap(), OLD_STREET);
    });
    assert_eq!(scheduler.observers().read_observer_count(), 0);
    scheduler.commit(&f).unwrap();

    assert_eq!(*frame_seen.lock(), vec![address.street_handle()]);
    assert_eq!(*global_seen.lock(), vec![address.street_handle()]);
}

#[test]
fn test_global_read_observer_survives_frame_switch() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let (seen, observer) = recorder();

    scheduler.observe_reads(observer, || {
        frame(&scheduler, |f| address.street(f)).unwrap();
        frame(&scheduler, |f| address.city(f)).unwrap();
    });
    frame(&scheduler, |f| address.street(f)).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&address.street_handle()));
    assert!(seen.contains(&address.city_value().handle()));
}

#[test]
fn test_read_notifications_deduplicated() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let (seen, observer) = recorder();

    observed_frame(&scheduler, observer, |f| {
        for _ in 0..10 {
            address.street(f)?;
        }
        address.set_street(f, NEW_STREET)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn test_reentrant_read_observer() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let nested_reads = Arc::new(AtomicUsize::new(0));

    let f = scheduler.open(FrameOptions::read_only()).unwrap();
    let observer = {
        let f = f.clone();
        let city = address.city_value().clone();
        let nested_reads = Arc::clone(&nested_reads);
        move |_| {
            city.readable(&f).unwrap();
            nested_reads.fetch_add(1, Ordering::Relaxed);
        }
    };
    scheduler.observe_reads(observer, || {
        assert_eq!(address.street(&f).unwrap(), OLD_STREET);
    });
    scheduler.commit(&f).unwrap();

    // Street, then the city read made from inside the observer.
    assert_eq!(nested_reads.load(Ordering::Relaxed), 2);
}

#[test]
fn test_reentrant_read_observer_without_dedupe() {
    let config = FrameConfig {
        dedupe_read_notifications: false,
        ..Default::default()
    };
    let scheduler = FrameScheduler::with_config(config).unwrap();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let notifications = Arc::new(AtomicUsize::new(0));

    let f = scheduler.open(FrameOptions::read_only()).unwrap();
    let observer = {
        let f = f.clone();
        let city = address.city_value().clone();
        let notifications = Arc::clone(&notifications);
        move |_| {
            notifications.fetch_add(1, Ordering::Relaxed);
            city.readable(&f).unwrap();
        }
    };
    scheduler.observe_reads(observer, || {
        assert_eq!(address.street(&f).unwrap(), OLD_STREET);
        assert_eq!(address.street(&f).unwrap(), OLD_STREET);
    });
    scheduler.commit(&f).unwrap();

    // Each street read reports street and the nested city read; the city
    // read made while reporting city is not reported again.
    assert_eq!(notifications.load(Ordering::Relaxed), 4);
}

#[test]
fn test_global_read_observer_ignores_other_threads() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let other = Address::with_initial(OLD_STREET, OLD_CITY);
    let (seen, observer) = recorder();

    scheduler.observe_reads(observer, || {
        thread::scope(|s| {
            s.spawn(|| frame(&scheduler, |f| other.city(f)).unwrap());
        });
        frame(&scheduler, |f| address.street(f)).unwrap();
    });

    assert_eq!(*seen.lock(), vec![address.street_handle()]);
    assert_eq!(scheduler.observers().read_observer_count(), 0);
}

#[test]
fn test_observe_read_multiple() {
    let scheduler = scheduler();
    let to_read = frame(&scheduler, |f| Address::many(f, 100)).unwrap();
    let to_ignore = frame(&scheduler, |f| Address::many(f, 100)).unwrap();

    let (seen, observer) = recorder();
    observed_frame(&scheduler, observer, |f| {
        for address in &to_read {
            assert_eq!(address.street(f)?, OLD_STREET);
        }
        Ok(())
    })
    .unwrap();

    let seen: HashSet<ObjectHandle> = seen.lock().iter().copied().collect();
    assert_eq!(seen.len(), 100);
    for address in &to_read {
        assert!(seen.contains(&address.street_handle()));
    }
    for address in &to_ignore {
        assert!(!seen.contains(&address.street_handle()));
    }
}

#[test]
fn test_write_observer() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let (seen, observer) = recorder();

    scheduler
        .run_with(FrameOptions::writable().with_write_observer(observer), |f| {
            address.set_street(f, NEW_STREET)?;
            address.set_street(f, "again")?;
            address.city(f)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(*seen.lock(), vec![address.street_handle()]);
}

#[test]
fn test_observe_commit_single() {
    let scheduler = scheduler();
    let address = frame(&scheduler, |f| Address::new(f, OLD_STREET, OLD_CITY)).unwrap();

    let committed: Arc<Mutex<Option<CommitSet>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&committed);
    let handle = scheduler.register_commit_observer(move |set| {
        *sink.lock() = Some(set.clone());
    });
    frame(&scheduler, |f| address.set_street(f, NEW_STREET)).unwrap();
    drop(handle);

    let committed = committed.lock();
    let set = committed.as_ref().unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains(&address.street_handle()));
}

#[test]
fn test_observe_commit_multiple() {
    let scheduler = scheduler();
    let to_write = frame(&scheduler, |f| Address::many(f, 100)).unwrap();
    let to_ignore = frame(&scheduler, |f| Address::many(f, 100)).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let committed: Arc<Mutex<Option<CommitSet>>> = Arc::new(Mutex::new(None));
    let handle = {
        let calls = Arc::clone(&calls);
        let committed = Arc::clone(&committed);
        scheduler.register_commit_observer(move |set| {
            calls.fetch_add(1, Ordering::Relaxed);
            *committed.lock() = Some(set.clone());
        })
    };

    frame(&scheduler, |f| {
        for address in &to_write {
            address.set_street(f, NEW_STREET)?;
        }
        Ok(())
    })
    .unwrap();
    handle.unregister();

    assert_eq!(calls.load(Ordering::Relaxed), 1);
    let committed = committed.lock();
    let set = committed.as_ref().unwrap();
    assert_eq!(set.len(), 100);
    for address in &to_write {
        assert!(set.contains(&address.street_handle()));
    }
    for address in &to_ignore {
        assert!(!set.contains(&address.street_handle()));
    }
}

#[test]
fn test_commit_observers_not_called_on_conflict() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let _handle = scheduler.register_commit_observer(move |_| {
        c.fetch_add(1, Ordering::Relaxed);
    });

    let loser = scheduler.open(FrameOptions::writable()).unwrap();
    address.set_street(&loser, "loser").unwrap();
    let loser = scheduler.suspend().unwrap();
    frame(&scheduler, |f| address.set_street(f, "winner")).unwrap();

    assert!(scheduler.commit(&loser).is_err());
    scheduler.abort(&loser).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_unregistered_observer_not_called() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let handle = scheduler.register_commit_observer(move |_| {
        c.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(scheduler.observers().commit_observer_count(), 1);
    drop(handle);
    assert_eq!(scheduler.observers().commit_observer_count(), 0);

    frame(&scheduler, |f| address.set_street(f, NEW_STREET)).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn test_commit_observer_may_register_another() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let handles = Arc::new(Mutex::new(Vec::new()));

    let _handle = {
        let scheduler = scheduler.clone();
        let handles = Arc::clone(&handles);
        scheduler.clone().register_commit_observer(move |_| {
            handles.lock().push(scheduler.register_commit_observer(|_| {}));
        })
    };
    frame(&scheduler, |f| address.set_street(f, NEW_STREET)).unwrap();

    assert_eq!(handles.lock().len(), 1);
    assert_eq!(scheduler.observers().commit_observer_count(), 2);
}
