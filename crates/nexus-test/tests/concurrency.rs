//! Frames driven from several threads at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use nexus_common::error::FrameError;
use nexus_frames::{FrameOptions, FramedValue};
use nexus_test::model::{Address, NEW_STREET, OLD_CITY, OLD_STREET};
use nexus_test::utils::{frame, scheduler};
use rand::Rng;

#[test]
fn test_concurrent_writers_one_winner() {
    let scheduler = scheduler();
    let address = Address::with_initial(OLD_STREET, OLD_CITY);
    let threads = 4;
    let barrier = Barrier::new(threads);

    let results: Vec<Result<(), FrameError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let (scheduler, address, barrier) = (&scheduler, &address, &barrier);
                s.spawn(move || {
                    let f = scheduler.open(FrameOptions::writable()).unwrap();
                    address.set_street(&f, &format!("{i} Race Street")).unwrap();
                    barrier.wait();
                    let result = scheduler.commit(&f);
                    if result.is_err() {
                        scheduler.abort(&f).unwrap();
                    }
                    result
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(result.is_conflict());
    }

    let street = frame(&scheduler, |f| address.street(f)).unwrap();
    assert!(street.ends_with("Race Street"));
    assert_eq!(scheduler.open_frame_count(), 0);
    assert_eq!(scheduler.stats().conflicts.load(Ordering::Relaxed), 3);
}

#[test]
fn test_disjoint_writers_never_collide() {
    let scheduler = scheduler();
    let addresses: Vec<Address> = (0..8)
        .map(|_| Address::with_initial(OLD_STREET, OLD_CITY))
        .collect();

    thread::scope(|s| {
        for address in &addresses {
            let scheduler = &scheduler;
            s.spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..rng.gen_range(10..50) {
                    frame(scheduler, |f| {
                        if rng.gen_bool(0.5) {
                            address.set_street(f, NEW_STREET)
                        } else {
                            address.set_city(f, "Elsewhere")
                        }
                    })
                    .unwrap();
                }
            });
        }
    });

    assert_eq!(scheduler.stats().conflicts.load(Ordering::Relaxed), 0);
    assert_eq!(scheduler.open_frame_count(), 0);
}

#[test]
fn test_current_frame_is_per_thread() {
    let scheduler = scheduler();
    let counter = FramedValue::with_initial(0u32);

    let main_frame = scheduler.open(FrameOptions::writable()).unwrap();
    counter.set(&main_frame, 1).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            assert!(scheduler.current().is_none());
            let f = scheduler.open(FrameOptions::read_only()).unwrap();
            assert_eq!(scheduler.current(), Some(f.clone()));
            assert_eq!(counter.readable(&f).unwrap(), 0);
            scheduler.close().unwrap();
        });
    });

    assert_eq!(scheduler.current(), Some(main_frame.clone()));
    scheduler.close().unwrap();
    assert_eq!(counter.read_committed(&scheduler).unwrap(), 1);
}

#[test]
fn test_suspended_frame_restored_on_another_thread() {
    let scheduler = scheduler();
    let counter = FramedValue::with_initial(0u32);

    let f = scheduler.open(FrameOptions::writable()).unwrap();
    counter.set(&f, 7).unwrap();
    let f = scheduler.suspend().unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            scheduler.restore(f.clone()).unwrap();
            assert_eq!(counter.readable(&f).unwrap(), 7);
            scheduler.close().unwrap();
        });
    });

    assert!(scheduler.current().is_none());
    assert_eq!(counter.read_committed(&scheduler).unwrap(), 7);
}

#[test]
fn test_aborted_writes_never_visible_to_concurrent_readers() {
    let scheduler = scheduler();
    let counter = FramedValue::with_initial(0u32);
    let done = AtomicBool::new(false);
    let dirty_reads = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..3 {
            s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let f = scheduler.open(FrameOptions::read_only()).unwrap();
                    if counter.readable(&f).unwrap() == 99 {
                        dirty_reads.fetch_add(1, Ordering::Relaxed);
                    }
                    scheduler.close().unwrap();
                }
            });
        }

        for _ in 0..10_000 {
            let f = scheduler.open(FrameOptions::writable()).unwrap();
            counter.set(&f, 99).unwrap();
            scheduler.abort(&f).unwrap();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(dirty_reads.load(Ordering::Relaxed), 0);
    assert_eq!(counter.read_committed(&scheduler).unwrap(), 0);
    assert_eq!(scheduler.open_frame_count(), 0);
}
