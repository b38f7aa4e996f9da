#![cfg(loom)]

use holdfast::num::AtomicRefCount;
use loom::sync::Arc;
use loom::sync::atomic::Ordering;
use loom::thread;

#[test]
fn increment_if_nonzero_never_resurrects() {
  loom::model(|| {
    let count: Arc<AtomicRefCount> = Arc::new(AtomicRefCount::new(1));

    let t1 = {
      let count: Arc<AtomicRefCount> = Arc::clone(&count);
      thread::spawn(move || count.decrement())
    };

    let t2 = {
      let count: Arc<AtomicRefCount> = Arc::clone(&count);
      thread::spawn(move || count.increment_if_nonzero())
    };

    let prev: usize = t1.join().unwrap();
    let upgraded: bool = t2.join().unwrap();

    assert!(!(upgraded && prev == 1), "promoted a count that reached zero");

    let out: usize = count.load(Ordering::Relaxed);

    if upgraded {
      assert_eq!(out, 1);
    } else {
      assert_eq!(out, 0);
    }
  });
}

#[test]
fn concurrent_increments_are_counted() {
  loom::model(|| {
    let count: Arc<AtomicRefCount> = Arc::new(AtomicRefCount::new(1));

    let threads: Vec<_> = (0..2)
      .map(|_| {
        let count: Arc<AtomicRefCount> = Arc::clone(&count);

        thread::spawn(move || {
          count.increment();
          assert!(count.increment_if_nonzero());
        })
      })
      .collect();

    for handle in threads {
      handle.join().unwrap();
    }

    assert_eq!(count.load(Ordering::Relaxed), 5);
  });
}

#[test]
fn exactly_one_last_decrement() {
  loom::model(|| {
    let count: Arc<AtomicRefCount> = Arc::new(AtomicRefCount::new(2));

    let threads: Vec<_> = (0..2)
      .map(|_| {
        let count: Arc<AtomicRefCount> = Arc::clone(&count);
        thread::spawn(move || count.decrement() == 1)
      })
      .collect();

    let last: usize = threads
      .into_iter()
      .map(|handle| handle.join().unwrap())
      .filter(|last| *last)
      .count();

    assert_eq!(last, 1);
  });
}
