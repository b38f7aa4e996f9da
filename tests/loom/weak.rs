#![cfg(loom)]

use holdfast::ptr::Deleter;
use holdfast::ptr::Shared;
use holdfast::ptr::Weak;
use loom::sync::Arc;
use loom::sync::atomic::AtomicBool;
use loom::sync::atomic::AtomicUsize;
use loom::sync::atomic::Ordering;
use loom::thread;
use std::ptr::NonNull;

/// A resource that records its own destruction.
struct Tracked {
  dead: Arc<AtomicBool>,
}

fn tracked(dead: &Arc<AtomicBool>, calls: &Arc<AtomicUsize>) -> Shared<Tracked> {
  let calls: Arc<AtomicUsize> = Arc::clone(calls);

  let deleter: Deleter<Tracked> = Deleter::new(move |ptr: Option<NonNull<Tracked>>| {
    calls.fetch_add(1, Ordering::Relaxed);

    if let Some(ptr) = ptr {
      // SAFETY: The resource comes from `Box::into_raw` below.
      let value: Box<Tracked> = unsafe { Box::from_raw(ptr.as_ptr()) };
      value.dead.store(true, Ordering::Release);
    }
  });

  let value: Box<Tracked> = Box::new(Tracked {
    dead: Arc::clone(dead),
  });

  // SAFETY: The pointer comes from `Box::into_raw`.
  unsafe { Shared::from_raw_with(Box::into_raw(value), deleter) }
}

#[test]
fn lock_races_last_drop() {
  loom::model(|| {
    let dead: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let owner: Shared<Tracked> = tracked(&dead, &calls);
    let weak: Weak<Tracked> = owner.downgrade();

    let t1 = thread::spawn(move || {
      drop(owner);
    });

    let t2 = thread::spawn(move || {
      let locked: Shared<Tracked> = weak.lock();

      if let Some(value) = locked.get() {
        assert!(!value.dead.load(Ordering::Acquire), "promoted a destroyed resource");
      }
    });

    t1.join().unwrap();
    t2.join().unwrap();

    assert!(dead.load(Ordering::Acquire));
    assert_eq!(calls.load(Ordering::Relaxed), 1);
  });
}

#[test]
fn weak_outlives_owner_on_other_thread() {
  loom::model(|| {
    let dead: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let owner: Shared<Tracked> = tracked(&dead, &calls);
    let weak: Weak<Tracked> = owner.downgrade();
    let copy: Weak<Tracked> = weak.clone();

    let t1 = thread::spawn(move || {
      drop(owner);
      drop(weak);
    });

    let t2 = thread::spawn(move || {
      let _expired: bool = copy.expired();
      drop(copy);
    });

    t1.join().unwrap();
    t2.join().unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), 1);
  });
}
