#![cfg(loom)]

use holdfast::ptr::Deleter;
use holdfast::ptr::Shared;
use loom::sync::Arc;
use loom::sync::atomic::AtomicUsize;
use loom::sync::atomic::Ordering;
use loom::thread;
use std::ptr::NonNull;

fn counted(value: u64, calls: &Arc<AtomicUsize>) -> Shared<u64> {
  let calls: Arc<AtomicUsize> = Arc::clone(calls);

  let deleter: Deleter<u64> = Deleter::new(move |ptr: Option<NonNull<u64>>| {
    calls.fetch_add(1, Ordering::Relaxed);
    // SAFETY: The resource comes from `Box::into_raw` below.
    drop(ptr.map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) }));
  });

  // SAFETY: The pointer comes from `Box::into_raw`.
  unsafe { Shared::from_raw_with(Box::into_raw(Box::new(value)), deleter) }
}

#[test]
fn last_drop_destroys_once() {
  loom::model(|| {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let owner: Shared<u64> = counted(7, &calls);

    let threads: Vec<_> = (0..2)
      .map(|_| {
        let owner: Shared<u64> = owner.clone();

        thread::spawn(move || {
          assert_eq!(*owner, 7);
          drop(owner);
        })
      })
      .collect();

    drop(owner);

    for handle in threads {
      handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::Relaxed), 1);
  });
}

#[test]
fn clone_while_dropping() {
  loom::model(|| {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let owner: Shared<u64> = counted(3, &calls);
    let extra: Shared<u64> = owner.clone();

    let t1 = thread::spawn(move || {
      let copy: Shared<u64> = owner.clone();
      assert_eq!(*copy, 3);
    });

    let t2 = thread::spawn(move || {
      drop(extra);
    });

    t1.join().unwrap();
    t2.join().unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), 1);
  });
}
