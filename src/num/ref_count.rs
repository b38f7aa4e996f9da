use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result;

use crate::consts::MAX_REFCOUNT;
use crate::error::fatal;
use crate::loom::hint::spin_loop;
use crate::loom::sync::atomic::AtomicUsize;
use crate::loom::sync::atomic::Ordering;

/// A reference counter which can be safely shared between threads.
///
/// Once the count has dropped to zero it can never be raised again through
/// [`increment_if_nonzero`]; this is what makes weak promotion sound.
///
/// This type has the same size and bit validity as a [`AtomicUsize`].
///
/// [`increment_if_nonzero`]: Self::increment_if_nonzero
#[repr(transparent)]
pub struct AtomicRefCount {
  inner: AtomicUsize,
}

impl AtomicRefCount {
  /// Creates a new `AtomicRefCount` holding `value`.
  #[inline]
  pub fn new(value: usize) -> Self {
    Self {
      inner: AtomicUsize::new(value),
    }
  }

  /// Loads the current count.
  ///
  /// The value is advisory: other threads may change it at any time.
  #[inline]
  pub fn load(&self, order: Ordering) -> usize {
    self.inner.load(order)
  }

  /// Increments the count, returning the previous value.
  ///
  /// The caller must already hold a reference, so the count is known to be
  /// non-zero and no ordering is required on the counter itself.
  ///
  /// # Aborts
  ///
  /// Aborts the process if the count exceeds [`MAX_REFCOUNT`].
  #[inline]
  pub fn increment(&self) -> usize {
    let prev: usize = self.inner.fetch_add(1, Ordering::Relaxed);

    if prev > MAX_REFCOUNT {
      overflow();
    }

    prev
  }

  /// Decrements the count, returning the previous value.
  ///
  /// A return value of `1` means the caller released the last reference and
  /// is now the only thread allowed to touch the guarded state. The
  /// acquire-release ordering makes every write done under earlier references
  /// visible to that thread.
  #[inline]
  pub fn decrement(&self) -> usize {
    self.inner.fetch_sub(1, Ordering::AcqRel)
  }

  /// Increments the count only if it is currently non-zero.
  ///
  /// Returns `true` if the count was incremented. The check and the increment
  /// are a single atomic step, so a count observed as positive cannot drop to
  /// zero before the increment lands.
  ///
  /// # Aborts
  ///
  /// Aborts the process if the count exceeds [`MAX_REFCOUNT`].
  #[inline]
  pub fn increment_if_nonzero(&self) -> bool {
    let mut current: usize = self.inner.load(Ordering::Relaxed);

    'increment: loop {
      if current == 0 {
        break 'increment false;
      }

      if current > MAX_REFCOUNT {
        overflow();
      }

      match self.inner.compare_exchange_weak(
        current,
        current + 1,
        Ordering::Acquire,
        Ordering::Relaxed,
      ) {
        Ok(_) => break 'increment true,
        Err(next) => {
          current = next;
          spin_loop();
        }
      }
    }
  }
}

#[cold]
fn overflow() -> ! {
  fatal!("reference count overflow")
}

impl Debug for AtomicRefCount {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Debug::fmt(&self.inner, f)
  }
}

impl Default for AtomicRefCount {
  /// Creates a count of one, the state of a freshly allocated block.
  #[inline]
  fn default() -> Self {
    Self::new(1)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
