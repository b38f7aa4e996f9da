use std::cell::UnsafeCell;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use crate::consts::MAX_REFCOUNT;
use crate::error::fatal;
use crate::loom::sync::atomic::AtomicUsize;
use crate::loom::sync::atomic::Ordering;
use crate::num::AtomicRefCount;
use crate::ptr::Deleter;

/// Heap record shared by every [`Shared`] and [`Weak`] of one resource.
///
/// - `strong` counts live [`Shared`] handles. The resource is destroyed when
///   it reaches zero, and it never rises again after that.
/// - `weak` counts live [`Weak`] handles, plus one held collectively by the
///   strong handles. The block itself is freed when it reaches zero.
///
/// [`Shared`]: crate::ptr::Shared
/// [`Weak`]: crate::ptr::Weak
pub(crate) struct ControlBlock<T>
where
  T: ?Sized,
{
  strong: AtomicRefCount,
  weak: AtomicUsize,
  deleter: UnsafeCell<ManuallyDrop<Deleter<T>>>,
}

impl<T> ControlBlock<T>
where
  T: ?Sized,
{
  /// Allocates a new block with one strong reference.
  pub(crate) fn allocate(deleter: Deleter<T>) -> NonNull<Self> {
    let this: Box<Self> = Box::new(Self {
      strong: AtomicRefCount::new(1),
      weak: AtomicUsize::new(1),
      deleter: UnsafeCell::new(ManuallyDrop::new(deleter)),
    });

    NonNull::from(Box::leak(this))
  }

  /// Returns the number of strong references.
  #[inline]
  pub(crate) fn strong_count(&self) -> usize {
    self.strong.load(Ordering::Relaxed)
  }

  /// Returns `true` once the resource has been (or is being) destroyed.
  #[inline]
  pub(crate) fn is_expired(&self) -> bool {
    self.strong.load(Ordering::Acquire) == 0
  }

  /// Adds a strong reference on behalf of a caller that already holds one.
  #[inline]
  pub(crate) fn acquire_strong(&self) {
    self.strong.increment();
  }

  /// Adds a strong reference only if the resource is still alive.
  #[inline]
  pub(crate) fn upgrade(&self) -> bool {
    self.strong.increment_if_nonzero()
  }

  /// Adds a weak reference.
  #[inline]
  pub(crate) fn acquire_weak(&self) {
    if self.weak.fetch_add(1, Ordering::Relaxed) > MAX_REFCOUNT {
      fatal!("weak reference count overflow");
    }
  }

  /// Drops one strong reference to the block at `this`.
  ///
  /// The caller that releases the last strong reference destroys `resource`
  /// with the stored deleter, then gives up the strong side's weak reference.
  ///
  /// # Safety
  ///
  /// `this` must point to a live block on which the caller holds a strong
  /// reference, and `resource` must be the resource the block guards.
  pub(crate) unsafe fn release_strong(this: NonNull<Self>, resource: NonNull<T>) {
    // SAFETY: The caller holds a strong reference, so the block is alive.
    let block: &Self = unsafe { this.as_ref() };

    if block.strong.decrement() != 1 {
      return;
    }

    // SAFETY: The strong count just reached zero and can never rise again,
    //         so this thread is the only one that will touch the deleter.
    let mut deleter: Deleter<T> = unsafe { ManuallyDrop::take(&mut *block.deleter.get()) };

    tracing::trace!(target: "holdfast", resource = ?resource, "destroying resource");

    // SAFETY: The last strong owner is destroying the resource it guarded.
    unsafe { deleter.delete(Some(resource)) };

    // SAFETY: The strong handles collectively held one weak reference.
    unsafe { Self::release_weak(this) };
  }

  /// Drops one weak reference to the block at `this`, freeing it if last.
  ///
  /// # Safety
  ///
  /// `this` must point to a live block on which the caller holds a weak
  /// reference.
  pub(crate) unsafe fn release_weak(this: NonNull<Self>) {
    // SAFETY: The caller holds a weak reference, so the block is alive.
    let block: &Self = unsafe { this.as_ref() };

    if block.weak.fetch_sub(1, Ordering::AcqRel) != 1 {
      return;
    }

    tracing::trace!(target: "holdfast", block = ?this, "freeing control block");

    // SAFETY: This was the last reference of any kind; the block came from
    //         `Box::leak` in `allocate`, and the deleter was already taken.
    drop(unsafe { Box::from_raw(this.as_ptr()) });
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
