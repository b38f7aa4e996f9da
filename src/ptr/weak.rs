use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Pointer;
use std::fmt::Result as FmtResult;
use std::hash::Hash;
use std::hash::Hasher;
use std::mem;
use std::ptr::NonNull;

use crate::ptr::Shared;
use crate::ptr::control::ControlBlock;
use crate::ptr::shared::Link;
use crate::ptr::unique::addr;

/// A non-owning observer of a [`Shared`] resource.
///
/// A `Weak` never keeps the resource alive. It can report whether the
/// resource is gone ([`expired`]) and try to become a [`Shared`] again
/// ([`lock`]). The observer stays valid to clone, compare, and query after
/// the resource has been destroyed; only the control block is kept alive.
///
/// # Examples
///
/// ```
/// use holdfast::ptr::Shared;
/// use holdfast::ptr::Weak;
///
/// let owner: Shared<u32> = Shared::new(5);
/// let weak: Weak<u32> = owner.downgrade();
///
/// assert!(!weak.expired());
/// assert_eq!(*weak.lock(), 5);
///
/// drop(owner);
///
/// assert!(weak.expired());
/// assert!(weak.lock().is_null());
/// ```
///
/// [`expired`]: Self::expired
/// [`lock`]: Self::lock
pub struct Weak<T>
where
  T: ?Sized,
{
  link: Option<Link<T>>,
}

impl<T> Weak<T>
where
  T: ?Sized,
{
  /// Creates an observer that observes nothing.
  #[inline]
  pub const fn null() -> Self {
    Self { link: None }
  }

  /// Creates an observer of the resource owned by `shared`.
  ///
  /// The strong count is left unchanged.
  #[inline]
  pub fn new(shared: &Shared<T>) -> Self {
    let link: Option<Link<T>> = shared.link();

    if let Some(link) = link {
      // SAFETY: `shared` holds a strong reference.
      unsafe { link.block() }.acquire_weak();
    }

    Self { link }
  }

  /// Returns the observed pointer, or `None` if nothing is observed.
  ///
  /// The pointer must not be dereferenced once the observer has expired.
  #[inline]
  pub fn as_ptr(&self) -> Option<NonNull<T>> {
    self.link.map(|link| link.ptr)
  }

  /// Returns `true` if there is no resource to promote.
  #[inline]
  pub fn expired(&self) -> bool {
    match self.link {
      // SAFETY: This observer holds a weak reference.
      Some(link) => unsafe { link.block() }.is_expired(),
      None => true,
    }
  }

  /// Returns the number of live strong handles, or `0` if nothing is observed.
  #[inline]
  pub fn use_count(&self) -> usize {
    match self.link {
      // SAFETY: This observer holds a weak reference.
      Some(link) => unsafe { link.block() }.strong_count(),
      None => 0,
    }
  }

  /// Attempts to promote this observer to a [`Shared`] owner.
  ///
  /// Returns an empty [`Shared`] if the resource has already been destroyed.
  /// The liveness check and the strong increment are one atomic step.
  pub fn lock(&self) -> Shared<T> {
    let Some(link) = self.link else {
      return Shared::null();
    };

    // SAFETY: This observer holds a weak reference.
    if unsafe { link.block() }.upgrade() {
      Shared::from_counted(link)
    } else {
      tracing::trace!(target: "holdfast", resource = ?link.ptr, "promotion failed");
      Shared::null()
    }
  }

  /// Stops observing, leaving an empty observer.
  #[inline]
  pub fn reset(&mut self) {
    if let Some(link) = self.link.take() {
      // SAFETY: This observer held a weak reference, now given up.
      unsafe { ControlBlock::release_weak(link.block) };
    }
  }

  /// Exchanges the observed resources of `self` and `other`.
  #[inline]
  pub fn swap(&mut self, other: &mut Self) {
    mem::swap(&mut self.link, &mut other.link);
  }
}

impl<T> Clone for Weak<T>
where
  T: ?Sized,
{
  #[inline]
  fn clone(&self) -> Self {
    if let Some(link) = self.link {
      // SAFETY: This observer holds a weak reference.
      unsafe { link.block() }.acquire_weak();
    }

    Self { link: self.link }
  }
}

impl<T> Drop for Weak<T>
where
  T: ?Sized,
{
  #[inline]
  fn drop(&mut self) {
    self.reset();
  }
}

// SAFETY: A `Weak<T>` can become a `Shared<T>`, so it carries the same bounds.
unsafe impl<T> Send for Weak<T> where T: Send + Sync + ?Sized {}

// SAFETY: See `Send`.
unsafe impl<T> Sync for Weak<T> where T: Send + Sync + ?Sized {}

impl<T> Debug for Weak<T>
where
  T: ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("(Weak)")
  }
}

impl<T> Pointer for Weak<T>
where
  T: ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Pointer::fmt(&addr(self.as_ptr()), f)
  }
}

impl<T> Default for Weak<T>
where
  T: ?Sized,
{
  #[inline]
  fn default() -> Self {
    Self::null()
  }
}

impl<T> Hash for Weak<T>
where
  T: ?Sized,
{
  #[inline]
  fn hash<H>(&self, state: &mut H)
  where
    H: Hasher,
  {
    addr(self.as_ptr()).hash(state);
  }
}

impl<T> PartialEq for Weak<T>
where
  T: ?Sized,
{
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    addr(self.as_ptr()) == addr(other.as_ptr())
  }
}

impl<T> Eq for Weak<T> where T: ?Sized {}

impl<T> From<&Shared<T>> for Weak<T>
where
  T: ?Sized,
{
  #[inline]
  fn from(other: &Shared<T>) -> Self {
    Self::new(other)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(all(test, not(loom)))]
mod tests {
  use std::ptr::NonNull;
  use std::sync::Arc;
  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;

  use crate::ptr::Deleter;
  use crate::ptr::Shared;
  use crate::ptr::Weak;

  #[test]
  fn test_null_is_expired() {
    let weak: Weak<u32> = Weak::null();

    assert!(weak.expired());
    assert!(weak.lock().is_null());
    assert_eq!(weak.use_count(), 0);
  }

  #[test]
  fn test_no_strong_increment() {
    let owner: Shared<u32> = Shared::new(1);
    let weak: Weak<u32> = Weak::new(&owner);
    let copy: Weak<u32> = weak.clone();

    assert_eq!(owner.use_count(), 1);
    assert_eq!(weak.use_count(), 1);
    assert_eq!(weak, copy);
    assert_eq!(weak.as_ptr(), owner.as_ptr());
  }

  #[test]
  fn test_lock_increments() {
    let owner: Shared<u32> = Shared::new(3);
    let weak: Weak<u32> = owner.downgrade();
    let locked: Shared<u32> = weak.lock();

    assert_eq!(owner.use_count(), 2);
    assert_eq!(locked, owner);
    assert!(locked.shares_block(&owner));
  }

  #[test]
  fn test_expires_with_last_owner() {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

    let deleter: Deleter<u32> = {
      let calls: Arc<AtomicUsize> = Arc::clone(&calls);

      Deleter::new(move |ptr: Option<NonNull<u32>>| {
        calls.fetch_add(1, Ordering::SeqCst);
        // SAFETY: The resource comes from `Box::into_raw` below.
        drop(ptr.map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) }));
      })
    };

    // SAFETY: The pointer comes from `Box::into_raw`.
    let owner: Shared<u32> =
      unsafe { Shared::from_raw_with(Box::into_raw(Box::new(9)), deleter) };
    let other: Shared<u32> = owner.clone();
    let weak: Weak<u32> = owner.downgrade();

    drop(owner);
    assert!(!weak.expired());

    drop(other);
    assert!(weak.expired());
    assert!(weak.lock().is_null());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let copy: Weak<u32> = weak.clone();

    assert_eq!(copy, weak);
    assert!(copy.expired());
  }

  #[test]
  fn test_lock_keeps_alive() {
    let owner: Shared<String> = Shared::new(String::from("alive"));
    let weak: Weak<String> = owner.downgrade();
    let locked: Shared<String> = weak.lock();

    drop(owner);

    assert!(!weak.expired());
    assert_eq!(locked.as_str(), "alive");

    drop(locked);

    assert!(weak.expired());
  }

  #[test]
  fn test_reset_and_swap() {
    let owner: Shared<u32> = Shared::new(1);
    let mut a: Weak<u32> = owner.downgrade();
    let mut b: Weak<u32> = Weak::null();

    a.swap(&mut b);

    assert!(a.expired());
    assert!(!b.expired());

    b.reset();

    assert!(b.expired());
    assert_eq!(owner.use_count(), 1);
  }
}
