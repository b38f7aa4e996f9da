use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Pointer;
use std::fmt::Result as FmtResult;
use std::hash::Hash;
use std::hash::Hasher;
use std::mem;
use std::ops::Deref;
use std::ptr::NonNull;

use crate::error::null_deref;
use crate::ptr::Deleter;
use crate::ptr::Weak;
use crate::ptr::control::ControlBlock;
use crate::ptr::unique::addr;

// -----------------------------------------------------------------------------
// Link
// -----------------------------------------------------------------------------

/// The resource pointer and control block of a non-empty handle.
///
/// Keeping both in one value makes "pointer is set iff block is set" hold by
/// construction.
pub(crate) struct Link<T>
where
  T: ?Sized,
{
  pub(crate) ptr: NonNull<T>,
  pub(crate) block: NonNull<ControlBlock<T>>,
}

impl<T> Link<T>
where
  T: ?Sized,
{
  /// Returns the control block.
  ///
  /// # Safety
  ///
  /// The caller must hold a strong or weak reference on the block.
  #[inline]
  pub(crate) unsafe fn block(&self) -> &ControlBlock<T> {
    // SAFETY: This is guaranteed to be safe by the caller.
    unsafe { self.block.as_ref() }
  }
}

impl<T> Clone for Link<T>
where
  T: ?Sized,
{
  #[inline]
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Link<T> where T: ?Sized {}

// -----------------------------------------------------------------------------
// Shared
// -----------------------------------------------------------------------------

/// A reference-counted owner with a custom destruction function.
///
/// Every clone shares one control block and increments its count; dropping,
/// resetting, or reassigning a handle decrements it. The handle that releases
/// the last reference runs the destruction function, on its own thread.
///
/// Two handles compare equal iff they point at the same resource address.
///
/// # Examples
///
/// ```
/// use holdfast::ptr::Shared;
///
/// let first: Shared<Vec<u8>> = Shared::new(vec![1, 2, 3]);
/// let second: Shared<Vec<u8>> = first.clone();
///
/// assert_eq!(first.use_count(), 2);
/// assert_eq!(first, second);
///
/// drop(first);
///
/// assert_eq!(second.use_count(), 1);
/// assert_eq!(second.len(), 3);
/// ```
pub struct Shared<T>
where
  T: ?Sized,
{
  link: Option<Link<T>>,
}

impl<T> Shared<T>
where
  T: ?Sized,
{
  /// Creates an empty handle.
  #[inline]
  pub const fn null() -> Self {
    Self { link: None }
  }

  /// Creates a handle owning `value`.
  #[inline]
  pub fn new(value: T) -> Self
  where
    T: Sized,
  {
    Self::from_box(Box::new(value))
  }

  /// Creates a handle owning the contents of `value`.
  #[inline]
  pub fn from_box(value: Box<T>) -> Self {
    Self::from_link(Some(NonNull::from(Box::leak(value))), Deleter::boxed())
  }

  /// Creates a handle from a raw pointer with the default deleter.
  ///
  /// A null `ptr` creates an empty handle and allocates nothing.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or come from [`Box::into_raw`], and no other owner may
  /// free it.
  #[inline]
  pub unsafe fn from_raw(ptr: *mut T) -> Self {
    // SAFETY: This is guaranteed to be safe by the caller.
    unsafe { Self::from_raw_with(ptr, Deleter::boxed()) }
  }

  /// Creates a handle from a raw pointer and a custom deleter.
  ///
  /// A null `ptr` creates an empty handle; `deleter` is dropped unused.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or valid for shared reads until `deleter` runs,
  /// `deleter` must be able to destroy it, and no other owner may free it.
  #[inline]
  pub unsafe fn from_raw_with(ptr: *mut T, deleter: Deleter<T>) -> Self {
    Self::from_link(NonNull::new(ptr), deleter)
  }

  /// Creates a handle from a link whose strong count is already accounted for.
  #[inline]
  pub(crate) const fn from_counted(link: Link<T>) -> Self {
    Self { link: Some(link) }
  }

  fn from_link(ptr: Option<NonNull<T>>, deleter: Deleter<T>) -> Self {
    let link: Option<Link<T>> = ptr.map(|ptr| Link {
      ptr,
      block: ControlBlock::allocate(deleter),
    });

    Self { link }
  }

  /// Returns the stored pointer, or `None` if the handle is empty.
  #[inline]
  pub fn as_ptr(&self) -> Option<NonNull<T>> {
    self.link.map(|link| link.ptr)
  }

  /// Returns `true` if the handle is empty.
  #[inline]
  pub const fn is_null(&self) -> bool {
    self.link.is_none()
  }

  /// Returns a shared reference to the resource, if any.
  #[inline]
  pub fn get(&self) -> Option<&T> {
    // SAFETY: The resource lives while this handle holds a strong reference.
    self.link.map(|link| unsafe { link.ptr.as_ref() })
  }

  /// Returns the number of live strong handles, or `0` if empty.
  ///
  /// The value may already be stale when it is returned.
  #[inline]
  pub fn use_count(&self) -> usize {
    match self.link {
      // SAFETY: This handle holds a strong reference.
      Some(link) => unsafe { link.block() }.strong_count(),
      None => 0,
    }
  }

  /// Creates a [`Weak`] observer of this handle's resource.
  #[inline]
  pub fn downgrade(&self) -> Weak<T> {
    Weak::new(self)
  }

  #[inline]
  pub(crate) const fn link(&self) -> Option<Link<T>> {
    self.link
  }

  /// Releases this handle's reference and leaves it empty.
  #[inline]
  pub fn reset(&mut self) {
    self.release();
  }

  /// Releases this handle's reference and adopts `ptr` with `deleter`.
  ///
  /// # Safety
  ///
  /// See [`from_raw_with`][Self::from_raw_with].
  #[inline]
  pub unsafe fn reset_with(&mut self, ptr: *mut T, deleter: Deleter<T>) {
    self.release();
    // SAFETY: This is guaranteed to be safe by the caller.
    *self = unsafe { Self::from_raw_with(ptr, deleter) };
  }

  /// Releases this handle's reference and adopts `value`.
  #[inline]
  pub fn replace(&mut self, value: T)
  where
    T: Sized,
  {
    self.release();
    *self = Self::new(value);
  }

  /// Moves the reference out, leaving an empty handle behind.
  #[inline]
  pub fn take(&mut self) -> Self {
    Self {
      link: self.link.take(),
    }
  }

  /// Exchanges the references held by `self` and `other`.
  #[inline]
  pub fn swap(&mut self, other: &mut Self) {
    mem::swap(&mut self.link, &mut other.link);
  }

  /// Returns `true` if both handles share one control block.
  #[inline]
  pub fn shares_block(&self, other: &Self) -> bool {
    match (self.link, other.link) {
      (Some(this), Some(that)) => this.block == that.block,
      (None, None) => true,
      _ => false,
    }
  }

  fn release(&mut self) {
    if let Some(link) = self.link.take() {
      // SAFETY: This handle held a strong reference, now given up.
      unsafe { ControlBlock::release_strong(link.block, link.ptr) };
    }
  }
}

impl<T> Clone for Shared<T>
where
  T: ?Sized,
{
  #[inline]
  fn clone(&self) -> Self {
    if let Some(link) = self.link {
      // SAFETY: This handle holds a strong reference.
      unsafe { link.block() }.acquire_strong();
    }

    Self { link: self.link }
  }

  #[inline]
  fn clone_from(&mut self, source: &Self) {
    if self.shares_block(source) {
      return;
    }

    self.release();
    *self = source.clone();
  }
}

impl<T> Drop for Shared<T>
where
  T: ?Sized,
{
  #[inline]
  fn drop(&mut self) {
    self.release();
  }
}

// SAFETY: Any thread holding a handle may run the destruction function and
//         drop `T`, so `T: Send` is required. Handles hand out `&T` to every
//         thread, so `T: Sync` is required.
unsafe impl<T> Send for Shared<T> where T: Send + Sync + ?Sized {}

// SAFETY: See `Send`; `&Shared<T>` can be cloned into an owning handle.
unsafe impl<T> Sync for Shared<T> where T: Send + Sync + ?Sized {}

impl<T> Deref for Shared<T>
where
  T: ?Sized,
{
  type Target = T;

  #[inline]
  fn deref(&self) -> &Self::Target {
    match self.get() {
      Some(value) => value,
      None => null_deref("Shared"),
    }
  }
}

impl<T> Debug for Shared<T>
where
  T: Debug + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.get() {
      Some(value) => f.debug_tuple("Shared").field(&value).finish(),
      None => f.write_str("Shared(<null>)"),
    }
  }
}

impl<T> Pointer for Shared<T>
where
  T: ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Pointer::fmt(&addr(self.as_ptr()), f)
  }
}

impl<T> Default for Shared<T>
where
  T: ?Sized,
{
  #[inline]
  fn default() -> Self {
    Self::null()
  }
}

impl<T> Hash for Shared<T>
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

impl<T> PartialEq for Shared<T>
where
  T: ?Sized,
{
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    addr(self.as_ptr()) == addr(other.as_ptr())
  }
}

impl<T> Eq for Shared<T> where T: ?Sized {}

impl<T> From<Box<T>> for Shared<T>
where
  T: ?Sized,
{
  #[inline]
  fn from(other: Box<T>) -> Self {
    Self::from_box(other)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(all(test, not(loom)))]
mod tests {
  use std::panic;
  use std::panic::AssertUnwindSafe;
  use std::ptr::NonNull;
  use std::sync::Arc;
  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;

  use crate::ptr::Deleter;
  use crate::ptr::Shared;

  fn counted(value: u32, calls: &Arc<AtomicUsize>) -> Shared<u32> {
    let deleter: Deleter<u32> = {
      let calls: Arc<AtomicUsize> = Arc::clone(calls);

      Deleter::new(move |ptr: Option<NonNull<u32>>| {
        calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ptr) = ptr {
          // SAFETY: The resource comes from `Box::into_raw` below.
          drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        }
      })
    };

    // SAFETY: The pointer comes from `Box::into_raw`.
    unsafe { Shared::from_raw_with(Box::into_raw(Box::new(value)), deleter) }
  }

  #[test]
  fn test_null() {
    let owner: Shared<u32> = Shared::null();

    assert!(owner.is_null());
    assert_eq!(owner.use_count(), 0);
    assert!(owner.get().is_none());
  }

  #[test]
  fn test_null_raw_allocates_nothing() {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

    let deleter: Deleter<u32> = {
      let calls: Arc<AtomicUsize> = Arc::clone(&calls);
      Deleter::new(move |_ptr| {
        calls.fetch_add(1, Ordering::SeqCst);
      })
    };

    // SAFETY: Null is always accepted.
    let owner: Shared<u32> = unsafe { Shared::from_raw_with(core::ptr::null_mut(), deleter) };

    assert!(owner.is_null());
    assert_eq!(owner.use_count(), 0);

    drop(owner);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_null_deref_panics() {
    let owner: Shared<u32> = Shared::null();
    assert!(panic::catch_unwind(AssertUnwindSafe(|| *owner)).is_err());
  }

  #[test]
  fn test_clone_counts() {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let a: Shared<u32> = counted(7, &calls);
    let b: Shared<u32> = a.clone();
    let c: Shared<u32> = b.clone();
    let d: Shared<u32> = a.clone();

    assert_eq!(a.use_count(), 4);
    assert_eq!(*d, 7);

    drop(c);
    drop(a);
    drop(d);

    assert_eq!(b.use_count(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    drop(b);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_take_moves_without_count_change() {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let mut src: Shared<u32> = counted(1, &calls);
    let dst: Shared<u32> = src.take();

    assert!(src.is_null());
    assert_eq!(dst.use_count(), 1);

    drop(src);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    drop(dst);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_clone_from_releases_previous() {
    let old: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let new: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

    let mut dst: Shared<u32> = counted(1, &old);
    let src: Shared<u32> = counted(2, &new);

    dst.clone_from(&src);

    assert_eq!(old.load(Ordering::SeqCst), 1);
    assert_eq!(src.use_count(), 2);
    assert_eq!(*dst, 2);
  }

  #[test]
  fn test_clone_from_same_block_is_noop() {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let mut dst: Shared<u32> = counted(1, &calls);
    let src: Shared<u32> = dst.clone();

    dst.clone_from(&src);

    assert_eq!(src.use_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_assignment_releases_previous() {
    let calls: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let mut owner: Shared<u32> = counted(1, &calls);

    owner = Shared::new(2);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*owner, 2);
  }

  #[test]
  fn test_reset_with() {
    let old: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let mut owner: Shared<u32> = counted(1, &old);
    let other: Shared<u32> = owner.clone();

    owner.replace(5);

    assert_eq!(old.load(Ordering::SeqCst), 0);
    assert_eq!(owner.use_count(), 1);
    assert_eq!(other.use_count(), 1);
    assert_eq!(*owner, 5);

    // SAFETY: Null is always accepted.
    unsafe { owner.reset_with(core::ptr::null_mut(), Deleter::boxed()) };

    assert!(owner.is_null());

    drop(other);

    assert_eq!(old.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_eq_by_address() {
    let a: Shared<u32> = Shared::new(1);
    let b: Shared<u32> = Shared::new(1);
    let c: Shared<u32> = a.clone();

    assert_eq!(a, c);
    assert_ne!(a, b);
    assert_eq!(Shared::<u32>::null(), Shared::<u32>::null());
  }

  #[test]
  fn test_swap() {
    let mut a: Shared<u32> = Shared::new(1);
    let mut b: Shared<u32> = Shared::null();

    a.swap(&mut b);

    assert!(a.is_null());
    assert_eq!(*b, 1);
  }

  #[test]
  fn test_unsized() {
    let owner: Shared<str> = Shared::from(Box::<str>::from("hello"));
    let other: Shared<str> = owner.clone();

    assert_eq!(&*other, "hello");
    assert_eq!(owner.use_count(), 2);
  }
}
