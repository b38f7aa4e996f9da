use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Pointer;
use std::fmt::Result as FmtResult;
use std::hash::Hash;
use std::hash::Hasher;
use std::mem;
use std::ops::Deref;
use std::ops::DerefMut;
use std::ptr::NonNull;

use crate::error::null_deref;
use crate::ptr::Deleter;

/// A single-owner handle with a custom destruction function.
///
/// `Unique` owns at most one resource. It cannot be cloned; ownership moves
/// with the value, and [`take`][Self::take] leaves an empty handle behind.
/// The destruction function runs exactly once, when the handle is dropped or
/// reset, and it runs even if the handle is empty.
///
/// # Examples
///
/// ```
/// use holdfast::ptr::Unique;
///
/// let mut owner: Unique<String> = Unique::new(String::from("one"));
///
/// owner.replace(String::from("two"));
/// assert_eq!(owner.as_str(), "two");
///
/// let moved: Unique<String> = owner.take();
/// assert!(owner.is_null());
/// assert_eq!(moved.get().map(String::as_str), Some("two"));
/// ```
pub struct Unique<T>
where
  T: ?Sized,
{
  ptr: Option<NonNull<T>>,
  deleter: Deleter<T>,
}

impl<T> Unique<T>
where
  T: ?Sized,
{
  /// Creates an empty handle with the default deleter.
  #[inline]
  pub const fn null() -> Self {
    Self {
      ptr: None,
      deleter: Deleter::boxed(),
    }
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
    Self {
      ptr: Some(NonNull::from(Box::leak(value))),
      deleter: Deleter::boxed(),
    }
  }

  /// Creates a handle from a raw pointer with the default deleter.
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
  /// # Safety
  ///
  /// `ptr` must be null or valid for reads and writes until `deleter` runs,
  /// `deleter` must be able to destroy it, and no other owner may free it.
  #[inline]
  pub unsafe fn from_raw_with(ptr: *mut T, deleter: Deleter<T>) -> Self {
    Self {
      ptr: NonNull::new(ptr),
      deleter,
    }
  }

  /// Returns the stored pointer, or `None` if the handle is empty.
  #[inline]
  pub const fn as_ptr(&self) -> Option<NonNull<T>> {
    self.ptr
  }

  /// Returns `true` if the handle is empty.
  #[inline]
  pub const fn is_null(&self) -> bool {
    self.ptr.is_none()
  }

  /// Returns a shared reference to the resource, if any.
  #[inline]
  pub fn get(&self) -> Option<&T> {
    // SAFETY: A stored pointer is valid for as long as `self` owns it.
    self.ptr.map(|ptr| unsafe { ptr.as_ref() })
  }

  /// Returns a unique reference to the resource, if any.
  #[inline]
  pub fn get_mut(&mut self) -> Option<&mut T> {
    // SAFETY: A stored pointer is valid for as long as `self` owns it, and
    //         `&mut self` guarantees exclusive access.
    self.ptr.map(|mut ptr| unsafe { ptr.as_mut() })
  }

  /// Returns `true` if a custom destruction function is installed.
  #[inline]
  pub const fn has_custom_deleter(&self) -> bool {
    !self.deleter.is_boxed()
  }

  /// Replaces the destruction function used for the current resource.
  #[inline]
  pub fn set_deleter(&mut self, deleter: Deleter<T>) {
    self.deleter = deleter;
  }

  /// Destroys the current resource and leaves the handle empty.
  #[inline]
  pub fn reset(&mut self) {
    self.adopt(None, Deleter::boxed());
  }

  /// Destroys the current resource and adopts `ptr` with `deleter`.
  ///
  /// The current destruction function is invoked even if the handle is empty.
  ///
  /// # Safety
  ///
  /// See [`from_raw_with`][Self::from_raw_with].
  #[inline]
  pub unsafe fn reset_with(&mut self, ptr: *mut T, deleter: Deleter<T>) {
    self.adopt(NonNull::new(ptr), deleter);
  }

  /// Destroys the current resource and adopts `value`.
  #[inline]
  pub fn replace(&mut self, value: T)
  where
    T: Sized,
  {
    let ptr: *mut T = Box::into_raw(Box::new(value));

    // SAFETY: `ptr` comes from `Box::into_raw`.
    unsafe { self.reset_with(ptr, Deleter::boxed()) }
  }

  /// Moves the resource and deleter out, leaving an empty handle behind.
  #[inline]
  pub fn take(&mut self) -> Self {
    mem::replace(self, Self::null())
  }

  /// Exchanges the resource and deleter of `self` and `other`.
  #[inline]
  pub fn swap(&mut self, other: &mut Self) {
    mem::swap(&mut self.ptr, &mut other.ptr);
    mem::swap(&mut self.deleter, &mut other.deleter);
  }

  /// Converts the handle back into a [`Box`].
  ///
  /// # Errors
  ///
  /// Returns the handle unchanged if it is empty or has a custom deleter.
  pub fn into_box(mut self) -> Result<Box<T>, Self> {
    if !self.deleter.is_boxed() {
      return Err(self);
    }

    match self.ptr.take() {
      // SAFETY: A non-null pointer under the default deleter came from a box.
      Some(ptr) => Ok(unsafe { Box::from_raw(ptr.as_ptr()) }),
      None => Err(self),
    }
  }

  fn adopt(&mut self, ptr: Option<NonNull<T>>, deleter: Deleter<T>) {
    let prev: Option<NonNull<T>> = mem::replace(&mut self.ptr, ptr);
    let mut old: Deleter<T> = mem::replace(&mut self.deleter, deleter);

    // SAFETY: `prev` was owned by `self` and is no longer reachable.
    unsafe { old.delete(prev) };
  }
}

impl<T> Drop for Unique<T>
where
  T: ?Sized,
{
  fn drop(&mut self) {
    // SAFETY: `self.ptr` is owned by `self` and never used again.
    unsafe { self.deleter.delete(self.ptr.take()) }
  }
}

// SAFETY: `Unique<T>` owns its resource like a `Box<T>`, and `Deleter<T>`
//         is always `Send`.
unsafe impl<T> Send for Unique<T> where T: Send + ?Sized {}

// SAFETY: Shared access only hands out `&T`; the deleter is never borrowed
//         through `&self`.
unsafe impl<T> Sync for Unique<T> where T: Sync + ?Sized {}

impl<T> Deref for Unique<T>
where
  T: ?Sized,
{
  type Target = T;

  #[inline]
  fn deref(&self) -> &Self::Target {
    match self.get() {
      Some(value) => value,
      None => null_deref("Unique"),
    }
  }
}

impl<T> DerefMut for Unique<T>
where
  T: ?Sized,
{
  #[inline]
  fn deref_mut(&mut self) -> &mut Self::Target {
    match self.get_mut() {
      Some(value) => value,
      None => null_deref("Unique"),
    }
  }
}

impl<T> Debug for Unique<T>
where
  T: Debug + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.get() {
      Some(value) => f.debug_tuple("Unique").field(&value).finish(),
      None => f.write_str("Unique(<null>)"),
    }
  }
}

impl<T> Pointer for Unique<T>
where
  T: ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Pointer::fmt(&addr(self.ptr), f)
  }
}

impl<T> Default for Unique<T>
where
  T: ?Sized,
{
  #[inline]
  fn default() -> Self {
    Self::null()
  }
}

impl<T> Hash for Unique<T>
where
  T: ?Sized,
{
  #[inline]
  fn hash<H>(&self, state: &mut H)
  where
    H: Hasher,
  {
    addr(self.ptr).hash(state);
  }
}

impl<T> PartialEq for Unique<T>
where
  T: ?Sized,
{
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    addr(self.ptr) == addr(other.ptr)
  }
}

impl<T> Eq for Unique<T> where T: ?Sized {}

impl<T> From<Box<T>> for Unique<T>
where
  T: ?Sized,
{
  #[inline]
  fn from(other: Box<T>) -> Self {
    Self::from_box(other)
  }
}

/// Returns the address of `ptr` with metadata stripped, or null.
#[inline]
pub(crate) fn addr<T>(ptr: Option<NonNull<T>>) -> *const ()
where
  T: ?Sized,
{
  match ptr {
    Some(ptr) => ptr.as_ptr().cast::<()>().cast_const(),
    None => core::ptr::null(),
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
