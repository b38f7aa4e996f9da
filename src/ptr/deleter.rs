use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ptr::NonNull;

use crate::erased::Function;
use crate::error::fatal;

/// The destruction function of an ownership handle.
///
/// A deleter receives the (possibly null) resource pointer exactly once.
/// [`Deleter::boxed`] is the default: it frees a pointer obtained from
/// [`Box::into_raw`] and does nothing on null. Custom deleters are stored in a
/// [`Function`] and decide for themselves what to do with a null pointer.
///
/// # Examples
///
/// ```
/// use std::ptr::NonNull;
/// use holdfast::ptr::Deleter;
/// use holdfast::ptr::Unique;
///
/// let deleter: Deleter<u32> = Deleter::new(|ptr: Option<NonNull<u32>>| {
///   if let Some(ptr) = ptr {
///     // SAFETY: The pointer was produced by `Box::into_raw` below.
///     drop(unsafe { Box::from_raw(ptr.as_ptr()) });
///   }
/// });
///
/// let raw: *mut u32 = Box::into_raw(Box::new(7));
///
/// // SAFETY: `raw` is a unique pointer the deleter knows how to free.
/// let owner: Unique<u32> = unsafe { Unique::from_raw_with(raw, deleter) };
///
/// assert_eq!(*owner, 7);
/// ```
pub struct Deleter<T>
where
  T: ?Sized,
{
  kind: DeleterKind<T>,
}

enum DeleterKind<T>
where
  T: ?Sized,
{
  Boxed,
  Custom(Function<Option<NonNull<T>>, ()>),
}

impl<T> Deleter<T>
where
  T: ?Sized,
{
  /// Returns the default deleter, which frees a [`Box`] allocation.
  #[inline]
  pub const fn boxed() -> Self {
    Self {
      kind: DeleterKind::Boxed,
    }
  }

  /// Returns a deleter that calls `delete` with the resource pointer.
  #[inline]
  pub fn new<F>(delete: F) -> Self
  where
    F: FnMut(Option<NonNull<T>>) + Clone + Send + 'static,
  {
    Self {
      kind: DeleterKind::Custom(Function::new(delete)),
    }
  }

  /// Returns `true` if this is the default [`Box`] deleter.
  #[inline]
  pub const fn is_boxed(&self) -> bool {
    matches!(self.kind, DeleterKind::Boxed)
  }

  /// Runs the destruction function on `ptr`.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a resource this deleter is able to destroy, and it
  /// must not be used again afterwards.
  pub(crate) unsafe fn delete(&mut self, ptr: Option<NonNull<T>>) {
    match &mut self.kind {
      DeleterKind::Boxed => {
        if let Some(ptr) = ptr {
          // SAFETY: Boxed deleters are only paired with `Box` allocations.
          drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        }
      }
      DeleterKind::Custom(function) => {
        if function.call(ptr).is_err() {
          fatal!("custom deleter holds no invocable");
        }
      }
    }
  }
}

impl<T> Clone for Deleter<T>
where
  T: ?Sized,
{
  #[inline]
  fn clone(&self) -> Self {
    let kind: DeleterKind<T> = match &self.kind {
      DeleterKind::Boxed => DeleterKind::Boxed,
      DeleterKind::Custom(function) => DeleterKind::Custom(function.clone()),
    };

    Self { kind }
  }
}

impl<T> Debug for Deleter<T>
where
  T: ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match &self.kind {
      DeleterKind::Boxed => f.write_str("Deleter(Box)"),
      DeleterKind::Custom(function) => f.debug_tuple("Deleter").field(function).finish(),
    }
  }
}

impl<T> Default for Deleter<T>
where
  T: ?Sized,
{
  #[inline]
  fn default() -> Self {
    Self::boxed()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
