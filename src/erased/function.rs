//! Type-erased callable with a fixed signature.
//!
//! [`Function`] adapts any invocable of a fixed signature into a uniform,
//! clonable, value-semantics wrapper. Multiple arguments are passed as a
//! tuple, so `Function<(i32, i32), i32>` stores anything callable as
//! `FnMut((i32, i32)) -> i32`.
//!
//! # Cloning Behavior
//!
//! Cloning a [`Function`] performs a deep clone of the stored invocable using
//! the [`DynClone`] trait; captured state is copied, never shared.
//!
//! # Examples
//!
//! ```
//! use holdfast::erased::Function;
//!
//! let mut count: u32 = 0;
//! let mut next: Function<(), u32> = Function::new(move |()| {
//!   count += 1;
//!   count
//! });
//!
//! assert_eq!(next.call(()).unwrap(), 1);
//!
//! let mut copy: Function<(), u32> = next.clone();
//!
//! assert_eq!(next.call(()).unwrap(), 2);
//! assert_eq!(copy.call(()).unwrap(), 2);
//! ```
//!
//! [`DynClone`]: dyn_clone::DynClone

use dyn_clone::DynClone;
use dyn_clone::clone_box;
use std::any::type_name;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::marker::PhantomData;

use crate::error::Error;
use crate::error::Result;

// -----------------------------------------------------------------------------
// Callable
// -----------------------------------------------------------------------------

/// Object-safe holder for a concrete invocable.
///
/// Implemented for every `FnMut(A) -> R` that is also [`Clone`] and [`Send`].
trait Callable<A, R>: DynClone + Send {
  fn invoke(&mut self, args: A) -> R;

  fn type_name(&self) -> &'static str;
}

impl<F, A, R> Callable<A, R> for F
where
  F: FnMut(A) -> R + Clone + Send + 'static,
{
  #[inline]
  fn invoke(&mut self, args: A) -> R {
    self(args)
  }

  #[inline]
  fn type_name(&self) -> &'static str {
    type_name::<F>()
  }
}

// -----------------------------------------------------------------------------
// Function
// -----------------------------------------------------------------------------

/// A clonable, type-erased `FnMut(A) -> R`.
///
/// A `Function` holds at most one invocable. Calling an empty `Function`
/// returns an [`EmptyInvocation`] error.
///
/// [`EmptyInvocation`]: crate::error::ErrorKind::EmptyInvocation
pub struct Function<A, R> {
  inner: Option<Box<dyn Callable<A, R>>>,
  // `fn(A) -> R` keeps the wrapper `Send` regardless of `A` and `R`.
  marker: PhantomData<fn(A) -> R>,
}

impl<A, R> Function<A, R> {
  /// Creates an empty function.
  #[inline]
  pub const fn empty() -> Self {
    Self {
      inner: None,
      marker: PhantomData,
    }
  }

  /// Creates a function wrapping `callable`.
  #[inline]
  pub fn new<F>(callable: F) -> Self
  where
    F: FnMut(A) -> R + Clone + Send + 'static,
  {
    Self {
      inner: Some(Box::new(callable)),
      marker: PhantomData,
    }
  }

  /// Returns `true` if no invocable is stored.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.inner.is_none()
  }

  /// Takes the stored invocable, leaving an empty function behind.
  #[inline]
  pub fn take(&mut self) -> Self {
    Self {
      inner: self.inner.take(),
      marker: PhantomData,
    }
  }

  /// Calls the stored invocable with `args`.
  ///
  /// # Errors
  ///
  /// Returns an [`EmptyInvocation`] error if the function is empty.
  ///
  /// [`EmptyInvocation`]: crate::error::ErrorKind::EmptyInvocation
  #[inline]
  pub fn call(&mut self, args: A) -> Result<R> {
    match self.inner.as_deref_mut() {
      Some(callable) => Ok(callable.invoke(args)),
      None => {
        let signature: &'static str = type_name::<fn(A) -> R>();
        tracing::debug!(target: "holdfast", signature, "empty invocation");
        Err(Error::empty_invocation(signature))
      }
    }
  }
}

impl<A, R> Clone for Function<A, R> {
  #[inline]
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.as_deref().map(clone_box),
      marker: PhantomData,
    }
  }

  #[inline]
  fn clone_from(&mut self, source: &Self) {
    // Release the current invocable before cloning the new one.
    self.inner = None;
    self.inner = source.inner.as_deref().map(clone_box);
  }
}

impl<A, R> Debug for Function<A, R> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.inner.as_deref() {
      Some(callable) => f.debug_tuple("Function").field(&callable.type_name()).finish(),
      None => f.write_str("Function(<empty>)"),
    }
  }
}

impl<A, R> Default for Function<A, R> {
  #[inline]
  fn default() -> Self {
    Self::empty()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
