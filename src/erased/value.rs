//! Type-erased value container with checked extraction.
//!
//! [`Value`] stores a single value of any `Clone + Send + 'static` type. The
//! concrete type is erased at the [`Value`] boundary and recovered at runtime
//! by comparing the stored type tag with the requested one.
//!
//! # Examples
//!
//! ```
//! use holdfast::erased::Value;
//! use holdfast::error::ErrorKind;
//!
//! let value: Value = Value::new(5_i32);
//!
//! assert_eq!(value.cast::<i32>().ok(), Some(&5));
//! assert_eq!(value.cast::<String>().unwrap_err().kind(), ErrorKind::TypeMismatch);
//!
//! let text: Value = Value::new(String::from("hello"));
//! let copy: Value = text.clone();
//!
//! assert_eq!(copy.cast::<String>().unwrap(), "hello");
//! ```

use dyn_clone::DynClone;
use dyn_clone::clone_box;
use std::any::Any;
use std::any::TypeId;
use std::any::type_name;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::error::Error;
use crate::error::Result;
use crate::error::fatal;
use crate::ptr::Unique;

// -----------------------------------------------------------------------------
// Holder
// -----------------------------------------------------------------------------

/// Object-safe holder for a stored value.
///
/// Implemented for every `Clone + Send + 'static` type; cloning a holder
/// clones the held value itself.
trait Holder: Any + DynClone + Send {
  /// Returns the type tag of the held value.
  fn value_type(&self) -> TypeId;

  /// Returns the type name of the held value.
  fn value_name(&self) -> &'static str;

  fn as_any(&self) -> &dyn Any;

  fn as_mut_any(&mut self) -> &mut dyn Any;

  fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> Holder for T
where
  T: Any + Clone + Send,
{
  #[inline]
  fn value_type(&self) -> TypeId {
    TypeId::of::<T>()
  }

  #[inline]
  fn value_name(&self) -> &'static str {
    type_name::<T>()
  }

  #[inline]
  fn as_any(&self) -> &dyn Any {
    self
  }

  #[inline]
  fn as_mut_any(&mut self) -> &mut dyn Any {
    self
  }

  #[inline]
  fn into_any(self: Box<Self>) -> Box<dyn Any> {
    self
  }
}

// -----------------------------------------------------------------------------
// Value
// -----------------------------------------------------------------------------

/// A clonable container for one value of any type.
///
/// Cloning a `Value` clones the held value (not a default-constructed
/// instance of its type). Extraction with [`cast`] checks the stored type
/// tag and fails with [`TypeMismatch`] instead of returning a placeholder.
///
/// [`cast`]: Self::cast
/// [`TypeMismatch`]: crate::error::ErrorKind::TypeMismatch
pub struct Value {
  content: Unique<dyn Holder>,
}

impl Value {
  /// Creates an empty container.
  #[inline]
  pub const fn empty() -> Self {
    Self {
      content: Unique::null(),
    }
  }

  /// Creates a container holding `value`.
  #[inline]
  pub fn new<T>(value: T) -> Self
  where
    T: Any + Clone + Send,
  {
    let holder: Box<dyn Holder> = Box::new(value);

    Self {
      content: Unique::from_box(holder),
    }
  }

  /// Returns `true` if a value is held.
  #[inline]
  pub fn has_value(&self) -> bool {
    !self.content.is_null()
  }

  /// Drops the held value, if any.
  #[inline]
  pub fn reset(&mut self) {
    self.content.reset();
  }

  /// Returns the type name of the held value, if any.
  #[inline]
  pub fn type_name(&self) -> Option<&'static str> {
    self.content.get().map(Holder::value_name)
  }

  /// Returns `true` if the held value is of type `T`.
  #[inline]
  pub fn is<T>(&self) -> bool
  where
    T: 'static,
  {
    self
      .content
      .get()
      .is_some_and(|holder| holder.value_type() == TypeId::of::<T>())
  }

  /// Returns a shared reference to the held value of type `T`.
  ///
  /// # Errors
  ///
  /// Returns a [`TypeMismatch`] error if the container is empty or holds a
  /// different type.
  ///
  /// [`TypeMismatch`]: crate::error::ErrorKind::TypeMismatch
  pub fn cast<T>(&self) -> Result<&T>
  where
    T: 'static,
  {
    if !self.is::<T>() {
      return Err(self.mismatch::<T>());
    }

    self
      .content
      .get()
      .and_then(|holder| holder.as_any().downcast_ref::<T>())
      .ok_or_else(|| self.mismatch::<T>())
  }

  /// Returns a unique reference to the held value of type `T`.
  ///
  /// # Errors
  ///
  /// Returns a [`TypeMismatch`] error if the container is empty or holds a
  /// different type.
  ///
  /// [`TypeMismatch`]: crate::error::ErrorKind::TypeMismatch
  pub fn cast_mut<T>(&mut self) -> Result<&mut T>
  where
    T: 'static,
  {
    if !self.is::<T>() {
      return Err(self.mismatch::<T>());
    }

    match self.content.get_mut() {
      Some(holder) => match holder.as_mut_any().downcast_mut::<T>() {
        Some(value) => Ok(value),
        None => Err(Error::type_mismatch(type_name::<T>(), None)),
      },
      None => Err(Error::type_mismatch(type_name::<T>(), None)),
    }
  }

  /// Moves the held value of type `T` out of the container.
  ///
  /// # Errors
  ///
  /// Returns the container unchanged if it is empty or holds a different type.
  pub fn into_inner<T>(self) -> core::result::Result<T, Self>
  where
    T: 'static,
  {
    if !self.is::<T>() {
      return Err(self);
    }

    let holder: Box<dyn Holder> = match self.content.into_box() {
      Ok(holder) => holder,
      Err(content) => return Err(Self { content }),
    };

    match holder.into_any().downcast::<T>() {
      Ok(value) => Ok(*value),
      Err(_) => fatal!("value type tag disagrees with its payload"),
    }
  }

  #[cold]
  fn mismatch<T>(&self) -> Error
  where
    T: 'static,
  {
    let expected: &'static str = type_name::<T>();
    let found: Option<&'static str> = self.type_name();

    tracing::debug!(target: "holdfast", expected, found, "value type mismatch");

    Error::type_mismatch(expected, found)
  }
}

impl Clone for Value {
  #[inline]
  fn clone(&self) -> Self {
    match self.content.get() {
      Some(holder) => Self {
        content: Unique::from_box(clone_box(holder)),
      },
      None => Self::empty(),
    }
  }
}

impl Debug for Value {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.type_name() {
      Some(name) => f.debug_tuple("Value").field(&name).finish(),
      None => f.write_str("Value(<empty>)"),
    }
  }
}

impl Default for Value {
  #[inline]
  fn default() -> Self {
    Self::empty()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
