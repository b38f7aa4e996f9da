//! Error types for the type-erasure containers.
//!
//! Two failures are recoverable and surface as an [`Error`] value:
//!
//! 1. [`EmptyInvocation`]: calling a [`Function`] that holds nothing
//! 2. [`TypeMismatch`]: extracting a [`Value`] as the wrong type
//!
//! Neither is retried internally and neither is ever replaced with a default
//! value. Dereferencing an empty ownership handle is a caller bug and panics
//! instead of returning an error.
//!
//! [`EmptyInvocation`]: ErrorKind::EmptyInvocation
//! [`TypeMismatch`]: ErrorKind::TypeMismatch
//! [`Function`]: crate::erased::Function
//! [`Value`]: crate::erased::Value

mod error_kind;
mod macros;

pub use self::error_kind::ErrorKind;

pub(crate) use self::macros::fatal;
pub(crate) use self::macros::null_deref;

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// A specialized [`Result`] type for fallible container operations.
///
/// [`Result`]: core::result::Result
pub type Result<T> = core::result::Result<T, Error>;

// -----------------------------------------------------------------------------
// Error
// -----------------------------------------------------------------------------

/// A structured failure with kind, message, and backtrace.
///
/// # Display Format
///
/// Errors format as: `{label}: {message}`
///
/// Example: `badcast: expected `alloc::string::String`, found `i32``
pub struct Error {
  kind: ErrorKind,
  error: String,
  trace: Backtrace,
}

impl Error {
  /// Creates a new error with the given kind and message.
  ///
  /// Captures a backtrace at the call site; availability depends on the
  /// `RUST_BACKTRACE` environment variable.
  #[inline]
  pub fn new<T>(kind: ErrorKind, error: T) -> Self
  where
    T: Display,
  {
    Self {
      kind,
      error: error.to_string(),
      trace: Backtrace::capture(),
    }
  }

  #[inline]
  pub(crate) fn empty_invocation(signature: &'static str) -> Self {
    Self::new(
      ErrorKind::EmptyInvocation,
      format_args!("no invocable stored for `{signature}`"),
    )
  }

  #[inline]
  pub(crate) fn type_mismatch(expected: &'static str, found: Option<&'static str>) -> Self {
    match found {
      Some(found) => Self::new(
        ErrorKind::TypeMismatch,
        format_args!("expected `{expected}`, found `{found}`"),
      ),
      None => Self::new(
        ErrorKind::TypeMismatch,
        format_args!("expected `{expected}`, found nothing"),
      ),
    }
  }

  /// Returns the error category.
  #[inline]
  pub const fn kind(&self) -> ErrorKind {
    self.kind
  }

  /// Returns the human-readable error message.
  #[inline]
  pub fn error(&self) -> &str {
    self.error.as_str()
  }

  /// Returns the captured backtrace.
  #[inline]
  pub const fn trace(&self) -> &Backtrace {
    &self.trace
  }
}

impl Debug for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(self, f)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "{}: {}", self.kind.label(), self.error)
  }
}

impl StdError for Error {}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
