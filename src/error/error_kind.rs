use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Category of a recoverable failure reported by the type-erasure containers.
///
/// Callers branch on this value rather than on the error message.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
  /// A [`Function`] holding no invocable was called.
  ///
  /// [`Function`]: crate::erased::Function
  EmptyInvocation,
  /// A [`Value`] was extracted as a type other than the one it holds.
  ///
  /// [`Value`]: crate::erased::Value
  TypeMismatch,
}

impl ErrorKind {
  #[inline]
  pub(crate) const fn label(&self) -> &'static str {
    match self {
      Self::EmptyInvocation => "empty",
      Self::TypeMismatch => "badcast",
    }
  }
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::EmptyInvocation => f.write_str("(Empty) called a function holding no invocable"),
      Self::TypeMismatch => f.write_str("(BadCast) the stored value has a different type"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
