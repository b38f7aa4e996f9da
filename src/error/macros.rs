//! Internal error handling macros.
//!
//! - [`fatal!`]: For unrecoverable invariant violations (counter overflow)
//! - [`null_deref`]: For dereferencing an empty ownership handle

/// Displays a system error message and aborts the program.
///
/// Use this for states that can only be reached by breaking an internal
/// invariant. The program prints a diagnostic message and immediately aborts
/// without unwinding, so no destructor can observe the broken state.
///
/// # Examples
///
/// ```ignore
/// if count > MAX_REFCOUNT {
///   fatal!("reference count overflow");
/// }
/// ```
macro_rules! fatal {
  ($error:expr) => {{
    ::std::eprintln!(
      "{}:{}: (SysInv) a system invariant has been broken: {}",
      ::std::file!(),
      ::std::line!(),
      $error,
    );

    ::std::process::abort();
  }};
}

pub(crate) use fatal;

/// Panics because an empty ownership handle was dereferenced.
///
/// Dereferencing an empty handle is a caller precondition violation and not a
/// recoverable error; callers are expected to check `is_null()` or use the
/// `get()` accessors first.
#[cold]
#[track_caller]
pub(crate) fn null_deref(handle: &'static str) -> ! {
  ::std::panic!("(BadArg) dereferenced an empty `{handle}`")
}
