// -----------------------------------------------------------------------------
// Reference Counting
// -----------------------------------------------------------------------------

/// Maximum number of strong or weak references to a single control block.
///
/// Going past this limit is treated as a broken invariant and aborts the
/// process; the counter cannot wrap before the abort is observed.
pub const MAX_REFCOUNT: usize = isize::MAX as usize;

// -----------------------------------------------------------------------------
// Diagnostics
// -----------------------------------------------------------------------------

/// Whether [`DiagConfig`] reports source file paths by default.
///
/// [`DiagConfig`]: crate::diag::DiagConfig
pub const DIAG_SOURCE_FILE: bool = false;

/// Whether [`DiagConfig`] reports source line numbers by default.
///
/// [`DiagConfig`]: crate::diag::DiagConfig
pub const DIAG_SOURCE_LINE: bool = false;

/// Whether [`DiagConfig`] reports event targets by default.
///
/// [`DiagConfig`]: crate::diag::DiagConfig
pub const DIAG_SOURCE_NAME: bool = true;

/// Whether [`DiagConfig`] reports thread ids and names by default.
///
/// [`DiagConfig`]: crate::diag::DiagConfig
pub const DIAG_THREAD_INFO: bool = true;
