//! Diagnostic output for the crate's `tracing` events.
//!
//! Every event is emitted under the `holdfast` target. The crate never
//! installs a subscriber on its own; applications either bring their own or
//! call [`init_tracing`] with the `tracing` feature enabled.
//!
//! # Examples
//!
//! ```
//! use holdfast::diag;
//! use holdfast::diag::DiagConfig;
//!
//! let mut config: DiagConfig = DiagConfig::new();
//!
//! config.very_verbose = true;
//!
//! assert_eq!(config.tracing_filter(), tracing::Level::TRACE);
//!
//! let _ = diag::init_tracing(&config);
//! ```

use std::error::Error as StdError;

use crate::consts;

/// Error returned when a global subscriber cannot be installed.
pub type InitError = Box<dyn StdError + Send + Sync + 'static>;

// -----------------------------------------------------------------------------
// Diag Config
// -----------------------------------------------------------------------------

/// Formatting options for the subscriber installed by [`init_tracing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiagConfig {
  pub source_file: bool,
  pub source_line: bool,
  pub source_name: bool,
  pub thread_info: bool,
  pub verbose: bool,
  pub very_verbose: bool,
}

impl DiagConfig {
  #[inline]
  pub const fn new() -> Self {
    Self {
      source_file: consts::DIAG_SOURCE_FILE,
      source_line: consts::DIAG_SOURCE_LINE,
      source_name: consts::DIAG_SOURCE_NAME,
      thread_info: consts::DIAG_THREAD_INFO,
      verbose: false,
      very_verbose: false,
    }
  }

  /// Returns the most verbose level the subscriber will record.
  #[inline]
  pub const fn tracing_filter(&self) -> tracing::Level {
    if self.very_verbose {
      tracing::Level::TRACE
    } else if self.verbose {
      tracing::Level::DEBUG
    } else {
      tracing::Level::INFO
    }
  }
}

impl Default for DiagConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Subscriber
// -----------------------------------------------------------------------------

/// Installs a compact global `fmt` subscriber built from `config`.
///
/// Without the `tracing` feature this does nothing.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(config: &DiagConfig) -> Result<(), InitError> {
  use tracing_subscriber::FmtSubscriber;
  use tracing_subscriber::fmt::format;
  use tracing_subscriber::util::SubscriberInitExt;

  FmtSubscriber::builder()
    .event_format(format().compact())
    .log_internal_errors(true)
    .with_ansi(true)
    .with_file(config.source_file)
    .with_level(true)
    .with_line_number(config.source_line)
    .with_max_level(config.tracing_filter())
    .with_target(config.source_name)
    .with_thread_ids(config.thread_info)
    .with_thread_names(config.thread_info)
    .finish()
    .try_init()
    .map_err(Into::into)
}

/// Installs a compact global `fmt` subscriber built from `config`.
///
/// Without the `tracing` feature this does nothing.
///
/// # Errors
///
/// Never fails without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn init_tracing(_config: &DiagConfig) -> Result<(), InitError> {
  Ok(())
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
