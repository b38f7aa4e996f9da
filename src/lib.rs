//! Holdfast - Ownership primitives and type-erasure containers for Rust.
//!
//! Holdfast provides resource handles whose destruction logic is chosen at
//! construction time, a thread-safe reference-counted owner with a
//! non-owning observer, and two clonable type-erasure containers.
//!
//! # Quick Start
//!
//! ```
//! use holdfast::ptr::Shared;
//! use holdfast::ptr::Weak;
//!
//! let owner: Shared<String> = Shared::new(String::from("resource"));
//! let other: Shared<String> = owner.clone();
//! let weak: Weak<String> = owner.downgrade();
//!
//! assert_eq!(owner.use_count(), 2);
//!
//! drop(owner);
//! drop(other);
//!
//! assert!(weak.expired());
//! assert!(weak.lock().is_null());
//! ```
//!
//! # Core Modules
//!
//! - [`ptr`]: Exclusive, shared, and weak ownership handles
//! - [`erased`]: Type-erased callable and value containers
//! - [`num`]: Atomic reference counter
//! - [`error`]: Error types
//! - [`diag`]: Tracing subscriber setup
//! - [`consts`]: Crate-wide constants

mod loom;

pub mod consts;
pub mod diag;
pub mod erased;
pub mod error;
pub mod num;
pub mod ptr;
