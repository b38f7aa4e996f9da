//! Ownership handles with custom destruction functions.
//!
//! - [`Unique`]: Single owner, move-only
//! - [`Shared`]: Atomically reference-counted owner
//! - [`Weak`]: Non-owning observer of a [`Shared`] resource
//! - [`Deleter`]: The destruction function stored by every handle
//!
//! # Lifetime Model
//!
//! Every [`Shared`] built from one allocation points at the same control
//! block. Cloning increments its strong count with relaxed ordering; dropping
//! decrements it with acquire-release ordering, and the handle that observes
//! the last decrement runs the [`Deleter`] on its own thread. A [`Weak`]
//! promotes itself with a compare-and-swap loop that only increments a
//! positive count, so a resource can never be resurrected after destruction.
//!
//! The resource itself is not synchronized: concurrent access through many
//! handles is subject to the usual `Send`/`Sync` rules of `T`.

mod control;
mod deleter;
mod shared;
mod unique;
mod weak;

pub use self::deleter::Deleter;
pub use self::shared::Shared;
pub use self::unique::Unique;
pub use self::weak::Weak;
