//! Atomic numeric types with safety invariants.
//!
//! - [`AtomicRefCount`]: Atomic reference counter that never resurrects from zero

mod ref_count;

pub use self::ref_count::AtomicRefCount;
