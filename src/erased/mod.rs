//! Type-erasure containers.
//!
//! - [`Function`]: A clonable invocable of a fixed signature
//! - [`Value`]: A clonable container for one value of any type
//!
//! Both containers own their contents exclusively; cloning either one copies
//! the stored invocable or value.

mod function;
mod value;

pub use self::function::Function;
pub use self::value::Value;
