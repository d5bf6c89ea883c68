//! Support library linked by generated builders, readers and dispatchers.
//!
//! Nothing in here performs I/O. The [`Locator`] value type stands in for
//! the platform URI surface; parsing is deliberately lenient and
//! validation-free.

pub mod adapter;
pub mod convert;
pub mod error;
pub mod locator;
pub mod matcher;

pub use adapter::{AdapterCache, TypeAdapter};
pub use error::RuntimeError;
pub use locator::{Locator, LocatorBuilder};
pub use matcher::{LocatorDispatcher, MatchRule, NO_MATCH};
