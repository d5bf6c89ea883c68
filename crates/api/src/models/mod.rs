pub mod decl;
pub mod naming;
pub mod types;

pub use decl::*;
pub use types::*;
