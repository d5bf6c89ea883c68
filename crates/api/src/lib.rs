pub mod error;
pub mod models;
pub mod options;

pub use error::{ApiError, ApiResult};
pub use models::*;
pub use options::{CompilerOptions, OPT_MODULE_NAME, OPT_TYPE_ADAPTER_FACTORY};
