pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use config::{DEFAULT_MAX_CODE_ATTEMPTS, ServiceConfig};
pub use error::ServiceError;
pub use module::Module;
pub use types::new_id;
