pub mod auth;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{authenticate, bearer_token, Anonymous, Authenticator, Caller, Principal, StaticPrincipal};
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use types::now_rfc3339;
