pub mod auth;
pub mod rbac;
pub mod security_headers;

pub use auth::{load_session, AuthenticatedUser, SessionId};
pub use rbac::*;
pub use security_headers::security_headers;
