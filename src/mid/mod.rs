//! Business-level middleware: request logging, error conversion, panic
//! recovery and token-based access control.

pub mod auth;
pub mod errors;
pub mod logger;
pub mod panics;

pub use auth::{authenticate, authorize};
pub use errors::errors;
pub use logger::logger;
pub use panics::panics;
