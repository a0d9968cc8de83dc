//! # Sales API
//!
//! A REST service for users and products on top of the `sales-web`
//! framework.
//!
//! ```text
//! src/
//! ├── mid/          # logger, errors, panics, authenticate/authorize
//! ├── modules/      # feature modules
//! │   ├── check/    # readiness and liveness
//! │   ├── users/    # user management and token issuance
//! │   └── products/ # product catalogue with ownership
//! ├── logging.rs    # tracing subscriber setup
//! ├── router.rs     # route table and serving router
//! └── state.rs      # shared dependencies
//! ```
//!
//! Each feature module has a `model`, a `service` holding its SQL, a
//! `controller` with the handlers, and a `router` that registers them.

pub mod logging;
pub mod mid;
pub mod modules;
pub mod router;
pub mod state;
