//! Application layer: the service owning the tree and the request router
//!
//! This layer orchestrates domain logic; it performs no I/O of its own.

pub mod error;
pub mod routes;
pub mod service;

pub use error::{ApplicationError, ApplicationResult};
pub use routes::{dispatch, Method, Request, Response};
pub use service::TreeService;
