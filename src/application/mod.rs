// Application layer - the service every client (CLI, tests) talks to.

pub mod config;
pub mod error;
pub mod reporting;
pub mod service;

pub use config::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
