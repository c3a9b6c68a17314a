//! Remote libSQL backend for the Roster student directory.
//!
//! Speaks the libSQL HTTP pipeline API (`POST /v2/pipeline`) with a bearer
//! token, so a hosted database can be queried without a native driver. Each
//! lookup is a single `execute` followed by `close`; no stream state (baton)
//! is kept between calls.

mod protocol;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{LibsqlConfig, LibsqlStore};

#[cfg(test)]
mod tests;
