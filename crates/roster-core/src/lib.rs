//! Core types and trait definitions for the Roster student directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends, the search pipeline and the terminal UI all depend on it.

pub mod access;
pub mod error;
pub mod history;
pub mod identity;
pub mod storage;
pub mod store;
pub mod student;

pub use error::{Error, Result};
