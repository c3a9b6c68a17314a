//! The authorized, audit-logged search pipeline.
//!
//! [`SearchOrchestrator`] debounces keystrokes, checks the
//! [`AccessGate`](roster_core::access::AccessGate) on every settled query and
//! then either looks the query up or hands it to an [`AuditReporter`].
//! Presentation layers subscribe to its [`SearchState`].

pub mod audit;
pub mod error;
pub mod orchestrator;

pub use audit::{AuditReporter, LogReporter, TelegramConfig, TelegramReporter};
pub use error::{Error, Result};
pub use orchestrator::{SearchOrchestrator, SearchPhase, SearchState};
