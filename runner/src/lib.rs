//! # Runner Client Library
//!
//! Client side of the sandboxed code-execution service used to grade code
//! questions. A grading call sends one JSON request over a plain TCP
//! connection, half-closes the write side, and reads the JSON response until
//! the service closes the connection; there is no other framing.
//!
//! ## Key Concepts
//! - **RunRequest / RunResponse**: the wire protocol messages.
//! - **RunOutcome**: the closed set of result kinds the service may report,
//!   classified into learner-caused and infrastructure-caused failures.
//! - **Notifier**: the operator-escalation port. Infrastructure failures are
//!   reported out-of-band with the full diagnostic payload, separately from
//!   the learner-facing feedback.

pub mod client;
pub mod notify;
pub mod protocol;

pub use client::{RunClient, RunError};
pub use notify::{BrokenQuestionReport, LogNotifier, MemoryNotifier, Notifier};
pub use protocol::{RunOutcome, RunRequest, RunResponse};
