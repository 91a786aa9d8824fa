//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define record-oriented data access contracts for subscribers.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - "Not found" is an `Ok(None)` result, never an error.
//! - Engine failures are propagated unchanged, with no internal retry.

pub mod subscriber_repo;
