//! Domain model for the subscriber registry.
//!
//! # Invariants
//! - One record per unique email address.
//! - Unsubscribing is a soft delete (`opt_out`), never a physical removal.

pub mod subscriber;
