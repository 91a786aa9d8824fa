//! Core use-case services.
//!
//! # Responsibility
//! - Turn subscribe/confirm/unsubscribe flows into repository calls.
//! - Keep callers decoupled from storage details.

pub mod subscriber_service;
