//! Subscriber domain model.
//!
//! # Responsibility
//! - Define the single record persisted by the store.
//! - Provide lifecycle helpers for confirmation and opt-out.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another email.
//! - `confirmed_at == None` means the subscriber never confirmed.
//! - `opt_out` is the source of truth for unsubscribe state.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s\p{Cc}]+@[^@\s\p{Cc}]+$").expect("valid email shape regex")
});

/// Store-assigned surrogate key.
pub type SubscriberId = i64;

/// Placeholder id for records that have not been persisted yet.
pub const UNASSIGNED_ID: SubscriberId = 0;

/// Validation failures for subscriber records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberValidationError {
    EmptyEmail,
    InvalidEmail(String),
}

impl Display for SubscriberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "`{email}` is not a valid email address"),
        }
    }
}

impl Error for SubscriberValidationError {}

/// One email address and its subscription state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Ignored by upsert; the stored row keeps its own identity.
    pub id: SubscriberId,
    /// Case-sensitive, stored exactly as given.
    pub email: String,
    /// Second precision once persisted.
    pub confirmed_at: Option<DateTime<Utc>>,
    pub opt_out: bool,
}

impl Subscriber {
    /// Creates an unconfirmed, opted-in subscriber without a store id.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            email: email.into(),
            confirmed_at: None,
            opt_out: false,
        }
    }

    /// Records the confirmation moment, truncated to whole seconds.
    pub fn confirm(&mut self, at: DateTime<Utc>) {
        self.confirmed_at = Some(truncate_to_seconds(at));
    }

    /// Marks this subscriber as opted out.
    pub fn soft_delete(&mut self) {
        self.opt_out = true;
    }

    /// Clears the opt-out flag.
    pub fn restore(&mut self) {
        self.opt_out = false;
    }

    /// Returns whether this subscriber belongs in active listings.
    pub fn is_active(&self) -> bool {
        !self.opt_out
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    /// Validates the email shape.
    ///
    /// Only the `local@domain` form is checked; deliverability is not.
    pub fn validate(&self) -> Result<(), SubscriberValidationError> {
        validate_email(&self.email)
    }
}

/// Checks that `email` is non-blank and shaped like `local@domain`.
pub fn validate_email(email: &str) -> Result<(), SubscriberValidationError> {
    if email.trim().is_empty() {
        return Err(SubscriberValidationError::EmptyEmail);
    }
    if !EMAIL_SHAPE_RE.is_match(email) {
        return Err(SubscriberValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::{truncate_to_seconds, validate_email, SubscriberValidationError};
    use chrono::{DateTime, Timelike};

    #[test]
    fn validate_email_rejects_blank_and_malformed_values() {
        assert_eq!(validate_email("  "), Err(SubscriberValidationError::EmptyEmail));
        assert!(matches!(
            validate_email("no-at-sign.example.com"),
            Err(SubscriberValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("two@@example.com"),
            Err(SubscriberValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("space in@example.com"),
            Err(SubscriberValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn validate_email_keeps_case() {
        validate_email("Ada.Lovelace@Example.COM").unwrap();
    }

    #[test]
    fn truncate_drops_subsecond_part() {
        let at = DateTime::from_timestamp(1_700_000_000, 987_654_321).unwrap();
        let truncated = truncate_to_seconds(at);
        assert_eq!(truncated.timestamp(), 1_700_000_000);
        assert_eq!(truncated.nanosecond(), 0);
    }
}
