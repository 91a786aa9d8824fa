//! Subscriber use-case service.
//!
//! # Responsibility
//! - Provide subscribe/confirm/unsubscribe entry points for callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Confirmation goes through upsert and always leaves `opt_out = false`.
//! - Service layer remains storage-agnostic.

use crate::model::subscriber::{Subscriber, SubscriberId};
use crate::repo::subscriber_repo::{PageRequest, RepoError, RepoResult, SubscriberRepository};
use chrono::{DateTime, Utc};

/// Use-case service wrapper for subscriber operations.
pub struct SubscriberService<R: SubscriberRepository> {
    repo: R,
}

impl<R: SubscriberRepository> SubscriberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new, unconfirmed subscriber.
    ///
    /// Duplicate emails surface as `RepoError::Duplicate`.
    pub fn subscribe(&self, email: &str) -> RepoResult<SubscriberId> {
        self.repo.create_subscriber(email)
    }

    /// Confirms `email` at the current time. See [`Self::confirm_at`].
    pub fn confirm(&self, email: &str) -> RepoResult<Subscriber> {
        self.confirm_at(email, Utc::now())
    }

    /// Records confirmation for `email` and returns the stored record.
    ///
    /// # Contract
    /// - Inserts the subscriber when absent.
    /// - Re-activates a previously opted-out subscriber.
    /// - Keeps the existing `id`.
    pub fn confirm_at(&self, email: &str, at: DateTime<Utc>) -> RepoResult<Subscriber> {
        let mut subscriber = Subscriber::new(email);
        subscriber.confirm(at);
        self.repo.upsert_subscriber(&subscriber)?;

        self.repo.get_subscriber(email)?.ok_or_else(|| {
            RepoError::InvalidData(format!("subscriber missing after confirmation: {email}"))
        })
    }

    /// Opts `email` out. Unknown emails are a silent no-op.
    pub fn unsubscribe(&self, email: &str) -> RepoResult<()> {
        self.repo.soft_delete_subscriber(email)
    }

    /// Gets one subscriber, opted out or not.
    pub fn get(&self, email: &str) -> RepoResult<Option<Subscriber>> {
        self.repo.get_subscriber(email)
    }

    /// Overwrites confirmation and opt-out state for `subscriber.email`.
    pub fn upsert(&self, subscriber: &Subscriber) -> RepoResult<()> {
        self.repo.upsert_subscriber(subscriber)
    }

    pub fn list_active(&self, page: u32, page_size: u32) -> RepoResult<Vec<Subscriber>> {
        self.repo.list_active(&PageRequest::new(page, page_size))
    }
}
