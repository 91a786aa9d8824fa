//! Persistence core for a mailing-list subscriber registry.
//! Owns the `emails` schema and every invariant on subscriber records.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::subscriber::{Subscriber, SubscriberId, SubscriberValidationError};
pub use repo::subscriber_repo::{
    PageRequest, RepoError, RepoResult, SqliteSubscriberRepository, SubscriberRepository,
};
pub use service::subscriber_service::SubscriberService;
pub use settings::StoreSettings;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
