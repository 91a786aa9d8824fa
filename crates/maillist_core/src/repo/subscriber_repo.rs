//! Subscriber repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/upsert/soft-delete/paginate over the `emails` table.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the email before any SQL mutation.
//! - Upsert resolves conflicts on `email` and never touches `id`.
//! - Read paths reject undecodable columns instead of masking them.

use crate::db::DbError;
use crate::logging::mask_email;
use crate::model::subscriber::{validate_email, Subscriber, SubscriberId, SubscriberValidationError};
use chrono::DateTime;
use log::{debug, warn};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SUBSCRIBER_SELECT_SQL: &str = "SELECT
    id,
    email,
    confirmed_at,
    opt_out
FROM emails";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error type for subscriber persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(SubscriberValidationError),
    Db(DbError),
    /// The email is already registered.
    Duplicate(String),
    /// Pages are 1-based.
    InvalidPage { page: u32 },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Duplicate(email) => write!(f, "subscriber already exists: {email}"),
            Self::InvalidPage { page } => write!(f, "page must be >= 1, got {page}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted subscriber data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Duplicate(_) | Self::InvalidPage { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<SubscriberValidationError> for RepoError {
    fn from(value: SubscriberValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Offset pagination over active subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Not capped by the store; `0` yields an empty page.
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)).saturating_mul(i64::from(self.page_size))
    }
}

/// Repository interface for subscriber records.
pub trait SubscriberRepository {
    fn create_subscriber(&self, email: &str) -> RepoResult<SubscriberId>;
    fn get_subscriber(&self, email: &str) -> RepoResult<Option<Subscriber>>;
    fn upsert_subscriber(&self, subscriber: &Subscriber) -> RepoResult<()>;
    fn soft_delete_subscriber(&self, email: &str) -> RepoResult<()>;
    fn list_active(&self, page: &PageRequest) -> RepoResult<Vec<Subscriber>>;
}

/// SQLite-backed subscriber repository.
///
/// Holds no state besides the borrowed connection; every call is a single
/// parameterized statement.
pub struct SqliteSubscriberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubscriberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SubscriberRepository for SqliteSubscriberRepository<'_> {
    /// Inserts an unconfirmed, opted-in subscriber and returns its new id.
    ///
    /// Fails with `RepoError::Duplicate` when the email is already stored.
    fn create_subscriber(&self, email: &str) -> RepoResult<SubscriberId> {
        validate_email(email)?;

        let inserted = self.conn.execute(
            "INSERT INTO emails (email, confirmed_at, opt_out)
             VALUES (?1, NULL, 0);",
            [email],
        );

        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(
                    "event=subscriber_create module=repo status=ok id={id} email={}",
                    mask_email(email)
                );
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    "event=subscriber_create module=repo status=error error_code=duplicate_email email={}",
                    mask_email(email)
                );
                Err(RepoError::Duplicate(email.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Looks up by exact email; `Ok(None)` when nothing matches.
    fn get_subscriber(&self, email: &str) -> RepoResult<Option<Subscriber>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBSCRIBER_SELECT_SQL} WHERE email = ?1;"))?;

        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subscriber_row(row)?));
        }

        Ok(None)
    }

    /// Inserts `subscriber`, or updates `confirmed_at`/`opt_out` of the
    /// existing row with the same email.
    fn upsert_subscriber(&self, subscriber: &Subscriber) -> RepoResult<()> {
        subscriber.validate()?;

        self.conn.execute(
            "INSERT INTO emails (email, confirmed_at, opt_out)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO UPDATE SET
                confirmed_at = excluded.confirmed_at,
                opt_out = excluded.opt_out;",
            params![
                subscriber.email.as_str(),
                subscriber.confirmed_at.map(|at| at.timestamp()),
                bool_to_int(subscriber.opt_out),
            ],
        )?;

        debug!(
            "event=subscriber_upsert module=repo status=ok email={} confirmed={} opt_out={}",
            mask_email(&subscriber.email),
            subscriber.is_confirmed(),
            subscriber.opt_out
        );
        Ok(())
    }

    /// Sets `opt_out` for the email. Matching zero rows still succeeds.
    fn soft_delete_subscriber(&self, email: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE emails
             SET opt_out = 1
             WHERE email = ?1;",
            [email],
        )?;

        debug!(
            "event=subscriber_soft_delete module=repo status=ok email={} matched={changed}",
            mask_email(email)
        );
        Ok(())
    }

    /// Lists non-opted-out subscribers in ascending id order.
    fn list_active(&self, page: &PageRequest) -> RepoResult<Vec<Subscriber>> {
        if page.page == 0 {
            return Err(RepoError::InvalidPage { page: page.page });
        }

        let mut stmt = self.conn.prepare(&format!(
            "{SUBSCRIBER_SELECT_SQL}
             WHERE opt_out = 0
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;

        let mut rows = stmt.query(params![i64::from(page.page_size), page.offset()])?;
        let mut subscribers = Vec::new();

        while let Some(row) = rows.next()? {
            subscribers.push(parse_subscriber_row(row)?);
        }

        Ok(subscribers)
    }
}

/// Decodes one `emails` row; shared by every read path.
fn parse_subscriber_row(row: &Row<'_>) -> RepoResult<Subscriber> {
    let confirmed_at = match row.get::<_, Option<i64>>("confirmed_at")? {
        None => None,
        Some(seconds) => Some(DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{seconds}` in emails.confirmed_at"
            ))
        })?),
    };

    let opt_out = match row.get::<_, i64>("opt_out")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid opt_out value `{other}` in emails.opt_out"
            )));
        }
    };

    // Email shape is only enforced on writes; rows from older writers must
    // stay readable by direct lookup.
    Ok(Subscriber {
        id: row.get("id")?,
        email: row.get("email")?,
        confirmed_at,
        opt_out,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::PageRequest;

    #[test]
    fn offset_is_zero_for_first_page() {
        assert_eq!(PageRequest::new(1, 25).offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        assert_eq!(PageRequest::new(u32::MAX, u32::MAX).offset(), i64::MAX);
        assert_eq!(PageRequest::new(0, 10).offset(), 0);
    }
}
