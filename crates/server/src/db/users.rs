//! User repository.
//!
//! Users are created by the seeding tooling; the API only reads them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use foodbridge_core::{Email, User, UserId, UserRole};

use super::{RepositoryError, parse_column};

pub(super) const USER_COLUMNS: &str = "id, name, email, phone, role, verified, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
    verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            role: parse_column::<UserRole>(&row.role, "user role")?,
            verified: row.verified,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a user, returning the existing row when the email is taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self, email), fields(email = %email.masked()))]
    pub async fn upsert(
        &self,
        name: &str,
        email: &Email,
        phone: Option<&str>,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, phone, role, verified)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(role.as_str())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }
}
