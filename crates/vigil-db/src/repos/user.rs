//! User repository and identity resolution.
//!
//! Resolution tries two strategies in order: the session's asserted user id,
//! then an upsert keyed by email. A stale id (e.g. after a database reset) is
//! silently reconciled by email, so email is the durable identity key.

use chrono::Utc;

use vigil_core::entities::User;
use vigil_core::identity::SessionIdentity;
use vigil_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, get_opt_string, parse_datetime};
use crate::service::VigilService;

const SELECT_COLS: &str = "id, email, name, avatar_ref, created_at, updated_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: get_opt_string(row, 2)?,
        avatar_ref: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl VigilService {
    /// Resolve a session to a stored user, creating one on first sight.
    ///
    /// Idempotent: resolving the same session twice yields the same user.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnresolvableIdentity` if the session carries
    /// neither a known user id nor an email, or `DatabaseError` if a lookup
    /// or the upsert fails.
    pub async fn resolve_user(&self, session: &SessionIdentity) -> Result<User, DatabaseError> {
        if let Some(user_id) = session.user_id() {
            match self.get_user(user_id).await {
                Ok(Some(user)) => return Ok(user),
                Ok(None) => {
                    tracing::debug!(user_id, "session user id not found, falling back to email");
                }
                Err(e) if session.email().is_some() => {
                    tracing::warn!(user_id, error = %e, "user lookup failed, falling back to email");
                }
                Err(e) => return Err(e),
            }
        }

        let Some(email) = session.email() else {
            return Err(DatabaseError::UnresolvableIdentity(
                "session carries neither a known user id nor an email".into(),
            ));
        };

        self.upsert_user_by_email(email, session.name(), session.avatar_ref())
            .await
    }

    /// Insert a user keyed by email, or refresh name/avatar on an existing one.
    ///
    /// Absent name/avatar values never overwrite stored ones.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the upsert or the read-back fails.
    pub async fn upsert_user_by_email(
        &self,
        email: &str,
        name: Option<&str>,
        avatar_ref: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let now = format_timestamp(Utc::now());
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO users (id, email, name, avatar_ref, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(email) DO UPDATE SET
                   name = COALESCE(excluded.name, users.name),
                   avatar_ref = COALESCE(excluded.avatar_ref, users.avatar_ref),
                   updated_at = excluded.updated_at",
                libsql::params![id.as_str(), email, name, avatar_ref, now.as_str()],
            )
            .await?;

        self.find_user_by_email(email)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE email = ?1"),
                [email],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}
