//! Service layer over `VigilDb`.
//!
//! `VigilService` wraps the raw database handle and carries the settings the
//! repos need. All repo methods are implemented as `impl VigilService` blocks
//! in [`crate::repos`].

use crate::VigilDb;
use crate::error::DatabaseError;

/// Default page size for job listings.
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Entry point for every store operation.
///
/// Every write is a single-row statement and relies on the store's per-row
/// atomicity. The service takes no locks of its own.
#[derive(Debug)]
pub struct VigilService {
    db: VigilDb,
    list_limit: u32,
}

impl VigilService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = VigilDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `VigilDb`.
    #[must_use]
    pub const fn from_db(db: VigilDb) -> Self {
        Self {
            db,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Override the listing page size. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit.max(1);
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &VigilDb {
        &self.db
    }

    /// Page size applied to job listings.
    #[must_use]
    pub const fn list_limit(&self) -> u32 {
        self.list_limit
    }
}
