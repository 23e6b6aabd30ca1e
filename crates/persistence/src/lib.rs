//! # Chama Persistence
//!
//! Persistence layer for the savings group ledger, backed by SQLite.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chama_persistence::{Database, MemberRepo};
//!
//! // Initialize database
//! let db = Database::init_with_migrations("sqlite:data/chama.db").await?;
//!
//! // Query via repos
//! let members = MemberRepo::get_all(db.pool()).await?;
//! ```
//!
//! Amounts are stored as integer cents so that sums and same-day merges
//! happen exactly inside SQL.

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{convert_all, ContributionRow, LoanRow, MemberRow, RepaymentRow};
pub use sqlite::{
    in_memory_database, init_database, ContributionRepo, LoanRepo, MemberRepo, RepaymentRepo,
};

use sqlx::SqlitePool;

/// Database facade
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open an existing database
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g., "sqlite:data/chama.db")
    pub async fn new(db_url: &str) -> PersistenceResult<Self> {
        let pool = sqlite::create_pool(db_url).await?;
        Ok(Self { pool })
    }

    /// Create the database if missing and apply migrations
    pub async fn init_with_migrations(db_url: &str) -> PersistenceResult<Self> {
        let pool = init_database(db_url).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests
    pub async fn in_memory() -> PersistenceResult<Self> {
        let pool = in_memory_database().await?;
        Ok(Self { pool })
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_file_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chama.db");
        let url = format!("sqlite:{}", path.display());

        let db = Database::init_with_migrations(&url).await.unwrap();
        assert!(path.exists());
        assert_eq!(MemberRepo::count(db.pool()).await.unwrap(), 0);
        db.close().await;

        // reopening keeps the schema
        let db = Database::new(&url).await.unwrap();
        assert_eq!(LoanRepo::count(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_is_isolated() {
        let a = Database::in_memory().await.unwrap();
        let b = Database::in_memory().await.unwrap();
        assert_eq!(ContributionRepo::count(a.pool()).await.unwrap(), 0);
        assert_eq!(ContributionRepo::count(b.pool()).await.unwrap(), 0);
    }
}
