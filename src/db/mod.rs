//! Database layer
//!
//! SQLite-backed storage for the platform. The schema is managed through
//! versioned code migrations, and all data access goes through the
//! repository traits in [`repositories`].
//!
//! # Usage
//!
//! ```ignore
//! use galaxywrite::config::DatabaseConfig;
//! use galaxywrite::db::{create_pool, migrations};
//!
//! let config = DatabaseConfig::default();
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};
