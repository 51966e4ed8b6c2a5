//! PostgreSQL persistence adapters built on Diesel.
//!
//! Repositories translate between Diesel rows and domain types and hold no
//! workflow rules. Row structs and table definitions stay private to this
//! module; every database failure is mapped onto the owning port's error.
//!
//! ```ignore
//! let pool = DbPool::new(PoolConfig::new(database_url)).await?;
//! run_pending_migrations(&database_url).await?;
//! let scholarships = DieselScholarshipRepository::new(pool.clone());
//! let applications = DieselApplicationRepository::new(pool);
//! ```

mod diesel_application_repository;
mod diesel_basic_error_mapping;
mod diesel_scholarship_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_application_repository::DieselApplicationRepository;
pub use diesel_scholarship_repository::DieselScholarshipRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
