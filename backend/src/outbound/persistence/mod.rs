//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between Diesel rows and domain records.
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module. Connections come from a `bb8` pool through `diesel-async`;
//! migrations are embedded and run over a blocking connection at startup.
//!
//! # Example
//!
//! ```no_run
//! use roster::outbound::persistence::{
//!     DbPool, DieselPersonRepository, PoolConfig, apply_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://roster@localhost/roster";
//! apply_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let persons = DieselPersonRepository::new(pool);
//! # let _ = persons;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_person_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_person_repository::DieselPersonRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, apply_migrations, apply_migrations_blocking};
pub use pool::{DbPool, PoolConfig, PoolError};
