//! Concrete storage backends.
//!
//! `local` keeps every row in process memory behind a `parking_lot::RwLock`
//! and backs the default feature set. `postgres` persists through Diesel and
//! only compiles with the `postgres-repo` feature.

pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PoolStats, PostgresConfig, PostgresRepository};
