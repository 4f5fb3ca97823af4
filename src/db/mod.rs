//! SQLite persistence for appliances, energy entries, and budgets.
//!
//! - `migrations` opens the pool, sets pragmas, and applies `schema.sql`
//! - `repo` holds the `Repository` with one submodule per table

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
