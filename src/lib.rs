//! SQLite-backed product inventory.
//!
//! # Intention
//!
//! - Load a fixed set of inventory records into a file-backed SQLite store,
//!   replacing whatever the table held before.
//! - Run parameterized lookups against that store and print the matches.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code lives in [`sqlite`].
//! - [`loader`] and [`query_runner`] never share a connection; the file is the
//!   only thing they have in common.

pub mod error;
pub mod inventory;
pub mod loader;
pub mod query_runner;
pub mod sqlite;

pub use error::{Error, Result};
pub use inventory::Product;
pub use sqlite::{SqliteConfig, Store};
