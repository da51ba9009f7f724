//! Session database backends

mod memory;
mod traits;

pub use memory::MemoryDatabase;
pub use traits::{Database, StoredSession};

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
