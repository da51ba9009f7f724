//! # salvo-sql-session
//!
//! Server-side session store for the Salvo web framework, backed by a SQL
//! database.
//!
//! Session values live in a `sessions` table; the client only holds a signed
//! cookie carrying the session ID. Rows expire `max_age` seconds after their
//! last update.
//!
//! ## Features
//!
//! - **Signed cookies**: HMAC-SHA256 tokens bound to the cookie name and
//!   signing time, with key rotation
//! - **Pluggable backends**: SQLite (default), PostgreSQL, in-memory, or
//!   anything implementing [`Database`]
//! - **Replaceable parts**: cookie authenticator, value codec and identifier
//!   generator can all be swapped
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salvo::prelude::*;
//! use salvo_sql_session::{SessionDepotExt, SqlSessionHandler, SqlStore, SqliteDatabase, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let db = SqliteDatabase::connect("sqlite://sessions.db").await.unwrap();
//!     let store = SqlStore::new(db, StoreConfig::new("your-secret-key").with_max_age(86400)).unwrap();
//!
//!     let router = Router::new()
//!         .hoop(SqlSessionHandler::new(store))
//!         .get(index);
//!
//!     Server::new(TcpListener::new("127.0.0.1:5800").bind().await)
//!         .serve(router)
//!         .await;
//! }
//!
//! #[handler]
//! async fn index(depot: &mut Depot) -> String {
//!     let session = depot.session_mut().unwrap();
//!     let views: i32 = session.get("views").unwrap_or(0) + 1;
//!     session.set("views", views).unwrap();
//!     format!("views: {}", views)
//! }
//! ```

pub mod codec;
pub mod config;
pub mod cookie_signature;
pub mod database;
pub mod error;
pub mod handler;
pub mod id;
pub mod session;
pub mod store;
pub mod transport;

pub use codec::{JsonCodec, ValueCodec, Values};
pub use config::{SameSite, StoreConfig};
pub use cookie_signature::{Authenticator, SignedCookieAuthenticator};
pub use database::{Database, MemoryDatabase, StoredSession};
pub use error::SessionError;
pub use handler::SqlSessionHandler;
pub use id::{IdGenerator, RandomIdGenerator};
pub use session::{Session, SessionOptions};
pub use store::SqlStore;
pub use transport::{CookieSink, CookieSource, OutgoingCookie};

#[cfg(feature = "sqlite")]
pub use database::SqliteDatabase;

#[cfg(feature = "postgres")]
pub use database::PostgresDatabase;

/// Extension trait for Depot to easily access session
pub mod depot_ext;
pub use depot_ext::SessionDepotExt;
