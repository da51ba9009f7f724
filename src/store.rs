//! The SQL session store
//!
//! [`SqlStore`] ties together cookie authentication, the value codec and a
//! [`Database`] backend:
//!
//! - [`SqlStore::obtain`] reads the session cookie, verifies it and loads the
//!   row, falling back to a fresh session when there is nothing usable.
//! - [`SqlStore::save`] inserts, updates or deletes the row and emits the
//!   matching cookie.
//!
//! Cookie verification failures (tampered token, unknown key, stale
//! timestamp) are not errors: the request simply gets a new session.
//! Storage and codec failures always propagate.
//!
//! Concurrent saves of the same session ID are not coordinated; the last
//! update wins.

use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;

use crate::codec::{JsonCodec, ValueCodec};
use crate::config::StoreConfig;
use crate::cookie_signature::{Authenticator, SignedCookieAuthenticator};
use crate::database::Database;
use crate::error::SessionError;
use crate::id::{IdGenerator, RandomIdGenerator};
use crate::session::Session;
use crate::transport::{CookieSink, CookieSource, OutgoingCookie};

/// Session store backed by a [`Database`]
pub struct SqlStore<D: Database> {
    database: Arc<D>,
    config: StoreConfig,
    authenticator: Arc<dyn Authenticator>,
    codec: Arc<dyn ValueCodec>,
    id_generator: Arc<dyn IdGenerator>,
}

impl<D: Database> SqlStore<D> {
    /// Create a store with the HMAC cookie authenticator, the JSON codec and
    /// random identifiers
    pub fn new(database: D, config: StoreConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let authenticator = SignedCookieAuthenticator::new(config.keys.clone(), config.max_age)?;
        Ok(Self {
            database: Arc::new(database),
            config,
            authenticator: Arc::new(authenticator),
            codec: Arc::new(JsonCodec),
            id_generator: Arc::new(RandomIdGenerator),
        })
    }

    /// Replace the cookie authenticator
    pub fn with_authenticator<A: Authenticator>(mut self, authenticator: A) -> Self {
        self.authenticator = Arc::new(authenticator);
        self
    }

    /// Replace the value codec
    pub fn with_codec<C: ValueCodec>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Replace the identifier generator
    pub fn with_id_generator<G: IdGenerator>(mut self, id_generator: G) -> Self {
        self.id_generator = Arc::new(id_generator);
        self
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The database backend
    pub fn database(&self) -> &D {
        &self.database
    }

    /// A blank session with the store defaults
    pub fn new_session(&self, name: &str) -> Session {
        Session::new(name, self.config.session_options())
    }

    /// Get the session for a request.
    ///
    /// Returns a new session if the cookie is absent, fails verification or
    /// points at a missing or expired row.
    pub async fn obtain<C>(&self, cookies: &C, name: &str) -> Result<Session, SessionError>
    where
        C: CookieSource + ?Sized,
    {
        self.obtain_from_token(name, cookies.get_cookie(name)).await
    }

    /// Like [`obtain`](Self::obtain), with the raw cookie value already read
    pub async fn obtain_from_token(&self, name: &str, token: Option<String>) -> Result<Session, SessionError> {
        let mut session = self.new_session(name);

        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(session),
        };

        let id = match self.authenticator.decode(name, &token) {
            Ok(id) if !id.is_empty() => id,
            Ok(_) => return Ok(session),
            Err(e) if e.is_authentication_failure() => {
                tracing::debug!(cookie = name, error = %e, "Ignoring unverifiable session cookie");
                return Ok(session);
            }
            Err(e) => return Err(e),
        };

        session.id = id;
        if !self.hydrate(&mut session).await? {
            // The next save issues a fresh identifier
            session.id.clear();
        }
        Ok(session)
    }

    /// Load `session.id` from the database into `session`.
    ///
    /// Returns false if there is no row, or the row has expired (in which
    /// case it is deleted). Corrupt stored data is an error.
    pub async fn hydrate(&self, session: &mut Session) -> Result<bool, SessionError> {
        let row = match self.run(self.database.load(&session.id)).await? {
            Some(row) => row,
            None => return Ok(false),
        };

        if self.is_expired(row.updated_at, Utc::now()) {
            tracing::debug!(updated_at = %row.updated_at, "Deleting expired session");
            self.run(self.database.delete(&session.id)).await?;
            return Ok(false);
        }

        session.values = self.codec.decode(&row.data)?;
        session.is_new = false;
        Ok(true)
    }

    /// Persist the session and set its cookie.
    ///
    /// A session with a negative max age is deleted and its cookie cleared.
    /// Otherwise the session is inserted (new or without an ID) or updated.
    /// On error no cookie is set, except when deleting.
    pub async fn save<W>(&self, cookies: &mut W, session: &mut Session) -> Result<(), SessionError>
    where
        W: CookieSink + ?Sized,
    {
        if session.is_destroyed() {
            let result = self.run(self.database.delete(&session.id)).await;
            cookies.set_cookie(OutgoingCookie::removal(&session.name, &session.options));
            return result;
        }

        if session.id.is_empty() {
            session.id = self.id_generator.generate();
            session.is_new = true;
        }

        let data = self.codec.encode(&session.values)?;
        if session.is_new {
            self.run(self.database.insert(&session.id, &data)).await?;
        } else {
            self.run(self.database.update(&session.id, &data)).await?;
        }
        session.is_new = false;

        let token = self.authenticator.encode(&session.name, &session.id)?;
        cookies.set_cookie(OutgoingCookie::new(&session.name, token, &session.options));
        Ok(())
    }

    /// Delete every row older than the store max age
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        let cutoff = Duration::try_seconds(self.config.max_age)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self.run(self.database.delete_expired(cutoff)).await?;
        tracing::debug!(removed, "Purged expired sessions");
        Ok(removed)
    }

    fn is_expired(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match Duration::try_seconds(self.config.max_age).and_then(|age| updated_at.checked_add_signed(age)) {
            Some(expires_at) => expires_at < now,
            None => false,
        }
    }

    async fn run<T, F>(&self, operation: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        match self.config.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| SessionError::Timeout)?,
            None => operation.await,
        }
    }
}

impl<D: Database> Clone for SqlStore<D> {
    fn clone(&self) -> Self {
        Self {
            database: Arc::clone(&self.database),
            config: self.config.clone(),
            authenticator: Arc::clone(&self.authenticator),
            codec: Arc::clone(&self.codec),
            id_generator: Arc::clone(&self.id_generator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Values;
    use crate::database::{MemoryDatabase, StoredSession};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;

    const GENERATED_ID: &str = "generated-session-id";

    #[derive(Default)]
    struct Calls {
        count: usize,
        per_action: HashMap<&'static str, usize>,
        action: &'static str,
        id: String,
        data: Vec<u8>,
    }

    /// Records every call; `load` returns the last written data
    #[derive(Default)]
    struct RecordingDatabase {
        calls: Mutex<Calls>,
        updated_at: Mutex<Option<DateTime<Utc>>>,
        fail: Mutex<bool>,
        delay: Option<std::time::Duration>,
    }

    impl RecordingDatabase {
        fn with_row(data: Vec<u8>, updated_at: DateTime<Utc>) -> Self {
            let db = Self::default();
            db.calls.lock().data = data;
            *db.updated_at.lock() = Some(updated_at);
            db
        }

        fn record(&self, action: &'static str, id: &str, data: Option<&[u8]>) -> Result<(), SessionError> {
            let mut calls = self.calls.lock();
            calls.count += 1;
            *calls.per_action.entry(action).or_default() += 1;
            calls.action = action;
            calls.id = id.to_string();
            if let Some(data) = data {
                calls.data = data.to_vec();
            }
            if *self.fail.lock() {
                return Err(SessionError::Storage("connection refused".to_string()));
            }
            Ok(())
        }

        fn check_not_called(&self) {
            assert_eq!(self.calls.lock().count, 0, "database should not be called");
        }

        fn check_called(&self, count: usize, action: &str, id: &str) {
            let calls = self.calls.lock();
            assert_eq!(calls.count, count, "incorrect database calls");
            assert_eq!(calls.action, action, "invalid database action");
            assert_eq!(calls.id, id, "invalid session ID");
        }

        fn count_of(&self, action: &str) -> usize {
            self.calls.lock().per_action.get(action).copied().unwrap_or(0)
        }

        fn reset(&self) {
            let mut calls = self.calls.lock();
            calls.count = 0;
            calls.per_action.clear();
            calls.action = "";
            calls.id.clear();
        }
    }

    #[async_trait]
    impl Database for RecordingDatabase {
        async fn load(&self, id: &str) -> Result<Option<StoredSession>, SessionError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.record("select", id, None)?;
            let updated_at = *self.updated_at.lock();
            Ok(updated_at.map(|updated_at| StoredSession {
                updated_at,
                data: self.calls.lock().data.clone(),
            }))
        }

        async fn insert(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
            self.record("insert", id, Some(data))
        }

        async fn update(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
            self.record("update", id, Some(data))
        }

        async fn delete(&self, id: &str) -> Result<(), SessionError> {
            self.record("delete", id, None)
        }

        async fn delete_expired(&self, _cutoff: DateTime<Utc>) -> Result<u64, SessionError> {
            self.record("purge", "", None)?;
            Ok(0)
        }
    }

    /// Inbound and outbound cookies of one request
    #[derive(Default)]
    struct Jar {
        inbound: HashMap<String, String>,
        outbound: Vec<OutgoingCookie>,
    }

    impl Jar {
        fn with_cookie(cookie: &OutgoingCookie) -> Self {
            let mut jar = Self::default();
            jar.inbound.insert(cookie.name.clone(), cookie.value.clone());
            jar
        }
    }

    impl CookieSource for Jar {
        fn get_cookie(&self, name: &str) -> Option<String> {
            self.inbound.get(name).cloned()
        }
    }

    impl CookieSink for Jar {
        fn set_cookie(&mut self, cookie: OutgoingCookie) {
            self.outbound.push(cookie);
        }
    }

    /// Authenticator without cryptography: `plain:<name>:<value>`
    struct PlainAuthenticator;

    impl Authenticator for PlainAuthenticator {
        fn encode(&self, name: &str, value: &str) -> Result<String, SessionError> {
            Ok(format!("plain:{}:{}", name, value))
        }

        fn decode(&self, name: &str, token: &str) -> Result<String, SessionError> {
            token
                .strip_prefix("plain:")
                .and_then(|rest| rest.strip_prefix(name))
                .and_then(|rest| rest.strip_prefix(':'))
                .map(str::to_string)
                .ok_or(SessionError::InvalidSignature)
        }
    }

    fn config() -> StoreConfig {
        StoreConfig::new("testkey")
    }

    fn setup_with<D: Database>(db: D, config: StoreConfig) -> SqlStore<D> {
        SqlStore::new(db, config)
            .unwrap()
            .with_id_generator(|| GENERATED_ID.to_string())
    }

    fn setup() -> SqlStore<RecordingDatabase> {
        setup_with(RecordingDatabase::default(), config())
    }

    fn values(pairs: &[(&str, serde_json::Value)]) -> Values {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Save a new session and return its cookie and stored bytes
    async fn prepare_session(name: &str, values: Values) -> (OutgoingCookie, Vec<u8>) {
        let store = setup();
        let mut session = store.obtain(&Jar::default(), name).await.unwrap();
        session.values = values;

        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();
        store.database().check_called(1, "insert", GENERATED_ID);

        assert_eq!(jar.outbound.len(), 1, "incorrect number of cookies");
        let data = store.database().calls.lock().data.clone();
        (jar.outbound.remove(0), data)
    }

    #[tokio::test]
    async fn test_create_new_session() {
        let store = setup();

        let mut session = store.obtain(&Jar::default(), "session-name").await.unwrap();
        assert!(session.is_new());
        assert!(session.id().is_empty());
        store.database().check_not_called();

        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();
        store.database().check_called(1, "insert", GENERATED_ID);
        assert_eq!(session.id(), GENERATED_ID);
        assert!(!session.is_new());

        assert_eq!(jar.outbound.len(), 1);
        let cookie = &jar.outbound[0];
        assert_eq!(cookie.name, "session-name");
        assert!(!cookie.value.is_empty());
        assert_eq!(cookie.max_age, 86400 * 30);
        assert_eq!(cookie.path, "/");
    }

    #[tokio::test]
    async fn test_load_existing_session() {
        let values = values(&[("key", json!("value"))]);
        let (cookie, data) = prepare_session("existing-session-name", values.clone()).await;

        let store = setup_with(RecordingDatabase::with_row(data, Utc::now()), config());
        let session = store.obtain(&Jar::with_cookie(&cookie), "existing-session-name").await.unwrap();
        store.database().check_called(1, "select", GENERATED_ID);

        assert!(!session.is_new());
        assert_eq!(session.id(), GENERATED_ID);
        assert_eq!(session.values, values);
    }

    #[tokio::test]
    async fn test_second_save_updates() {
        let store = setup();
        let mut session = store.obtain(&Jar::default(), "session-name").await.unwrap();

        store.save(&mut Jar::default(), &mut session).await.unwrap();
        store.database().check_called(1, "insert", GENERATED_ID);

        session.set("views", 2).unwrap();
        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();
        store.database().check_called(2, "update", GENERATED_ID);
        assert_eq!(jar.outbound.len(), 1);
    }

    #[tokio::test]
    async fn test_update_session() {
        let store = setup();

        let mut session = store.obtain(&Jar::default(), "session-name").await.unwrap();
        session.id = "test-session-1".to_string();
        session.is_new = false;

        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();
        store.database().check_called(1, "update", "test-session-1");
        assert_eq!(jar.outbound.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_id_forces_insert() {
        let store = setup();
        let mut session = store.new_session("session-name");
        session.is_new = false;

        store.save(&mut Jar::default(), &mut session).await.unwrap();
        store.database().check_called(1, "insert", GENERATED_ID);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let store = setup();

        let mut session = store.obtain(&Jar::default(), "session-name").await.unwrap();
        session.id = "test-session-1".to_string();
        session.is_new = false;
        session.set("modified", true).unwrap();
        session.destroy();

        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();
        store.database().check_called(1, "delete", "test-session-1");

        assert_eq!(jar.outbound.len(), 1);
        assert!(jar.outbound[0].is_removal());
        assert!(jar.outbound[0].value.is_empty());
    }

    #[tokio::test]
    async fn test_delete_error_still_clears_cookie() {
        let store = setup();
        *store.database().fail.lock() = true;

        let mut session = store.new_session("session-name");
        session.id = "test-session-1".to_string();
        session.destroy();

        let mut jar = Jar::default();
        let result = store.save(&mut jar, &mut session).await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
        store.database().check_called(1, "delete", "test-session-1");
        assert!(jar.outbound[0].is_removal());
    }

    #[tokio::test]
    async fn test_expired_session_is_deleted() {
        let (cookie, data) = prepare_session("session-name", values(&[("key", json!("value"))])).await;

        let stale = Utc::now() - Duration::seconds(86400 * 30 + 60);
        let store = setup_with(RecordingDatabase::with_row(data, stale), config());
        let session = store.obtain(&Jar::with_cookie(&cookie), "session-name").await.unwrap();

        // One select followed by one delete
        store.database().check_called(2, "delete", GENERATED_ID);
        assert_eq!(store.database().count_of("select"), 1);
        assert_eq!(store.database().count_of("delete"), 1);
        assert_eq!(store.database().count_of("insert"), 0);
        assert_eq!(store.database().count_of("update"), 0);
        assert!(session.is_new());
        assert!(session.id().is_empty());
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_within_window() {
        let stored = values(&[("key", json!("value"))]);
        let data = JsonCodec.encode(&stored).unwrap();
        let store = setup_with(
            RecordingDatabase::with_row(data, Utc::now() - Duration::seconds(3000)),
            config().with_max_age(3600),
        );

        let mut session = store.new_session("session-name");
        session.id = "test-session-1".to_string();
        assert!(store.hydrate(&mut session).await.unwrap());
        store.database().check_called(1, "select", "test-session-1");
        assert!(!session.is_new());
        assert_eq!(session.values, stored);
    }

    #[tokio::test]
    async fn test_hydrate_missing_row() {
        let store = setup();
        let mut session = store.new_session("session-name");
        session.id = "missing".to_string();
        assert!(!store.hydrate(&mut session).await.unwrap());
        assert!(session.is_new());
    }

    /// Passes through to a recording database but fails every delete
    struct FailingDelete(RecordingDatabase);

    #[async_trait]
    impl Database for FailingDelete {
        async fn load(&self, id: &str) -> Result<Option<StoredSession>, SessionError> {
            self.0.load(id).await
        }

        async fn insert(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
            self.0.insert(id, data).await
        }

        async fn update(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
            self.0.update(id, data).await
        }

        async fn delete(&self, _id: &str) -> Result<(), SessionError> {
            Err(SessionError::Storage("delete failed".to_string()))
        }

        async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionError> {
            self.0.delete_expired(cutoff).await
        }
    }

    #[tokio::test]
    async fn test_expired_delete_failure_propagates() {
        let store = setup_with(
            FailingDelete(RecordingDatabase::with_row(Vec::new(), Utc::now() - Duration::days(31))),
            config(),
        );
        let mut session = store.new_session("session-name");
        session.id = "test-session-1".to_string();

        let result = store.hydrate(&mut session).await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
    }

    #[tokio::test]
    async fn test_absent_cookie_gives_new_session() {
        let store = setup();
        let session = store.obtain(&Jar::default(), "session-name").await.unwrap();
        assert!(session.is_new());
        store.database().check_not_called();
    }

    #[tokio::test]
    async fn test_tampered_cookie_gives_new_session() {
        let (mut cookie, data) = prepare_session("session-name", values(&[("key", json!("value"))])).await;
        cookie.value.insert(0, 'x');

        let store = setup_with(RecordingDatabase::with_row(data, Utc::now()), config());
        let session = store.obtain(&Jar::with_cookie(&cookie), "session-name").await.unwrap();
        assert!(session.is_new());
        assert!(session.id().is_empty());
        assert!(session.is_empty());
        store.database().check_not_called();
    }

    #[tokio::test]
    async fn test_foreign_key_cookie_gives_new_session() {
        let (cookie, data) = prepare_session("session-name", values(&[("key", json!("value"))])).await;

        let store = setup_with(RecordingDatabase::with_row(data, Utc::now()), StoreConfig::new("otherkey"));
        let session = store.obtain(&Jar::with_cookie(&cookie), "session-name").await.unwrap();
        assert!(session.is_new());
        store.database().check_not_called();
    }

    #[tokio::test]
    async fn test_rotated_key_cookie_still_loads() {
        let (cookie, data) = prepare_session("session-name", values(&[("key", json!("value"))])).await;

        let store = setup_with(
            RecordingDatabase::with_row(data, Utc::now()),
            StoreConfig::with_keys(vec!["newkey", "testkey"]),
        );
        let session = store.obtain(&Jar::with_cookie(&cookie), "session-name").await.unwrap();
        assert!(!session.is_new());
        assert_eq!(session.id(), GENERATED_ID);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_an_error() {
        let (cookie, _) = prepare_session("session-name", Values::new()).await;

        let store = setup_with(RecordingDatabase::with_row(b"not json".to_vec(), Utc::now()), config());
        let result = store.obtain(&Jar::with_cookie(&cookie), "session-name").await;
        assert!(matches!(result, Err(SessionError::Codec(_))));
    }

    #[tokio::test]
    async fn test_load_error_propagates() {
        let (cookie, data) = prepare_session("session-name", Values::new()).await;

        let store = setup_with(RecordingDatabase::with_row(data, Utc::now()), config());
        *store.database().fail.lock() = true;
        let result = store.obtain(&Jar::with_cookie(&cookie), "session-name").await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
    }

    #[tokio::test]
    async fn test_insert_error_sets_no_cookie() {
        let store = setup();
        *store.database().fail.lock() = true;

        let mut session = store.new_session("session-name");
        let mut jar = Jar::default();
        let result = store.save(&mut jar, &mut session).await;
        assert!(matches!(result, Err(SessionError::Storage(_))));
        store.database().check_called(1, "insert", GENERATED_ID);
        assert!(jar.outbound.is_empty());
        assert!(session.is_new());
    }

    #[tokio::test]
    async fn test_operation_timeout() {
        let db = RecordingDatabase {
            delay: Some(std::time::Duration::from_secs(5)),
            ..Default::default()
        };
        let store = setup_with(db, config().with_operation_timeout(std::time::Duration::from_millis(20)));

        let mut session = store.new_session("session-name");
        session.id = "slow".to_string();
        let result = store.hydrate(&mut session).await;
        assert!(matches!(result, Err(SessionError::Timeout)));
        store.database().check_not_called();
    }

    #[tokio::test]
    async fn test_injected_authenticator() {
        let store = setup().with_authenticator(PlainAuthenticator);

        let mut session = store.new_session("session-name");
        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();
        assert_eq!(jar.outbound[0].value, format!("plain:session-name:{}", GENERATED_ID));

        store.database().reset();
        let mut forged = Jar::default();
        forged.inbound.insert("session-name".to_string(), "forged".to_string());
        let session = store.obtain(&forged, "session-name").await.unwrap();
        assert!(session.is_new());
        store.database().check_not_called();
    }

    #[tokio::test]
    async fn test_purge_expired_reaches_database() {
        let store = setup();
        assert_eq!(store.purge_expired().await.unwrap(), 0);
        store.database().check_called(1, "purge", "");
    }

    #[tokio::test]
    async fn test_save_and_reload_scenario() {
        let store = SqlStore::new(MemoryDatabase::new(), config().with_max_age(86400)).unwrap();

        let mut session = store.obtain(&Jar::default(), "session").await.unwrap();
        session.set("key", "value").unwrap();
        let mut jar = Jar::default();
        store.save(&mut jar, &mut session).await.unwrap();

        assert!(!session.id().is_empty());
        assert_eq!(store.database().len(), 1);
        let row = store.database().load(session.id()).await.unwrap().unwrap();
        assert_eq!(JsonCodec.decode(&row.data).unwrap(), values(&[("key", json!("value"))]));
        assert_eq!(jar.outbound[0].max_age, 86400);

        let reloaded = store.obtain(&Jar::with_cookie(&jar.outbound[0]), "session").await.unwrap();
        assert!(!reloaded.is_new());
        assert_eq!(reloaded.id(), session.id());
        assert_eq!(reloaded.get::<String>("key"), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_silent() {
        let store = SqlStore::new(MemoryDatabase::new(), config()).unwrap();

        let mut session = store.new_session("session");
        session.id = "never-inserted".to_string();
        session.is_new = false;
        session.set("key", "lost").unwrap();

        store.save(&mut Jar::default(), &mut session).await.unwrap();
        assert!(store.database().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_last_write_wins() {
        let store = SqlStore::new(MemoryDatabase::new(), config()).unwrap();

        let mut first = store.new_session("session");
        let mut jar = Jar::default();
        store.save(&mut jar, &mut first).await.unwrap();
        let cookie = jar.outbound.remove(0);

        let mut a = store.obtain(&Jar::with_cookie(&cookie), "session").await.unwrap();
        let mut b = store.obtain(&Jar::with_cookie(&cookie), "session").await.unwrap();
        a.set("cart", "a").unwrap();
        b.set("user", "b").unwrap();
        store.save(&mut Jar::default(), &mut a).await.unwrap();
        store.save(&mut Jar::default(), &mut b).await.unwrap();

        let reloaded = store.obtain(&Jar::with_cookie(&cookie), "session").await.unwrap();
        assert_eq!(reloaded.get::<String>("user"), Some("b".to_string()));
        assert!(!reloaded.contains("cart"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let result = SqlStore::new(MemoryDatabase::new(), StoreConfig::default());
        assert!(matches!(result, Err(SessionError::Config(_))));

        let result = SqlStore::new(MemoryDatabase::new(), config().with_max_age(0));
        assert!(matches!(result, Err(SessionError::Config(_))));
    }
}
