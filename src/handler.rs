//! Session middleware handler for Salvo

use async_trait::async_trait;
use salvo_core::prelude::*;

use crate::database::Database;
use crate::depot_ext::SESSION_KEY;
use crate::session::Session;
use crate::store::SqlStore;
use crate::transport::CookieSource;

/// Default session cookie name
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Session middleware for Salvo
///
/// Loads the session before the rest of the chain runs, exposes it through
/// [`SessionDepotExt`](crate::SessionDepotExt), and saves it afterwards.
pub struct SqlSessionHandler<D: Database> {
    store: SqlStore<D>,
    cookie_name: String,
    save_uninitialized: bool,
}

impl<D: Database> SqlSessionHandler<D> {
    /// Create a new session handler
    pub fn new(store: SqlStore<D>) -> Self {
        Self {
            store,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            save_uninitialized: false,
        }
    }

    /// Set the cookie name (default: "session")
    pub fn with_cookie_name<S: Into<String>>(mut self, name: S) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set whether to save new sessions that hold no values (default: false)
    pub fn with_save_uninitialized(mut self, save: bool) -> Self {
        self.save_uninitialized = save;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &SqlStore<D> {
        &self.store
    }

    fn should_save(&self, session: &Session) -> bool {
        !session.is_new() || !session.is_empty() || session.is_destroyed() || self.save_uninitialized
    }
}

#[async_trait]
impl<D: Database> Handler for SqlSessionHandler<D> {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        let token = req.get_cookie(&self.cookie_name);
        let session = match self.store.obtain_from_token(&self.cookie_name, token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session");
                res.render(StatusError::internal_server_error());
                ctrl.skip_rest();
                return;
            }
        };

        depot.insert(SESSION_KEY, session);

        ctrl.call_next(req, depot, res).await;

        let mut session = match depot.remove::<Session>(SESSION_KEY) {
            Ok(session) => session,
            Err(_) => {
                tracing::warn!("Session removed from depot before it could be saved");
                return;
            }
        };

        if !self.should_save(&session) {
            return;
        }

        if let Err(e) = self.store.save(res, &mut session).await {
            tracing::error!(error = %e, "Failed to save session");
            // Drop whatever the downstream handlers rendered
            res.take_body();
            res.render(StatusError::internal_server_error());
        }
    }
}
