use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockWriteGuard;

use async_trait::async_trait;

use crate::domain::identity::codec::IdentityCodec;
use crate::domain::identity::models::Identity;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::Credentials;
use crate::domain::session::models::Registration;
use crate::domain::session::observers::Observers;
use crate::domain::session::observers::Subscription;
use crate::domain::session::ports::AuthApi;
use crate::domain::session::ports::SessionPort;
use crate::domain::token::models::TokenPair;
use crate::domain::token::ports::TokenStore;

/// Owns the client's session: token persistence, the published identity and
/// its observers.
///
/// Each operation publishes atomically on completion. When login and refresh
/// overlap, whichever finishes last wins.
pub struct SessionManager<TS, API>
where
    TS: TokenStore,
    API: AuthApi,
{
    store: Arc<TS>,
    api: Arc<API>,
    state: RwLock<Option<Identity>>,
    observers: Observers,
}

impl<TS, API> SessionManager<TS, API>
where
    TS: TokenStore,
    API: AuthApi,
{
    /// Create a session manager, hydrating from persisted tokens.
    ///
    /// No network call is made. A missing or expired access token starts the
    /// manager logged out; a stored token that cannot be decoded is wiped.
    ///
    /// # Arguments
    /// * `store` - Token persistence implementation
    /// * `api` - Auth API implementation
    pub fn new(store: Arc<TS>, api: Arc<API>) -> Self {
        let identity = Self::hydrate(store.as_ref());

        Self {
            store,
            api,
            state: RwLock::new(identity),
            observers: Observers::new(),
        }
    }

    /// Register a callback for every session transition.
    ///
    /// The callback runs synchronously, in order, with the new state:
    /// `Some` after login, register or refresh, `None` after any logout.
    ///
    /// # Returns
    /// Subscription handle; the callback is removed when it is dropped
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&Identity>) + Send + Sync + 'static,
    {
        self.observers.subscribe(Arc::new(callback))
    }

    fn hydrate(store: &TS) -> Option<Identity> {
        let pair = store.get()?;

        if store.is_expired(&pair.access_token) {
            tracing::debug!("Stored access token expired, starting logged out");
            return None;
        }

        match IdentityCodec::decode(&pair.access_token) {
            Ok(identity) => {
                tracing::info!(
                    username = %identity.username(),
                    role = %identity.role(),
                    "Session restored from stored token"
                );
                Some(identity)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored access token unreadable, discarding it");
                if let Err(e) = store.clear() {
                    tracing::error!(error = %e, "Failed to discard stored tokens");
                }
                None
            }
        }
    }

    /// Persist, decode, publish.
    ///
    /// The store write and the state assignment happen under the state lock,
    /// so the published identity always belongs to the stored token.
    /// Observers are notified after the lock is released.
    fn establish(
        &self,
        pair: TokenPair,
        operation: &'static str,
    ) -> Result<Identity, SessionError> {
        let decoded = {
            let mut state = self.write_state();
            self.store.set(&pair)?;

            let decoded = IdentityCodec::decode(&pair.access_token);
            match &decoded {
                Ok(identity) => *state = Some(identity.clone()),
                Err(_) => {
                    self.clear_store();
                    *state = None;
                }
            }
            decoded
        };

        match decoded {
            Ok(identity) => {
                tracing::info!(
                    operation,
                    username = %identity.username(),
                    role = %identity.role(),
                    "Session established"
                );
                self.observers.notify(Some(&identity));
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    error = %e,
                    "Issued access token unreadable, session ended"
                );
                self.observers.notify(None);
                Err(e.into())
            }
        }
    }

    fn end_session(&self) {
        {
            let mut state = self.write_state();
            self.clear_store();
            *state = None;
        }
        self.observers.notify(None);
    }

    /// Published identity and its access token, if the stored token is live.
    ///
    /// An identity whose token is missing or expired ends the session.
    fn live_session(&self) -> Option<(Identity, String)> {
        {
            let mut state = self.write_state();
            let identity = state.as_ref()?.clone();

            match self.store.get() {
                Some(pair) if !self.store.is_expired(&pair.access_token) => {
                    return Some((identity, pair.access_token));
                }
                _ => {
                    tracing::info!(
                        username = %identity.username(),
                        "Access token missing or expired, ending session"
                    );
                    self.clear_store();
                    *state = None;
                }
            }
        }

        self.observers.notify(None);
        None
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored tokens");
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Option<Identity>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<TS, API> SessionPort for SessionManager<TS, API>
where
    TS: TokenStore,
    API: AuthApi,
{
    async fn login(&self, credentials: &Credentials) -> Result<Identity, SessionError> {
        let pair = self.api.login(credentials).await.map_err(|e| {
            tracing::warn!(username = %credentials.username, error = %e, "Login failed");
            SessionError::from(e)
        })?;

        self.establish(pair, "login")
    }

    async fn register(&self, registration: &Registration) -> Result<Identity, SessionError> {
        let pair = self.api.register(registration).await.map_err(|e| {
            tracing::warn!(username = %registration.username, error = %e, "Registration failed");
            SessionError::from(e)
        })?;

        self.establish(pair, "register")
    }

    async fn refresh(&self) -> Result<Identity, SessionError> {
        let Some(pair) = self.store.get() else {
            tracing::warn!("Refresh requested without stored tokens, ending session");
            self.end_session();
            return Err(SessionError::NoSession);
        };

        match self.api.refresh(&pair.refresh_token).await {
            Ok(pair) => self.establish(pair, "refresh"),
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed, ending session");
                self.end_session();
                Err(SessionError::SessionExpired)
            }
        }
    }

    fn logout(&self) {
        tracing::info!("Logging out");
        self.end_session();
    }

    fn current_identity(&self) -> Option<Identity> {
        self.live_session().map(|(identity, _)| identity)
    }

    fn is_authenticated(&self) -> bool {
        self.live_session().is_some()
    }

    fn has_role(&self, role: &str) -> bool {
        self.live_session()
            .map_or(false, |(identity, _)| identity.role() == role)
    }

    fn access_token(&self) -> Option<String> {
        self.live_session().map(|(_, token)| token)
    }
}
