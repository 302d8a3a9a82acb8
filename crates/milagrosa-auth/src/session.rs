//! Session store: init, login and logout orchestration.

use std::time::Duration;

use chrono::Utc;
use milagrosa_core::error::{MilagrosaError, MilagrosaResult};
use milagrosa_core::gateway::{AuthApi, TokenStorage};
use milagrosa_core::models::role::Role;
use milagrosa_core::models::session::Session;
use milagrosa_core::models::user::{Credentials, RegistrationRequest};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::role;
use crate::token;

#[derive(Debug, Default)]
struct State {
    session: Option<Session>,
    token: Option<String>,
    /// Bumped by every login start and every logout; a login response
    /// is applied only if the generation it started under is current.
    generation: u64,
    in_flight: Option<u64>,
    initialized: bool,
}

/// Clears the in-flight marker when a login finishes or is dropped.
struct InFlight<'a> {
    state: &'a RwLock<State>,
    ticket: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write();
        if state.in_flight == Some(self.ticket) {
            state.in_flight = None;
        }
    }
}

/// Owner of the current session.
///
/// The session is only ever derived from a token (at [`init`] or
/// [`login`]) and only ever removed by [`logout`] / [`expire`]; there is
/// no way to set a role directly.
///
/// Generic over the auth API and storage so the store has no dependency
/// on HTTP or on any storage backend.
///
/// [`init`]: SessionStore::init
/// [`login`]: SessionStore::login
/// [`logout`]: SessionStore::logout
/// [`expire`]: SessionStore::expire
pub struct SessionStore<A: AuthApi, S: TokenStorage> {
    api: A,
    storage: S,
    config: AuthConfig,
    state: RwLock<State>,
}

impl<A: AuthApi, S: TokenStorage> SessionStore<A, S> {
    pub fn new(api: A, storage: S, config: AuthConfig) -> Self {
        Self {
            api,
            storage,
            config,
            state: RwLock::new(State::default()),
        }
    }

    /// Restore the session from a persisted token.
    ///
    /// Any failure (unreadable storage, malformed or expired token, no
    /// authorities) clears the persisted token and leaves the store
    /// empty; nothing is reported to the caller. Only the first call has
    /// an effect.
    pub fn init(&self) -> Option<Session> {
        let mut state = self.state.write();
        if state.initialized {
            debug!("session store already initialized");
            return state.session.clone();
        }
        state.initialized = true;

        let token = match self.storage.get(&self.config.token_key) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                self.clear_persisted();
                return None;
            }
        };

        match self.session_from_token(&token) {
            Ok(session) => {
                self.write_cache(&session);
                info!(identity = %session.identity, role = %session.role, "session restored");
                state.session = Some(session.clone());
                state.token = Some(token);
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "discarding persisted token");
                self.clear_persisted();
                None
            }
        }
    }

    /// Authenticate and, on success, persist the token and populate the
    /// session from it.
    ///
    /// Errors are returned as-is and never retried. A second login while
    /// one is pending fails with `LoginInProgress`; a response that
    /// arrives after a logout fails with `Superseded` and is discarded.
    pub async fn login(&self, credentials: Credentials) -> MilagrosaResult<Session> {
        let ticket = {
            let mut state = self.state.write();
            if state.in_flight.is_some() {
                return Err(AuthError::LoginInProgress.into());
            }
            state.generation += 1;
            state.in_flight = Some(state.generation);
            state.generation
        };
        let _in_flight = InFlight {
            state: &self.state,
            ticket,
        };

        debug!(identity = %credentials.email, "login attempt");
        let secs = self.config.login_timeout_secs;
        let response = match tokio::time::timeout(
            Duration::from_secs(secs),
            self.api.authenticate(&credentials),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(identity = %credentials.email, error = %e, "login failed");
                return Err(e);
            }
            Err(_) => {
                warn!(identity = %credentials.email, secs, "login timed out");
                return Err(AuthError::Timeout(secs).into());
            }
        };

        let session = self.session_from_token(&response.token)?;

        let mut state = self.state.write();
        if state.generation != ticket {
            warn!(identity = %session.identity, "discarding stale login response");
            return Err(AuthError::Superseded.into());
        }

        self.storage.set(&self.config.token_key, &response.token)?;
        self.write_cache(&session);
        info!(identity = %session.identity, role = %session.role, "logged in");
        state.session = Some(session.clone());
        state.token = Some(response.token);
        Ok(session)
    }

    /// Forget the session and the persisted token. Idempotent.
    pub fn logout(&self) {
        if let Some(session) = self.clear() {
            info!(identity = %session.identity, "logged out");
        }
    }

    /// Same cleanup as [`logout`](Self::logout), for a session the server
    /// has rejected.
    pub fn expire(&self) {
        if let Some(session) = self.clear() {
            warn!(identity = %session.identity, "session expired");
        }
    }

    /// [`expire`](Self::expire) for a rejection of `token`. Does nothing
    /// if the session has since moved on to another token or ended, so a
    /// late 401 for an old token cannot end a newer session.
    pub fn expire_token(&self, token: &str) -> bool {
        let mut state = self.state.write();
        if state.token.as_deref() != Some(token) {
            debug!("ignoring rejection of a token that is no longer current");
            return false;
        }
        if let Some(session) = self.clear_locked(&mut state) {
            warn!(identity = %session.identity, "session expired");
        }
        true
    }

    /// Register a new customer account. Never creates a session.
    pub async fn register(&self, request: RegistrationRequest) -> MilagrosaResult<bool> {
        request
            .validate()
            .map_err(|e| AuthError::InvalidRegistration(e.to_string()))?;

        let secs = self.config.login_timeout_secs;
        let accepted = tokio::time::timeout(Duration::from_secs(secs), self.api.register(&request))
            .await
            .map_err(|_| AuthError::Timeout(secs))??;

        info!(identity = %request.email, accepted, "registration");
        Ok(accepted)
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<Session> {
        self.state.read().session.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().session.as_ref().map(|s| s.role)
    }

    /// Bearer token to attach to resource requests.
    pub fn bearer_token(&self) -> Option<String> {
        let state = self.state.read();
        state.session.as_ref().and(state.token.clone())
    }

    /// The decode → expiry → resolve sequence shared by init and login.
    fn session_from_token(&self, raw: &str) -> Result<Session, AuthError> {
        let claims = token::decode(raw)?;
        if self.config.enforce_expiry
            && claims.is_expired_at(Utc::now(), self.config.expiry_leeway_secs)
        {
            return Err(AuthError::TokenExpired);
        }
        let role = role::resolve_role(&claims.authorities)?;
        Ok(Session {
            identity: claims.sub.clone(),
            role,
            issued_at: claims.issued_at()?,
            expires_at: claims.expires_at()?,
        })
    }

    fn clear(&self) -> Option<Session> {
        let mut state = self.state.write();
        self.clear_locked(&mut state)
    }

    fn clear_locked(&self, state: &mut State) -> Option<Session> {
        state.generation += 1;
        state.token = None;
        let previous = state.session.take();
        self.clear_persisted();
        previous
    }

    fn write_cache(&self, session: &Session) {
        let cached = serde_json::to_string(session)
            .map_err(|e| MilagrosaError::Internal(e.to_string()))
            .and_then(|json| self.storage.set(&self.config.session_key, &json))
            .and_then(|()| self.storage.set(&self.config.email_key, &session.identity));
        if let Err(e) = cached {
            warn!(error = %e, "could not cache session");
        }
    }

    fn clear_persisted(&self) {
        for key in [
            &self.config.token_key,
            &self.config.session_key,
            &self.config.email_key,
        ] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key = %key, error = %e, "could not clear persisted value");
            }
        }
    }
}
