use axum::http::HeaderMap;
use convertrail_game::{GameError, GameSession, Rules};
use std::sync::Arc;

use crate::config::{ConfigError, ServerConfig};
use crate::cookie::CookieSigner;
use crate::error::{Action, WebError};
use crate::session::SessionStore;

/// Shared handler state. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    pub rules: Arc<Rules>,
    pub sessions: Arc<SessionStore>,
    pub signer: Arc<CookieSigner>,
}

impl AppState {
    #[must_use]
    pub fn new(rules: Rules, sessions: SessionStore, signer: CookieSigner) -> Self {
        Self {
            rules: Arc::new(rules),
            sessions: Arc::new(sessions),
            signer: Arc::new(signer),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the rules or signing key cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.load_rules()?,
            SessionStore::new(config.session_ttl(), config.max_sessions),
            config.signer()?,
        ))
    }

    /// Live session id carried by the request, if any.
    #[must_use]
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        self.signer
            .session_id(headers)
            .filter(|id| self.sessions.contains(id))
    }

    /// Run `f` against the caller's game session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotStarted` when the request has no live session, or
    /// whatever `f` returns, tagged with `action`.
    pub fn with_game<T>(
        &self,
        headers: &HeaderMap,
        action: Action,
        f: impl FnOnce(&mut GameSession, &Rules) -> Result<T, GameError>,
    ) -> Result<T, WebError> {
        let missing = || WebError::during(action, GameError::SessionNotStarted);
        let id = self.signer.session_id(headers).ok_or_else(missing)?;
        self.sessions
            .with_session(&id, |session| f(session, &self.rules))
            .ok_or_else(missing)?
            .map_err(|source| WebError::during(action, source))
    }
}
