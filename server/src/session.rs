//! Per-browser session state, carried in a private cookie.
//!
//! The whole [`SessionState`] is serialized to JSON and sealed with the
//! app's [`CookieKey`](crate::cookies::CookieKey), so the browser holds it
//! but can neither read nor forge it. Handlers mutate `session.data` and call
//! [`Session::save`] before returning.

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use serde::{Deserialize, Serialize};
use time::Duration;
use tower_cookies::cookie::SameSite;
use tracing::{error, warn};

use crate::{
    cookies::{Cookie, CookieJar},
    oauth::OAuthToken,
    state::AppState,
};

/// Cookie name for storing the session
pub const SESSION_COOKIE_NAME: &str = "birdgate_session";

/// Default session duration in days
pub const DEFAULT_SESSION_DURATION_DAYS: i64 = 30;

/// Where a flow lands when no target was requested
pub const DEFAULT_REDIRECT_TARGET: &str = "/";

/// The in-flight authorization attempt. `state` and `code_verifier` are
/// always written and consumed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub pending: Option<PendingAuthorization>,
    pub redirect_target: Option<String>,
    pub token: Option<OAuthToken>,
}

impl SessionState {
    /// The stored token, if it is still usable
    pub fn valid_token(&self) -> Option<&OAuthToken> {
        self.token
            .as_ref()
            .filter(|token| !token.access_token.is_empty() && !token.is_expired())
    }

    pub fn is_authenticated(&self) -> bool {
        self.valid_token().is_some()
    }

    /// Remove the pending authorization; a second call returns `None`.
    pub fn take_pending(&mut self) -> Option<PendingAuthorization> {
        self.pending.take()
    }

    /// Consume the post-login target, falling back to the root.
    pub fn take_redirect_target(&mut self) -> String {
        self.redirect_target
            .take()
            .unwrap_or_else(|| DEFAULT_REDIRECT_TARGET.to_string())
    }

    /// Parse a cookie payload. Anything unreadable yields a fresh session.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(state) => state,
            Err(err) => {
                warn!("Discarding unreadable session payload: {}", err);
                Self::default()
            }
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Extractor giving a handler the caller's session
pub struct Session {
    jar: CookieJar,
    pub data: SessionState,
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;

        let data = jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| SessionState::decode(cookie.value()))
            .unwrap_or_default();

        Ok(Session { jar, data })
    }
}

impl Session {
    /// Write the current state back to the session cookie
    pub fn save(&self) {
        match self.data.encode() {
            Ok(payload) => self.jar.add(session_cookie(payload, self.jar.secure())),
            Err(err) => error!("Failed to serialize session: {:?}", err),
        }
    }
}

/// Creates the session cookie carrying `payload`
fn session_cookie(payload: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, payload);
    cookie.set_path("/");
    cookie.set_http_only(true);
    // Must survive the cross-site redirect back from X
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(Duration::days(DEFAULT_SESSION_DURATION_DAYS));
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: Option<i64>) -> OAuthToken {
        OAuthToken {
            access_token: "access".to_string(),
            token_type: "bearer".to_string(),
            scope: vec!["tweet.read".to_string()],
            refresh_token: None,
            expires_at,
        }
    }

    #[test]
    fn test_default_session_is_anonymous() {
        let session = SessionState::default();
        assert!(!session.is_authenticated());
        assert!(session.pending.is_none());
    }

    #[test]
    fn test_expired_token_is_not_valid() {
        let session = SessionState {
            token: Some(token(Some(chrono::Utc::now().timestamp() - 60))),
            ..Default::default()
        };
        assert!(!session.is_authenticated());

        let session = SessionState {
            token: Some(token(Some(chrono::Utc::now().timestamp() + 3600))),
            ..Default::default()
        };
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_redirect_target_is_consumed_once() {
        let mut session = SessionState {
            redirect_target: Some("/playground".to_string()),
            ..Default::default()
        };

        assert_eq!(session.take_redirect_target(), "/playground");
        assert_eq!(session.take_redirect_target(), "/");
        assert!(session.redirect_target.is_none());
    }

    #[test]
    fn test_pending_is_consumed_once() {
        let mut session = SessionState {
            pending: Some(PendingAuthorization {
                state: "abc123".to_string(),
                code_verifier: "verifier".to_string(),
            }),
            ..Default::default()
        };

        assert!(session.take_pending().is_some());
        assert!(session.take_pending().is_none());
    }

    #[test]
    fn test_decode_round_trip_and_garbage() {
        let session = SessionState {
            redirect_target: Some("/playground".to_string()),
            token: Some(token(None)),
            ..Default::default()
        };
        let encoded = session.encode().unwrap();
        assert_eq!(SessionState::decode(&encoded), session);

        assert_eq!(SessionState::decode("{not json"), SessionState::default());
    }

    #[test]
    fn test_decode_tolerates_missing_fields() {
        let decoded = SessionState::decode(r#"{"redirect_target":"/x"}"#);
        assert_eq!(decoded.redirect_target.as_deref(), Some("/x"));
        assert!(decoded.token.is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("{}".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
