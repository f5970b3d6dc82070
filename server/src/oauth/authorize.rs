use serde::Serialize;
use tracing::info;

use crate::{
    oauth::{
        pkce::{generate_state, PkcePair, CODE_CHALLENGE_METHOD},
        OAuthError,
    },
    session::{PendingAuthorization, SessionState, DEFAULT_REDIRECT_TARGET},
    state::XOAuthConfig,
};

#[derive(Serialize)]
struct AuthUrlParams<'a> {
    response_type: &'static str,
    client_id: &'a str,
    redirect_uri: &'a str,
    scope: &'a str,
    state: &'a str,
    code_challenge: &'a str,
    code_challenge_method: &'static str,
}

/// Where the user agent goes after `/start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationStart {
    /// The session already holds a valid token; go straight to the target.
    AlreadyAuthorized { redirect_to: String },
    /// Send the user to the provider's consent screen.
    Redirect { url: String },
}

impl AuthorizationStart {
    pub fn location(&self) -> &str {
        match self {
            AuthorizationStart::AlreadyAuthorized { redirect_to } => redirect_to,
            AuthorizationStart::Redirect { url } => url,
        }
    }
}

/// Begin (or short-circuit) the authorization code flow for one session.
///
/// A fresh `state` and PKCE pair are minted for every attempt and stored in
/// the session, replacing whatever an abandoned attempt left behind. The
/// provider is not contacted here; the caller redirects to the returned URL.
pub fn begin_authorization(
    config: &XOAuthConfig,
    session: &mut SessionState,
    requested_target: Option<&str>,
) -> Result<AuthorizationStart, OAuthError> {
    let target = sanitize_redirect_target(requested_target);

    if session.is_authenticated() {
        info!("Session already authorized, skipping OAuth flow");
        return Ok(AuthorizationStart::AlreadyAuthorized {
            redirect_to: target,
        });
    }

    let pkce = PkcePair::generate();
    let state = generate_state();
    let url = authorization_url(config, &state, pkce.challenge())?;

    session.redirect_target = Some(target);
    session.pending = Some(PendingAuthorization {
        state,
        code_verifier: pkce.into_verifier(),
    });

    info!("Starting X OAuth flow");
    Ok(AuthorizationStart::Redirect { url })
}

/// Build the provider authorization URL for one attempt
pub fn authorization_url(
    config: &XOAuthConfig,
    state: &str,
    code_challenge: &str,
) -> Result<String, OAuthError> {
    let scope = config.scopes.join(" ");
    let query = serde_urlencoded::to_string(AuthUrlParams {
        response_type: "code",
        client_id: &config.client_id,
        redirect_uri: &config.redirect_uri,
        scope: &scope,
        state,
        code_challenge,
        code_challenge_method: CODE_CHALLENGE_METHOD,
    })?;

    let separator = if config.authorize_url.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", config.authorize_url, separator, query))
}

/// Only same-origin absolute paths are honoured; anything else lands on `/`.
pub fn sanitize_redirect_target(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains('\\')
                && !target.chars().any(char::is_control) =>
        {
            target.to_string()
        }
        _ => DEFAULT_REDIRECT_TARGET.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::{pkce::challenge_for, OAuthToken};

    fn config() -> XOAuthConfig {
        XOAuthConfig::new("client-123", "secret", "http://localhost:3000/oauth/callback")
    }

    fn query_params(url: &str) -> Vec<(String, String)> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        serde_urlencoded::from_str(query).unwrap()
    }

    fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_begin_stores_state_verifier_and_target() {
        let mut session = SessionState::default();
        let start = begin_authorization(&config(), &mut session, Some("/playground")).unwrap();

        let AuthorizationStart::Redirect { url } = start else {
            panic!("expected a provider redirect");
        };
        assert!(url.starts_with("https://twitter.com/i/oauth2/authorize?"));

        let pending = session.pending.clone().unwrap();
        let params = query_params(&url);
        assert_eq!(param(&params, "response_type"), Some("code"));
        assert_eq!(param(&params, "client_id"), Some("client-123"));
        assert_eq!(
            param(&params, "redirect_uri"),
            Some("http://localhost:3000/oauth/callback")
        );
        assert_eq!(
            param(&params, "scope"),
            Some("tweet.read users.read tweet.write offline.access")
        );
        assert_eq!(param(&params, "state"), Some(pending.state.as_str()));
        assert_eq!(param(&params, "code_challenge_method"), Some("S256"));
        assert_eq!(
            param(&params, "code_challenge"),
            Some(challenge_for(&pending.code_verifier).as_str())
        );
        assert_eq!(session.redirect_target.as_deref(), Some("/playground"));
    }

    #[test]
    fn test_each_attempt_gets_fresh_values() {
        let mut session = SessionState::default();
        begin_authorization(&config(), &mut session, None).unwrap();
        let first = session.pending.clone().unwrap();

        begin_authorization(&config(), &mut session, None).unwrap();
        let second = session.pending.clone().unwrap();

        assert_ne!(first.state, second.state);
        assert_ne!(first.code_verifier, second.code_verifier);
        assert_eq!(session.redirect_target.as_deref(), Some("/"));
    }

    #[test]
    fn test_short_circuits_with_valid_token() {
        let mut session = SessionState {
            token: Some(OAuthToken {
                access_token: "access".to_string(),
                token_type: "bearer".to_string(),
                scope: vec![],
                refresh_token: None,
                expires_at: None,
            }),
            ..Default::default()
        };

        let start = begin_authorization(&config(), &mut session, Some("/playground")).unwrap();

        assert_eq!(
            start,
            AuthorizationStart::AlreadyAuthorized {
                redirect_to: "/playground".to_string()
            }
        );
        assert!(session.pending.is_none());
        assert!(session.redirect_target.is_none());
    }

    #[test]
    fn test_expired_token_restarts_flow() {
        let mut session = SessionState {
            token: Some(OAuthToken {
                access_token: "access".to_string(),
                token_type: "bearer".to_string(),
                scope: vec![],
                refresh_token: None,
                expires_at: Some(0),
            }),
            ..Default::default()
        };

        let start = begin_authorization(&config(), &mut session, None).unwrap();
        assert!(matches!(start, AuthorizationStart::Redirect { .. }));
        assert!(session.pending.is_some());
    }

    #[test]
    fn test_authorize_url_with_existing_query() {
        let mut config = config();
        config.authorize_url = "http://localhost:9000/authorize?tenant=a".to_string();

        let url = authorization_url(&config, "s", "c").unwrap();
        assert!(url.starts_with("http://localhost:9000/authorize?tenant=a&response_type=code"));
    }

    #[test]
    fn test_sanitize_redirect_target() {
        assert_eq!(sanitize_redirect_target(None), "/");
        assert_eq!(sanitize_redirect_target(Some("/playground")), "/playground");
        assert_eq!(sanitize_redirect_target(Some("/a?b=c")), "/a?b=c");
        assert_eq!(sanitize_redirect_target(Some("https://evil.example")), "/");
        assert_eq!(sanitize_redirect_target(Some("//evil.example")), "/");
        assert_eq!(sanitize_redirect_target(Some("/\\evil.example")), "/");
        assert_eq!(sanitize_redirect_target(Some("playground")), "/");
        assert_eq!(sanitize_redirect_target(Some("")), "/");
    }
}
