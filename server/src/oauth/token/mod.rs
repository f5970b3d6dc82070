use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Raw body returned by the provider's token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds
    pub expires_in: Option<i64>,
    /// Space-delimited list of granted scopes
    pub scope: Option<String>,
    /// Only issued when `offline.access` was granted
    pub refresh_token: Option<String>,
}

/// The credential bound to a browser session after a successful callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// The access token for API requests
    pub access_token: String,
    /// The token type (X returns "bearer")
    pub token_type: String,
    /// The scopes granted to this token
    pub scope: Vec<String>,
    /// Refresh token, kept but never used
    pub refresh_token: Option<String>,
    /// When the access token expires (as Unix timestamp)
    pub expires_at: Option<i64>,
}

/// Unix timestamp `secs` after `now`. Out-of-range lifetimes count as no expiry.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<i64> {
    let lifetime = Duration::try_seconds(secs)?;
    now.checked_add_signed(lifetime)
        .map(|expires_at| expires_at.timestamp())
}

impl OAuthToken {
    pub fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            scope: response
                .scope
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            refresh_token: response.refresh_token,
            expires_at: response
                .expires_in
                .and_then(|secs| expiry_after(now, secs)),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now.timestamp(),
            None => false,
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "access".to_string(),
            token_type: "bearer".to_string(),
            expires_in,
            scope: Some("tweet.read users.read offline.access".to_string()),
            refresh_token: Some("refresh".to_string()),
        }
    }

    #[test]
    fn test_scope_is_split() {
        let token = OAuthToken::from_token_response(response(None), Utc::now());
        assert_eq!(token.scope, vec!["tweet.read", "users.read", "offline.access"]);
        assert!(token.has_scope("users.read"));
        assert!(!token.has_scope("tweet.write"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let token = OAuthToken::from_token_response(response(Some(7200)), now);

        assert_eq!(token.expires_at, Some(now.timestamp() + 7200));
        assert!(!token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::seconds(7200)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_treated_as_no_expiry() {
        let now = Utc::now();

        let token = OAuthToken::from_token_response(response(Some(i64::MAX)), now);
        assert_eq!(token.expires_at, None);

        let token = OAuthToken::from_token_response(response(Some(i64::MIN)), now);
        assert_eq!(token.expires_at, None);
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let token = OAuthToken::from_token_response(response(None), Utc::now());
        assert!(!token.is_expired_at(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn test_parses_provider_body() {
        let body = r#"{"token_type":"bearer","expires_in":7200,"access_token":"abc","scope":"tweet.read"}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.refresh_token, None);
    }
}
