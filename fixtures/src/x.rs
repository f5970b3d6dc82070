//! Fake X (Twitter) OAuth2 provider and API.
//!
//! Auto-approves every authorization request, so following the authorize
//! redirect lands straight back on the client's callback with a code. The
//! token endpoint enforces what the real one does for confidential clients:
//! HTTP Basic client credentials, single-use codes, a matching redirect URI
//! and an S256 PKCE proof.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;

pub const AUTHORIZE_PATH: &str = "/i/oauth2/authorize";
pub const TOKEN_PATH: &str = "/2/oauth2/token";
pub const USERS_ME_PATH: &str = "/2/users/me";
pub const TWEETS_PATH: &str = "/2/tweets";

const ACCESS_TOKEN_TTL_SECS: u64 = 7200;

#[derive(Debug, Clone, Serialize)]
pub struct FixtureUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

impl Default for FixtureUser {
    fn default() -> Self {
        Self {
            id: "1234567890".to_string(),
            name: "Fixture User".to_string(),
            username: "fixture_user".to_string(),
        }
    }
}

struct IssuedCode {
    redirect_uri: String,
    code_challenge: String,
    scope: String,
}

#[derive(Default)]
struct Ledger {
    codes: HashMap<String, IssuedCode>,
    tokens: HashMap<String, String>,
    tweets: Vec<String>,
    token_requests: usize,
}

struct Inner {
    client_id: String,
    client_secret: String,
    user: FixtureUser,
    ledger: Mutex<Ledger>,
}

/// Shared handle to the fake provider; clones observe the same ledger.
#[derive(Clone)]
pub struct XFixture {
    inner: Arc<Inner>,
}

impl XFixture {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                user: FixtureUser::default(),
                ledger: Mutex::new(Ledger::default()),
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(AUTHORIZE_PATH, get(authorize))
            .route(TOKEN_PATH, post(token))
            .route(USERS_ME_PATH, get(users_me))
            .route(TWEETS_PATH, post(create_tweet))
            .with_state(self.clone())
    }

    pub fn user(&self) -> &FixtureUser {
        &self.inner.user
    }

    /// Number of calls made to the token endpoint, successful or not.
    pub fn token_requests(&self) -> usize {
        self.ledger().token_requests
    }

    /// Texts of every tweet posted so far, oldest first.
    pub fn tweets(&self) -> Vec<String> {
        self.ledger().tweets.clone()
    }

    /// Mint an access token directly, skipping the authorization dance.
    pub fn issue_token(&self, scope: &str) -> String {
        let access_token = random_string(40);
        self.ledger()
            .tokens
            .insert(access_token.clone(), scope.to_string());
        access_token
    }

    /// Invalidate every issued access token, as if the user revoked the app.
    pub fn revoke_all_tokens(&self) {
        self.ledger().tokens.clear();
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn scope_for_bearer(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.ledger().tokens.get(token).cloned()
    }

    fn has_client_credentials(&self, headers: &HeaderMap) -> bool {
        let Some(encoded) = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Basic "))
        else {
            return false;
        };

        let expected = format!("{}:{}", self.inner.client_id, self.inner.client_secret);
        STANDARD
            .decode(encoded)
            .map(|decoded| decoded == expected.as_bytes())
            .unwrap_or(false)
    }
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn oauth_error(status: StatusCode, error: &str, description: &str) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "error_description": description,
        })),
    )
        .into_response()
}

fn api_error(status: StatusCode, detail: &str) -> Response {
    (
        status,
        Json(json!({
            "title": status.canonical_reason().unwrap_or("Error"),
            "status": status.as_u16(),
            "detail": detail,
        })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct AuthorizeParams {
    response_type: String,
    client_id: String,
    redirect_uri: String,
    scope: Option<String>,
    state: String,
    code_challenge: String,
    code_challenge_method: String,
}

#[derive(Serialize)]
struct OAuthRedirectParams<'a> {
    code: &'a str,
    state: &'a str,
}

async fn authorize(
    State(fixture): State<XFixture>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    if params.response_type != "code" {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_response_type",
            "Only response_type=code is supported",
        );
    }
    if params.client_id != fixture.inner.client_id {
        return oauth_error(StatusCode::BAD_REQUEST, "invalid_client", "Unknown client_id");
    }
    if params.code_challenge_method != "S256" || params.code_challenge.is_empty() {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "code_challenge with method S256 is required",
        );
    }

    let code = random_string(32);
    fixture.ledger().codes.insert(
        code.clone(),
        IssuedCode {
            redirect_uri: params.redirect_uri.clone(),
            code_challenge: params.code_challenge,
            scope: params.scope.unwrap_or_default(),
        },
    );

    let query = match serde_urlencoded::to_string(OAuthRedirectParams {
        code: &code,
        state: &params.state,
    }) {
        Ok(query) => query,
        Err(err) => {
            return oauth_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                &err.to_string(),
            )
        }
    };
    let separator = if params.redirect_uri.contains('?') { '&' } else { '?' };

    info!("X fixture: approved authorization, redirecting to {}", params.redirect_uri);
    Redirect::to(&format!("{}{}{}", params.redirect_uri, separator, query)).into_response()
}

#[derive(Deserialize)]
struct TokenForm {
    grant_type: String,
    code: Option<String>,
    redirect_uri: Option<String>,
    code_verifier: Option<String>,
}

async fn token(
    State(fixture): State<XFixture>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    fixture.ledger().token_requests += 1;

    if !fixture.has_client_credentials(&headers) {
        return oauth_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized_client",
            "Missing valid authorization header",
        );
    }
    if form.grant_type != "authorization_code" {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "Only authorization_code is supported",
        );
    }

    // Codes are single use: removing before validation burns them on any attempt.
    let issued = form
        .code
        .as_deref()
        .and_then(|code| fixture.ledger().codes.remove(code));
    let Some(issued) = issued else {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Value passed for the authorization code was invalid.",
        );
    };

    if form.redirect_uri.as_deref() != Some(issued.redirect_uri.as_str()) {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "redirect_uri does not match the authorization request",
        );
    }

    let proof = form
        .code_verifier
        .as_deref()
        .map(|verifier| URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())));
    if proof.as_deref() != Some(issued.code_challenge.as_str()) {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "code_verifier does not match code_challenge",
        );
    }

    let access_token = fixture.issue_token(&issued.scope);
    let refresh_token = issued
        .scope
        .split(' ')
        .any(|scope| scope == "offline.access")
        .then(|| random_string(40));

    Json(json!({
        "token_type": "bearer",
        "expires_in": ACCESS_TOKEN_TTL_SECS,
        "access_token": access_token,
        "scope": issued.scope,
        "refresh_token": refresh_token,
    }))
    .into_response()
}

async fn users_me(State(fixture): State<XFixture>, headers: HeaderMap) -> Response {
    if fixture.scope_for_bearer(&headers).is_none() {
        return api_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    Json(json!({ "data": fixture.user() })).into_response()
}

#[derive(Deserialize)]
struct CreateTweet {
    text: String,
}

async fn create_tweet(
    State(fixture): State<XFixture>,
    headers: HeaderMap,
    Json(body): Json<CreateTweet>,
) -> Response {
    let Some(scope) = fixture.scope_for_bearer(&headers) else {
        return api_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if !scope.split(' ').any(|s| s == "tweet.write") {
        return api_error(StatusCode::FORBIDDEN, "Missing tweet.write scope");
    }

    let id = {
        let mut ledger = fixture.ledger();
        ledger.tweets.push(body.text.clone());
        1_800_000_000_000_000_000u64 + ledger.tweets.len() as u64
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "id": id.to_string(),
                "text": body.text,
            }
        })),
    )
        .into_response()
}
