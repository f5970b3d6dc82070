use axum::{
    extract::State,
    routing::{get, post},
};
use maud::{html, Markup};
use tracing::warn;
use tower_cookies::CookieManagerLayer;

use crate::{
    components::{
        layout::{Card, ContentSection, Page},
        ui::{
            badge::{Badge, BadgeColor},
            button::Button,
            heading::Heading,
        },
    },
    oauth::OAuthError,
    session::Session,
    state::AppState,
};

pub mod x;

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(root_page))
        // X OAuth routes
        .route("/start", get(x::start))
        .route("/oauth/callback", get(x::callback))
        // Demo protected routes
        .route("/playground", get(x::playground).post(x::post_amor))
        .layer(CookieManagerLayer::new())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Root page handler - profile summary when signed in, login prompt otherwise
async fn root_page(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Page, OAuthError> {
    let client = session
        .data
        .valid_token()
        .map(|token| state.api_client(token));

    let content = match client {
        Some(client) => match client.me().await {
            Ok(user) => html! {
                (Heading::h1(&format!("Hi, {}", user.name)))
                p class="text-gray-600 mb-2" { "@" (user.username) }
                div class="mb-6" {
                    (Badge::new("Connected to X", BadgeColor::Green).rounded(true))
                    " "
                    (Badge::new(&format!("id {}", user.id), BadgeColor::Gray))
                }
                (Button::primary("Open the playground").href("/playground").full_width(true))
            },
            Err(err) if err.is_unauthorized() => {
                warn!("X rejected the session's access token, signing out");
                session.data.token = None;
                session.save();
                login_prompt()
            }
            Err(err) => return Err(err),
        },
        None => login_prompt(),
    };

    Ok(Page::new(
        "birdgate".to_string(),
        Box::new(Card::new(ContentSection::new(content))),
    ))
}

fn login_prompt() -> Markup {
    html! {
        (Heading::h1("Welcome to birdgate"))
        p class="text-gray-600 mb-6" { "Sign in with your X account to continue." }
        (Button::primary("Sign in with X").href("/start").full_width(true))
    }
}
