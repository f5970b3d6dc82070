use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use maud::html;
use rand::Rng as _;
use tracing::info;

use crate::{
    components::{
        layout::{Card, ContentSection, Page},
        ui::{button::Button, heading::Heading},
    },
    oauth::OAuthError,
    session::Session,
    state::AppState,
};

pub const PLAYGROUND_PATH: &str = "/playground";
const TWEET_WRITE_SCOPE: &str = "tweet.write";

/// Where an anonymous visitor to the playground gets sent
pub fn playground_login_redirect() -> Redirect {
    Redirect::to(&format!(
        "/start?redirect_url={}",
        urlencoding::encode(PLAYGROUND_PATH)
    ))
}

pub async fn playground(session: Session) -> Response {
    let Some(token) = session.data.valid_token() else {
        return playground_login_redirect().into_response();
    };

    let content = html! {
        (Heading::h1("Playground"))
        @if token.has_scope(TWEET_WRITE_SCOPE) {
            p class="text-gray-600 mb-6" { "Post a little love to your timeline." }
            form method="post" action=(PLAYGROUND_PATH) {
                (Button::primary("Post an amor").full_width(true))
            }
        } @else {
            p class="text-gray-600 mb-6" { "This sign-in did not grant permission to post." }
        }
        div class="mt-4" {
            (Button::secondary("Back home").href("/").full_width(true))
        }
    };

    Page::new(
        "Playground - birdgate".to_string(),
        Box::new(Card::new(ContentSection::new(content))),
    )
    .into_response()
}

/// Post "Amor of N." as the signed-in user
pub async fn post_amor(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, OAuthError> {
    let Some(token) = session.data.valid_token() else {
        return Ok(playground_login_redirect().into_response());
    };

    let amount = rand::thread_rng().gen_range(1..=1_000_000);
    let tweet = state
        .api_client(token)
        .post_tweet(&amor_text(amount))
        .await?;
    info!(tweet_id = %tweet.id, "Posted tweet");

    let content = html! {
        (Heading::h1("Posted!"))
        (Heading::h2("Your post"))
        blockquote class="border-l-4 border-sky-400 pl-4 italic text-gray-700 mb-6" { (tweet.text) }
        (Button::primary("Post another").href(PLAYGROUND_PATH).full_width(true))
    };

    Ok(Page::new(
        "Posted - birdgate".to_string(),
        Box::new(Card::new(ContentSection::new(content))),
    )
    .into_response())
}

fn amor_text(amount: u32) -> String {
    format!("Amor of {amount}.")
}
