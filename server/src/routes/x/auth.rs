use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::{
    oauth::{begin_authorization, OAuthError},
    session::Session,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct StartParams {
    /// Same-origin path to land on once the flow completes
    pub redirect_url: Option<String>,
}

/// Start the X OAuth flow, or skip it when the session already has a token
pub async fn start(
    State(state): State<AppState>,
    mut session: Session,
    Query(params): Query<StartParams>,
) -> Result<Redirect, OAuthError> {
    let start = begin_authorization(
        &state.x_oauth,
        &mut session.data,
        params.redirect_url.as_deref(),
    )?;
    session.save();

    Ok(Redirect::to(start.location()))
}
