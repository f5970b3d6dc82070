use axum::{
    extract::{Query, State},
    response::Redirect,
};

use crate::{
    oauth::{complete_authorization, CallbackParams, OAuthError},
    session::Session,
    state::AppState,
};

/// Handle the redirect back from X
pub async fn callback(
    State(state): State<AppState>,
    mut session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, OAuthError> {
    let result = complete_authorization(&state.http, &state.x_oauth, &mut session.data, params).await;

    // The pending attempt is consumed either way
    session.save();

    let target = result?;
    Ok(Redirect::to(&target))
}
