use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{TokenRequest, TokenResponse},
    jwt::JwtKeys,
};
use crate::{error::ApiError, state::AppState};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/jwt", post(issue_token))
}

/// Exchange an email for a signed access token. Registration and login both
/// funnel through here; the server holds no session state afterwards.
#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(mut payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&payload.email)?;

    info!(email = %payload.email, "token issued");
    Ok(Json(TokenResponse { token }))
}
