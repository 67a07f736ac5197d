use serde::{Deserialize, Serialize};

/// Body for POST /jwt. Extra profile fields sent by clients are ignored;
/// only the email ends up in the token.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
