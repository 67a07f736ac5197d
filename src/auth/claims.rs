use serde::{Deserialize, Serialize};

/// JWT payload used for authentication. The caller is identified by email;
/// role is never trusted from the token (see `extractors::RoleGuard`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
