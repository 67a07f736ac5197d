use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::Claims, jwt::JwtKeys};
use crate::{error::ApiError, state::AppState, users::repo_types::Role};

/// Extracts and verifies the bearer token, handing the decoded claims to the
/// handler. Runs before any handler logic; rejected requests never reach one.
#[derive(Debug)]
pub struct Identity(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        match keys.verify(token) {
            Ok(claims) => Ok(Identity(claims)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

/// Marker type naming a role a route requires.
pub trait RoleSpec {
    const ROLE: Role;
}

#[derive(Debug)]
pub struct Hr;
impl RoleSpec for Hr {
    const ROLE: Role = Role::Hr;
}

#[derive(Debug)]
pub struct Admin;
impl RoleSpec for Admin {
    const ROLE: Role = Role::Admin;
}

/// Role check layered on top of `Identity`.
///
/// The caller's role is looked up in the user directory on every request
/// rather than read from the token, so a role change takes effect on the very
/// next request without re-issuing tokens.
#[derive(Debug)]
pub struct RoleGuard<R: RoleSpec>(pub Claims, pub PhantomData<R>);

#[async_trait]
impl<R> FromRequestParts<AppState> for RoleGuard<R>
where
    R: RoleSpec + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Identity(claims) = Identity::from_request_parts(parts, state).await?;

        let user = state
            .users
            .find_by_email(&claims.email)
            .await
            .map_err(ApiError::Internal)?;

        match user {
            Some(u) if u.role == R::ROLE => Ok(RoleGuard(claims, PhantomData)),
            _ => {
                warn!(email = %claims.email, required = %R::ROLE, "role check failed");
                Err(ApiError::Forbidden(format!(
                    "Access denied for role: {}",
                    R::ROLE
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::NewUserRecord;
    use axum::http::{header, Request};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn sign(state: &AppState, email: &str) -> String {
        JwtKeys::from_ref(state).sign(email).expect("sign")
    }

    async fn seed(state: &AppState, email: &str, role: Role) {
        state
            .users
            .insert(NewUserRecord {
                email: email.into(),
                role,
                ..Default::default()
            })
            .await
            .expect("seed user");
    }

    #[tokio::test]
    async fn identity_attaches_issued_claims() {
        let state = AppState::fake();
        let token = sign(&state, "alice@example.com");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let Identity(claims) = Identity::from_request_parts(&mut parts, &state)
            .await
            .expect("identity");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[tokio::test]
    async fn identity_rejects_missing_header() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = Identity::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn identity_rejects_bad_scheme_and_tampered_token() {
        let state = AppState::fake();
        let token = sign(&state, "alice@example.com");

        let mut parts = parts_with_auth(Some(&token)); // no Bearer prefix
        assert!(matches!(
            Identity::from_request_parts(&mut parts, &state).await,
            Err(ApiError::Unauthenticated)
        ));

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}xx")));
        assert!(matches!(
            Identity::from_request_parts(&mut parts, &state).await,
            Err(ApiError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn role_guard_permits_matching_live_role() {
        let state = AppState::fake();
        seed(&state, "hr@example.com", Role::Hr).await;
        let token = sign(&state, "hr@example.com");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let guard = RoleGuard::<Hr>::from_request_parts(&mut parts, &state)
            .await
            .expect("hr allowed");
        assert_eq!(guard.0.email, "hr@example.com");
    }

    #[tokio::test]
    async fn role_guard_denies_wrong_role_and_unknown_email() {
        let state = AppState::fake();
        seed(&state, "emp@example.com", Role::Employee).await;

        let token = sign(&state, "emp@example.com");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = RoleGuard::<Admin>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        match err {
            ApiError::Forbidden(msg) => assert!(msg.contains("Admin")),
            other => panic!("expected Forbidden, got {other:?}"),
        }

        // Token is valid but the directory has no such user.
        let token = sign(&state, "ghost@example.com");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(matches!(
            RoleGuard::<Hr>::from_request_parts(&mut parts, &state).await,
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn role_guard_reflects_live_role_change() {
        let state = AppState::fake();
        seed(&state, "flux@example.com", Role::Hr).await;
        let token = sign(&state, "flux@example.com");

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(RoleGuard::<Hr>::from_request_parts(&mut parts, &state)
            .await
            .is_ok());

        // Downgrade the role in the directory; the same token must now fail.
        let user = state
            .users
            .find_by_email("flux@example.com")
            .await
            .unwrap()
            .unwrap();
        state
            .users
            .patch(
                user.id,
                crate::users::repo::UserPatch {
                    role: Some(Role::Employee),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(matches!(
            RoleGuard::<Hr>::from_request_parts(&mut parts, &state).await,
            Err(ApiError::Forbidden(_))
        ));
    }
}
