use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ListUsersQuery, RegisterResponse, RegisterUser, RoleResponse, UpdateUserRequest},
    repo::{UserFilter, UserPatch},
    repo_types::{NewUserRecord, Role, UpdateOutcome, User},
    services::sync_salary,
};
use crate::{
    auth::{extractors::Identity, handlers::is_valid_email},
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", patch(update_user))
        .route("/users/roles/:email", get(user_role))
}

/// POST /users — idempotent registration. A known email is answered with a
/// null `insertedId` and no mutation.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterUser>,
) -> Result<Json<RegisterResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.salary < 0 {
        return Err(ApiError::BadRequest("salary must be non-negative".into()));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Ok(Json(RegisterResponse {
            inserted_id: None,
            message: Some("already exist this user".into()),
        }));
    }

    let user = state
        .users
        .insert(NewUserRecord {
            email: payload.email,
            name: payload.name,
            role: payload.role,
            salary: payload.salary,
            bank_account: payload.bank_account,
            designation: payload.designation,
            photo_url: payload.photo_url,
            is_verified: payload.is_verified,
            is_fired: payload.is_fired,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(RegisterResponse {
        inserted_id: Some(user.id),
        message: None,
    }))
}

/// GET /users — directory listing with optional role / verification filters.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Identity(_claims): Identity,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .users
        .list(UserFilter {
            role: query.role,
            is_verified: query.is_verified,
        })
        .await?;
    Ok(Json(users))
}

/// PATCH /users/:id — a body carrying `salary` runs the salary synchronizer;
/// anything else is a plain profile patch. An unknown id reports zero counts.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Identity(_claims): Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let outcome = if let Some(salary) = payload.salary {
        if salary < 0 {
            return Err(ApiError::BadRequest("salary must be non-negative".into()));
        }
        sync_salary(&state, id, salary).await?
    } else {
        state
            .users
            .patch(
                id,
                UserPatch {
                    name: payload.name,
                    role: payload.role,
                    bank_account: payload.bank_account,
                    designation: payload.designation,
                    photo_url: payload.photo_url,
                    is_verified: payload.is_verified,
                    is_fired: payload.is_fired,
                },
            )
            .await?
    };
    Ok(Json(outcome))
}

/// GET /users/roles/:email — a caller may only ask about their own email.
#[instrument(skip(state))]
pub async fn user_role(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let email = email.trim().to_lowercase();
    if claims.email != email {
        warn!(caller = %claims.email, requested = %email, "cross-identity role lookup");
        return Err(ApiError::Forbidden("forbidden access".into()));
    }

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(Json(RoleResponse {
        user_role: user.role,
        is_admin: user.role == Role::Admin,
        is_hr: user.role == Role::Hr,
        is_employee: user.role == Role::Employee,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use crate::payments::repo_types::NewPaymentRecord;

    fn claims(email: &str) -> Claims {
        Claims {
            email: email.into(),
            iat: 0,
            exp: usize::MAX,
        }
    }

    fn register_body(email: &str) -> RegisterUser {
        serde_json::from_value(serde_json::json!({ "email": email })).unwrap()
    }

    #[tokio::test]
    async fn register_twice_inserts_once() {
        let state = AppState::fake();

        let Json(first) = create_user(State(state.clone()), Json(register_body("a@x.com")))
            .await
            .unwrap();
        assert!(first.inserted_id.is_some());

        let Json(second) = create_user(State(state.clone()), Json(register_body("a@x.com")))
            .await
            .unwrap();
        assert!(second.inserted_id.is_none());
        assert_eq!(second.message.as_deref(), Some("already exist this user"));

        let all = state.users.list(UserFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn list_users_applies_filters() {
        let state = AppState::fake();
        for (email, role, verified) in [
            ("a@x.com", Role::Employee, true),
            ("b@x.com", Role::Hr, true),
            ("c@x.com", Role::Employee, false),
        ] {
            state
                .users
                .insert(NewUserRecord {
                    email: email.into(),
                    role,
                    is_verified: verified,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let Json(users) = list_users(
            State(state.clone()),
            Identity(claims("a@x.com")),
            Query(ListUsersQuery {
                role: Some(Role::Employee),
                is_verified: Some(true),
            }),
        )
        .await
        .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "a@x.com");
    }

    #[tokio::test]
    async fn salary_patch_rewrites_full_history() {
        let state = AppState::fake();
        let user = state
            .users
            .insert(NewUserRecord {
                email: "a@x.com".into(),
                salary: 1000,
                ..Default::default()
            })
            .await
            .unwrap();
        for (month, year) in [("Jan", 2024), ("Feb", 2024)] {
            state
                .payments
                .insert(NewPaymentRecord {
                    email: "a@x.com".into(),
                    month: month.into(),
                    year,
                    salary: 1000,
                    transaction_id: None,
                })
                .await
                .unwrap();
        }

        let Json(outcome) = update_user(
            State(state.clone()),
            Identity(claims("admin@x.com")),
            Path(user.id),
            Json(UpdateUserRequest {
                salary: Some(1800),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.modified_count, 1);

        let history = state.payments.list_by_email("a@x.com").await.unwrap();
        assert!(history.iter().all(|p| p.salary == 1800));
    }

    #[tokio::test]
    async fn salary_patch_unknown_id_reports_zero_counts() {
        let state = AppState::fake();
        let Json(outcome) = update_user(
            State(state),
            Identity(claims("admin@x.com")),
            Path(Uuid::new_v4()),
            Json(UpdateUserRequest {
                salary: Some(1800),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.modified_count, 0);
    }

    #[tokio::test]
    async fn plain_patch_leaves_ledger_alone() {
        let state = AppState::fake();
        let user = state
            .users
            .insert(NewUserRecord {
                email: "a@x.com".into(),
                salary: 1000,
                ..Default::default()
            })
            .await
            .unwrap();
        state
            .payments
            .insert(NewPaymentRecord {
                email: "a@x.com".into(),
                month: "Jan".into(),
                year: 2024,
                salary: 1000,
                transaction_id: None,
            })
            .await
            .unwrap();

        update_user(
            State(state.clone()),
            Identity(claims("admin@x.com")),
            Path(user.id),
            Json(UpdateUserRequest {
                designation: Some("Team Lead".into()),
                is_verified: Some(true),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let updated = state.users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.designation.as_deref(), Some("Team Lead"));
        assert!(updated.is_verified);
        assert_eq!(updated.salary, 1000);

        let history = state.payments.list_by_email("a@x.com").await.unwrap();
        assert_eq!(history[0].salary, 1000);
    }

    #[tokio::test]
    async fn role_lookup_enforces_self_match() {
        let state = AppState::fake();
        state
            .users
            .insert(NewUserRecord {
                email: "a@x.com".into(),
                role: Role::Hr,
                ..Default::default()
            })
            .await
            .unwrap();

        let err = user_role(
            State(state.clone()),
            Identity(claims("a@x.com")),
            Path("b@x.com".into()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let Json(role) = user_role(
            State(state),
            Identity(claims("a@x.com")),
            Path("a@x.com".into()),
        )
        .await
        .unwrap();
        assert_eq!(role.user_role, Role::Hr);
        assert!(role.is_hr);
        assert!(!role.is_admin);
        assert!(!role.is_employee);
    }
}
