use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        CreateIntentRequest, CreateIntentResponse, CreatePayment, PaymentCreated,
        UpdatePaymentRequest,
    },
    repo_types::{NewPaymentRecord, PaymentPatch},
};
use crate::{
    auth::{
        extractors::{Admin, Hr, RoleGuard},
        handlers::is_valid_email,
    },
    error::ApiError,
    state::AppState,
    users::repo_types::UpdateOutcome,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/:id", patch(update_payment))
        .route("/payments/intent", post(create_intent))
}

/// POST /payments — at most one payment request per (email, month, year).
/// The guard is an explicit existence check before the insert, not a storage
/// constraint, so two racing requests for the same period can both pass it.
#[instrument(skip(state, _hr, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    _hr: RoleGuard<Hr>,
    Json(mut payload): Json<CreatePayment>,
) -> Result<(StatusCode, Json<PaymentCreated>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.salary < 0 {
        return Err(ApiError::BadRequest("salary must be non-negative".into()));
    }

    if state
        .payments
        .exists_for_period(&payload.email, &payload.month, payload.year)
        .await?
    {
        warn!(email = %payload.email, month = %payload.month, year = payload.year,
            "duplicate payment period");
        return Err(ApiError::Duplicate(
            "payment already exists for this month".into(),
        ));
    }

    let payment = state
        .payments
        .insert(NewPaymentRecord {
            email: payload.email,
            month: payload.month,
            year: payload.year,
            salary: payload.salary,
            transaction_id: payload.transaction_id,
        })
        .await?;

    info!(payment_id = %payment.id, email = %payment.email, "payment request created");
    Ok((
        StatusCode::CREATED,
        Json(PaymentCreated {
            message: "payment request submitted".into(),
        }),
    ))
}

/// PATCH /payments/:id — admin-only record correction.
#[instrument(skip(state, _admin, payload))]
pub async fn update_payment(
    State(state): State<AppState>,
    _admin: RoleGuard<Admin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    if payload.salary.is_some_and(|s| s < 0) {
        return Err(ApiError::BadRequest("salary must be non-negative".into()));
    }

    let outcome = state
        .payments
        .patch(
            id,
            PaymentPatch {
                month: payload.month,
                year: payload.year,
                salary: payload.salary,
                transaction_id: payload.transaction_id,
            },
        )
        .await?;
    Ok(Json(outcome))
}

/// POST /payments/intent — delegates to the external charge gateway and
/// hands the client-usable secret back.
#[instrument(skip(state, _hr))]
pub async fn create_intent(
    State(state): State<AppState>,
    _hr: RoleGuard<Hr>,
    Json(payload): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    if payload.amount <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }

    let client_secret = state.charges.create_intent(payload.amount, "usd").await?;
    Ok(Json(CreateIntentResponse { client_secret }))
}
