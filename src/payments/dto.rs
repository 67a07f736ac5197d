use serde::{Deserialize, Serialize};

/// Body for POST /payments (HR only).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    pub email: String,
    pub month: String,
    pub year: i32,
    pub salary: i64,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentCreated {
    pub message: String,
}

/// Body for PATCH /payments/:id (Admin only).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub month: Option<String>,
    pub year: Option<i32>,
    pub salary: Option<i64>,
    pub transaction_id: Option<String>,
}

/// Body for POST /payments/intent. Amount is in the currency's minor unit.
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
}
