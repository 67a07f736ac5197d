use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One per-period payment request. `salary` is the figure that applied at
/// time-of-write until a salary synchronization overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub email: String,
    pub month: String,
    pub year: i32,
    pub salary: i64,
    pub transaction_id: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewPaymentRecord {
    pub email: String,
    pub month: String,
    pub year: i32,
    pub salary: i64,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentPatch {
    pub month: Option<String>,
    pub year: Option<i32>,
    pub salary: Option<i64>,
    pub transaction_id: Option<String>,
}
