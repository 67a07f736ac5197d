use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewPaymentRecord, Payment, PaymentPatch};
use crate::users::repo_types::UpdateOutcome;

const PAYMENT_COLUMNS: &str = "id, email, month, year, salary, transaction_id, created_at";

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Pre-insert guard for the one-record-per-period rule. Check-then-act:
    /// two concurrent creators for the same period can both pass.
    async fn exists_for_period(&self, email: &str, month: &str, year: i32)
        -> anyhow::Result<bool>;
    async fn insert(&self, payment: NewPaymentRecord) -> anyhow::Result<Payment>;
    async fn patch(&self, id: Uuid, patch: PaymentPatch) -> anyhow::Result<UpdateOutcome>;
    /// Bulk overwrite of `salary` on every record for `email`, all periods.
    /// Returns the number of rewritten records.
    async fn set_salary_for_email(&self, email: &str, salary: i64) -> anyhow::Result<u64>;
    async fn list_by_email(&self, email: &str) -> anyhow::Result<Vec<Payment>>;
}

#[derive(Clone)]
pub struct PgPaymentStore {
    db: PgPool,
}

impl PgPaymentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn exists_for_period(
        &self,
        email: &str,
        month: &str,
        year: i32,
    ) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM payments
                WHERE email = $1 AND month = $2 AND year = $3
            )
            "#,
        )
        .bind(email)
        .bind(month)
        .bind(year)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, payment: NewPaymentRecord) -> anyhow::Result<Payment> {
        let inserted = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (email, month, year, salary, transaction_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(&payment.email)
        .bind(&payment.month)
        .bind(payment.year)
        .bind(payment.salary)
        .bind(&payment.transaction_id)
        .fetch_one(&self.db)
        .await?;
        Ok(inserted)
    }

    async fn patch(&self, id: Uuid, patch: PaymentPatch) -> anyhow::Result<UpdateOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET month = COALESCE($2, month),
                year = COALESCE($3, year),
                salary = COALESCE($4, salary),
                transaction_id = COALESCE($5, transaction_id)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.month)
        .bind(patch.year)
        .bind(patch.salary)
        .bind(&patch.transaction_id)
        .execute(&self.db)
        .await?;

        let n = result.rows_affected();
        Ok(UpdateOutcome {
            matched_count: n,
            modified_count: n,
        })
    }

    async fn set_salary_for_email(&self, email: &str, salary: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("UPDATE payments SET salary = $2 WHERE email = $1")
            .bind(email)
            .bind(salary)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_by_email(&self, email: &str) -> anyhow::Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE email = $1 ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// In-memory ledger backing `AppState::fake()`.
#[derive(Default)]
pub struct MemPaymentStore {
    payments: std::sync::Mutex<Vec<Payment>>,
}

#[async_trait]
impl PaymentStore for MemPaymentStore {
    async fn exists_for_period(
        &self,
        email: &str,
        month: &str,
        year: i32,
    ) -> anyhow::Result<bool> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.email == email && p.month == month && p.year == year))
    }

    async fn insert(&self, payment: NewPaymentRecord) -> anyhow::Result<Payment> {
        let record = Payment {
            id: Uuid::new_v4(),
            email: payment.email,
            month: payment.month,
            year: payment.year,
            salary: payment.salary,
            transaction_id: payment.transaction_id,
            created_at: time::OffsetDateTime::now_utc(),
        };
        self.payments.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn patch(&self, id: Uuid, patch: PaymentPatch) -> anyhow::Result<UpdateOutcome> {
        let mut payments = self.payments.lock().unwrap();
        let Some(p) = payments.iter_mut().find(|p| p.id == id) else {
            return Ok(UpdateOutcome::default());
        };
        if let Some(month) = patch.month {
            p.month = month;
        }
        if let Some(year) = patch.year {
            p.year = year;
        }
        if let Some(salary) = patch.salary {
            p.salary = salary;
        }
        if let Some(transaction_id) = patch.transaction_id {
            p.transaction_id = Some(transaction_id);
        }
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
        })
    }

    async fn set_salary_for_email(&self, email: &str, salary: i64) -> anyhow::Result<u64> {
        let mut payments = self.payments.lock().unwrap();
        let mut rewritten = 0;
        for p in payments.iter_mut().filter(|p| p.email == email) {
            p.salary = salary;
            rewritten += 1;
        }
        Ok(rewritten)
    }

    async fn list_by_email(&self, email: &str) -> anyhow::Result<Vec<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.email == email)
            .cloned()
            .collect())
    }
}
