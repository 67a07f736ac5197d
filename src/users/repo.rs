use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUserRecord, Role, UpdateOutcome, User};

const USER_COLUMNS: &str = "id, email, name, role, salary, bank_account, designation, \
     photo_url, is_verified, is_fired, created_at";

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

/// Partial update of profile fields. `None` leaves a column untouched.
/// Salary is deliberately absent here; it goes through `set_salary` so the
/// payment-history rewrite cannot be skipped by accident.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub bank_account: Option<String>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: Option<bool>,
    pub is_fired: Option<bool>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn insert(&self, user: NewUserRecord) -> anyhow::Result<User>;
    async fn list(&self, filter: UserFilter) -> anyhow::Result<Vec<User>>;
    /// Updates the authoritative salary. `modified_count` is 1 only when the
    /// stored value actually changed; a matched row already holding the value
    /// reports `matched_count` 1, `modified_count` 0.
    async fn set_salary(&self, id: Uuid, salary: i64) -> anyhow::Result<UpdateOutcome>;
    async fn patch(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<UpdateOutcome>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUserRecord) -> anyhow::Result<User> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, role, salary, bank_account,
                               designation, photo_url, is_verified, is_fired)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.salary)
        .bind(&user.bank_account)
        .bind(&user.designation)
        .bind(&user.photo_url)
        .bind(user.is_verified)
        .bind(user.is_fired)
        .fetch_one(&self.db)
        .await?;
        Ok(inserted)
    }

    async fn list(&self, filter: UserFilter) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::boolean IS NULL OR is_verified = $2)
            ORDER BY created_at
            "#
        ))
        .bind(filter.role)
        .bind(filter.is_verified)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn set_salary(&self, id: Uuid, salary: i64) -> anyhow::Result<UpdateOutcome> {
        // RETURNING reports whether the matched row held a different value
        // before the write, mirroring a document-store modified count.
        let changed = sqlx::query_scalar::<_, bool>(
            r#"
            WITH before AS (
                SELECT id, salary FROM users WHERE id = $1
            )
            UPDATE users u
            SET salary = $2
            FROM before b
            WHERE u.id = b.id
            RETURNING b.salary <> $2
            "#,
        )
        .bind(id)
        .bind(salary)
        .fetch_optional(&self.db)
        .await?;

        Ok(match changed {
            None => UpdateOutcome::default(),
            Some(changed) => UpdateOutcome {
                matched_count: 1,
                modified_count: u64::from(changed),
            },
        })
    }

    async fn patch(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<UpdateOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                bank_account = COALESCE($4, bank_account),
                designation = COALESCE($5, designation),
                photo_url = COALESCE($6, photo_url),
                is_verified = COALESCE($7, is_verified),
                is_fired = COALESCE($8, is_fired)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.role)
        .bind(&patch.bank_account)
        .bind(&patch.designation)
        .bind(&patch.photo_url)
        .bind(patch.is_verified)
        .bind(patch.is_fired)
        .execute(&self.db)
        .await?;

        // SQL counts every matched row as affected, value change or not.
        let n = result.rows_affected();
        Ok(UpdateOutcome {
            matched_count: n,
            modified_count: n,
        })
    }
}

/// In-memory directory backing `AppState::fake()`.
#[derive(Default)]
pub struct MemUserStore {
    users: std::sync::Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn insert(&self, user: NewUserRecord) -> anyhow::Result<User> {
        let mut users = self.users.lock().unwrap();
        // Same invariant the users table enforces with its unique index.
        if users.iter().any(|u| u.email == user.email) {
            anyhow::bail!("duplicate email: {}", user.email);
        }
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            role: user.role,
            salary: user.salary,
            bank_account: user.bank_account,
            designation: user.designation,
            photo_url: user.photo_url,
            is_verified: user.is_verified,
            is_fired: user.is_fired,
            created_at: time::OffsetDateTime::now_utc(),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn list(&self, filter: UserFilter) -> anyhow::Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .filter(|u| filter.is_verified.map_or(true, |v| u.is_verified == v))
            .cloned()
            .collect())
    }

    async fn set_salary(&self, id: Uuid, salary: i64) -> anyhow::Result<UpdateOutcome> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            None => Ok(UpdateOutcome::default()),
            Some(u) if u.salary == salary => Ok(UpdateOutcome {
                matched_count: 1,
                modified_count: 0,
            }),
            Some(u) => {
                u.salary = salary;
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: 1,
                })
            }
        }
    }

    async fn patch(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<UpdateOutcome> {
        let mut users = self.users.lock().unwrap();
        let Some(u) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(UpdateOutcome::default());
        };
        if let Some(name) = patch.name {
            u.name = Some(name);
        }
        if let Some(role) = patch.role {
            u.role = role;
        }
        if let Some(bank_account) = patch.bank_account {
            u.bank_account = Some(bank_account);
        }
        if let Some(designation) = patch.designation {
            u.designation = Some(designation);
        }
        if let Some(photo_url) = patch.photo_url {
            u.photo_url = Some(photo_url);
        }
        if let Some(is_verified) = patch.is_verified {
            u.is_verified = is_verified;
        }
        if let Some(is_fired) = patch.is_fired {
            u.is_fired = is_fired;
        }
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
        })
    }
}
