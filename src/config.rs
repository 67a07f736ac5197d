use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub stripe_secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            ttl_days: std::env::var("ACCESS_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(5),
        };
        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        Ok(Self {
            database_url,
            jwt,
            stripe_secret_key,
        })
    }
}
