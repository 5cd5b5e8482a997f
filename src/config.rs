use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    /// None when SMTP is not configured; notification emails are skipped.
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "durian-api".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "durian-app".into()),
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "durian-avatars".into()),
            access_key: std::env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("STORAGE_SECRET_KEY").unwrap_or_default(),
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
        };
        let mail = match std::env::var("MAIL_HOST") {
            Ok(smtp_host) => Some(MailConfig {
                smtp_host,
                smtp_port: std::env::var("MAIL_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(587),
                username: std::env::var("MAIL_USERNAME").unwrap_or_default(),
                password: std::env::var("MAIL_PASSWORD").unwrap_or_default(),
                from_name: std::env::var("MAIL_FROM_NAME")
                    .unwrap_or_else(|_| "DurianSupport".into()),
                from_address: std::env::var("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "duriansupport@durianapp.com".into()),
            }),
            Err(_) => None,
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            mail,
        })
    }
}
