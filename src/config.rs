use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Endpoint of the product service speaking the same command envelope.
    pub products_url: String,
    pub default_page_limit: u64,
    pub lookup_retry_attempts: u32,
    pub lookup_retry_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(50051);
        let products_url =
            env::var("PRODUCTS_URL").unwrap_or_else(|_| "http://127.0.0.1:50052".to_string());
        let default_page_limit = env::var("DEFAULT_PAGE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(10);
        let lookup_retry_attempts = env::var("LOOKUP_RETRY_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);
        let lookup_retry_delay_ms = env::var("LOOKUP_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3000);
        Ok(Self {
            database_url,
            host,
            port,
            products_url,
            default_page_limit,
            lookup_retry_attempts,
            lookup_retry_delay_ms,
        })
    }
}
