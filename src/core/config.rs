//! Server configuration
//!
//! All settings come from environment variables (loaded via dotenv in
//! `main`), with defaults suitable for development:
//!
//! | Variable | Default |
//! |----------|---------|
//! | PORT | 4000 |
//! | DATABASE_PATH | data/snackaroo.db |
//! | UPLOAD_DIR | upload |
//! | PUBLIC_BASE_URL / RENDER_EXTERNAL_URL | unset |
//! | STRIPE_SECRET_KEY | empty (gateway calls will fail) |
//! | STRIPE_WEBHOOK_SECRET | empty |
//! | STRIPE_API_BASE | https://api.stripe.com |
//! | ALLOWED_ORIGINS | storefront + admin GitHub Pages origins |

use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Cross-origin hosts allowed when `ALLOWED_ORIGINS` is unset
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://chrisw0987.github.io",
    "https://chrisw0987.github.io/snackaroo-admin",
    "https://chrisw0987.github.io/snackaroo-frontend",
];

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// RocksDB database path
    pub database_path: String,
    /// Root directory for uploaded files
    pub upload_dir: String,
    /// Explicit public base URL for uploaded-image links
    pub public_base_url: Option<String>,
    /// Gateway API secret key
    pub stripe_secret_key: String,
    /// Shared secret for webhook signature verification
    pub stripe_webhook_secret: String,
    /// Gateway API base URL (overridable for tests)
    pub stripe_api_base: String,
    /// Origins allowed by CORS (prefix match)
    pub allowed_origins: Vec<String>,
    /// JWT configuration
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        if stripe_secret_key.is_empty() {
            tracing::warn!("STRIPE_SECRET_KEY not set, checkout will fail");
        }
        let stripe_webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default();
        if stripe_webhook_secret.is_empty() {
            tracing::warn!("STRIPE_WEBHOOK_SECRET not set, webhooks will be rejected");
        }

        Self {
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/snackaroo.db".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "upload".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .or_else(|_| std::env::var("RENDER_EXTERNAL_URL"))
                .ok(),
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| {
                    DEFAULT_ALLOWED_ORIGINS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
            jwt: JwtConfig::from_env(),
        }
    }

    /// Directory that uploaded images are written to and served from
    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.upload_dir).join("images")
    }
}
