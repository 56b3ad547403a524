//! Server state
//!
//! Holds the shared service handles: constructed once at startup, cloned
//! cheaply into every handler (Arc-backed fields).

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::payment::{PaymentProvider, StripeGateway, WebhookVerifier};
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    /// Payment gateway (trait object so tests can substitute a fake)
    pub payments: Arc<dyn PaymentProvider>,
    pub webhook_verifier: WebhookVerifier,
}

impl ServerState {
    /// Initialize state for the server binary: RocksDB database and the
    /// real gateway client.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db_service = DbService::new(&config.database_path).await?;
        let payments = Arc::new(StripeGateway::new(
            config.stripe_secret_key.clone(),
            config.stripe_api_base.clone(),
        ));
        Ok(Self::with_parts(config.clone(), db_service.db, payments))
    }

    /// Assemble state from pre-built parts (tests pass an in-memory
    /// database and a fake payment provider).
    pub fn with_parts(
        config: Config,
        db: Surreal<Db>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let webhook_verifier = WebhookVerifier::new(&config.stripe_webhook_secret);
        Self {
            config,
            db,
            jwt_service,
            payments,
            webhook_verifier,
        }
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
