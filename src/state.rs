use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::IdentityClient;
use crate::config::Config;

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub identity: Arc<IdentityClient>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let identity = Arc::new(IdentityClient::new(config.keycloak.clone()));
        Self {
            pool,
            config: Arc::new(config),
            identity,
        }
    }
}
