use std::env;

pub mod cors;

pub use cors::create_cors_layer;

/// Process configuration, read from the environment exactly once at startup
/// and handed to the router state. Nothing else looks at the environment for
/// these values.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Externally reachable base URL baked into every QR artifact. Whatever
    /// device scans a boleto must be able to resolve this address.
    pub validation_base_url: String,
    pub keycloak: KeycloakConfig,
}

/// Identity provider connection settings (token introspection only).
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/conciertop".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a valid u32"),
            db_acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("DB_ACQUIRE_TIMEOUT_SECS must be a valid u64"),
            validation_base_url: env::var("VALIDATION_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            keycloak: KeycloakConfig {
                base_url: env::var("KEYCLOAK_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                realm: env::var("KEYCLOAK_REALM").unwrap_or_else(|_| "conciertop".to_string()),
                client_id: env::var("KEYCLOAK_CLIENT_ID")
                    .unwrap_or_else(|_| "conciertop-api".to_string()),
                client_secret: env::var("KEYCLOAK_CLIENT_SECRET").unwrap_or_default(),
            },
        }
    }
}
