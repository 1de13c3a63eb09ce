//! Identity collaborator: bearer-token introspection against the OpenID
//! provider. Handlers only ever see the caller's subject id, which the rest
//! of the service treats as an opaque owner reference.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use serde::Deserialize;

use crate::config::KeycloakConfig;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Introspection result, as the provider reports it.
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub active: bool,
    pub sub: Option<String>,
}

pub struct IdentityClient {
    http: reqwest::Client,
    config: KeycloakConfig,
}

impl IdentityClient {
    pub fn new(config: KeycloakConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn realm_url(&self, path: &str) -> String {
        format!(
            "{}/realms/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.realm,
            path
        )
    }

    /// Ask the provider whether `token` is active and return its claims.
    pub async fn introspect(&self, token: &str) -> Result<TokenInfo, AppError> {
        let response = self
            .http
            .post(self.realm_url("protocol/openid-connect/token/introspect"))
            .form(&[
                ("token", token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Identity provider unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::AuthError("Invalid token".to_string()));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Malformed introspection response: {e}"))
        })?;

        if !info.active {
            return Err(AppError::AuthError("Token is inactive".to_string()));
        }

        Ok(info)
    }

    /// Reachability probe for the health endpoint.
    pub async fn probe(&self) -> bool {
        match self
            .http
            .get(self.realm_url(".well-known/openid-configuration"))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// The authenticated caller, extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Identity-provider subject id.
    pub sub: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

        let info = state.identity.introspect(token).await?;

        let sub = info.sub.filter(|sub| !sub.is_empty()).ok_or_else(|| {
            AppError::ValidationError("No se pudo obtener el ID del usuario".to_string())
        })?;

        Ok(CurrentUser { sub })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
