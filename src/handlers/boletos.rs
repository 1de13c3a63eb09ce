//! HTTP handlers for the boleto endpoints.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::models::CreateBoletoRequest;
use crate::services::redemption::RedemptionOutcome;
use crate::services::{issuance, ownership, redemption};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

const VALIDATION_PAGE: &str = include_str!("../../templates/validation.html");

pub async fn create_boleto(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreateBoletoRequest>,
) -> Result<Response, AppError> {
    if request.cantidad_boletos <= 0 {
        return Err(AppError::ValidationError(
            "cantidad_boletos debe ser mayor que cero".to_string(),
        ));
    }
    if request.precio_final < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "precio_final no puede ser negativo".to_string(),
        ));
    }

    let boleto = issuance::issue(
        &state.pool,
        &state.config.validation_base_url,
        &current_user.sub,
        &request,
    )
    .await?;

    Ok(success(boleto, "Boleto creado exitosamente").into_response())
}

pub async fn get_boletos_by_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Response, AppError> {
    let boletos = ownership::list_my_boletos(&state.pool, &current_user.sub).await?;
    Ok(success(boletos, "Boletos del usuario").into_response())
}

/// Operator-facing validation page; its script calls the JSON endpoint.
pub async fn validate_boleto_page(Path(id_boleto): Path<i64>) -> Html<String> {
    Html(VALIDATION_PAGE.replace("{{BOLETO_ID}}", &id_boleto.to_string()))
}

/// The redemption call. Every redemption outcome answers 200 with the
/// scanner's fixed JSON shape; only a store failure uses the error envelope.
pub async fn validate_boleto_api(
    State(state): State<AppState>,
    Path(id_boleto): Path<i64>,
) -> Result<Json<ValidationResponse>, AppError> {
    let outcome = redemption::redeem(&state.pool, id_boleto).await?;
    Ok(Json(ValidationResponse::from(outcome)))
}

/// Response shape for the scanning device. `status` echoes the stored status
/// after the attempt (`"error"` when no row exists).
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub message: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_concierto: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_compra: Option<NaiveDate>,
}

impl From<RedemptionOutcome> for ValidationResponse {
    fn from(outcome: RedemptionOutcome) -> Self {
        match outcome {
            RedemptionOutcome::NotFound => Self {
                valid: false,
                message: "Boleto no encontrado".to_string(),
                status: "error".to_string(),
                id_concierto: None,
                fecha_compra: None,
            },
            RedemptionOutcome::AlreadyRedeemed => Self {
                valid: false,
                message: "Este boleto ya ha sido canjeado".to_string(),
                status: "Canjeado".to_string(),
                id_concierto: None,
                fecha_compra: None,
            },
            RedemptionOutcome::NotApproved(status) => Self {
                valid: false,
                message: format!(
                    "Este boleto no está aprobado para su uso (Estado actual: {status})"
                ),
                status: status.to_string(),
                id_concierto: None,
                fecha_compra: None,
            },
            RedemptionOutcome::Redeemed {
                id_concierto,
                fecha_compra,
            } => Self {
                valid: true,
                message: "Boleto validado exitosamente".to_string(),
                status: "Canjeado".to_string(),
                id_concierto: Some(id_concierto),
                fecha_compra: Some(fecha_compra),
            },
        }
    }
}
