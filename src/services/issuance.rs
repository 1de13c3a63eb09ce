//! Boleto issuance: persist the purchase, then bind the QR artifact to it.

use chrono::Local;
use sqlx::PgPool;

use crate::models::{Boleto, CreateBoletoRequest};
use crate::qr;
use crate::repositories::{BoletoRepo, CreateBoleto};
use crate::utils::error::AppError;

/// Issue a new boleto for `owner_sub`.
///
/// The row is inserted first (status `verifying`, purchase date and time
/// taken from the local clock), then the validation URL built from the
/// server-assigned id is encoded and attached. A failure after the insert
/// surfaces as [`AppError::ArtifactGeneration`] carrying the id, so the
/// caller can retry artifact generation without issuing a second boleto.
pub async fn issue(
    pool: &PgPool,
    validation_base_url: &str,
    owner_sub: &str,
    request: &CreateBoletoRequest,
) -> Result<Boleto, AppError> {
    let now = Local::now();
    let draft = CreateBoleto {
        id_concierto: request.id_concierto,
        id_usuario: Some(owner_sub.to_string()),
        id_localidad: request.id_localidad,
        fecha_compra: now.date_naive(),
        hora_compra: now.time(),
        precio_final: request.precio_final,
        cantidad_boletos: request.cantidad_boletos,
        session_id: request.session_id.clone(),
    };

    let created = BoletoRepo::create(pool, &draft).await?;
    tracing::info!(id_boleto = created.id_boleto, "Boleto created");

    let validation_url = build_validation_url(validation_base_url, created.id_boleto);
    let qr_imagen =
        qr::encode_validation_url(&validation_url).map_err(|e| AppError::ArtifactGeneration {
            id_boleto: created.id_boleto,
            reason: e.to_string(),
        })?;

    BoletoRepo::attach_qr(pool, created.id_boleto, &qr_imagen)
        .await
        .map_err(|e| AppError::ArtifactGeneration {
            id_boleto: created.id_boleto,
            reason: e.to_string(),
        })?;

    let complete = BoletoRepo::find_by_id(pool, created.id_boleto)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Boleto {} desapareció tras su creación", created.id_boleto))
        })?;
    Ok(complete)
}

/// The URL a scanner is sent to; the final path segment is the boleto id.
pub fn build_validation_url(base_url: &str, id_boleto: i64) -> String {
    format!(
        "{}/api/boletos/validate/{id_boleto}",
        base_url.trim_end_matches('/')
    )
}
