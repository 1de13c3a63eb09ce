use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Redemption lifecycle of a boleto.
///
/// The only legal transitions are `verifying -> aprobado` (payment
/// confirmation, performed outside this service) and `aprobado -> Canjeado`
/// (redemption at the venue entrance). `Canjeado` is terminal. The wire and
/// column spellings are inherited from the existing database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoletoStatus {
    #[serde(rename = "verifying")]
    Verifying,
    #[serde(rename = "aprobado")]
    Aprobado,
    #[serde(rename = "Canjeado")]
    Canjeado,
}

impl BoletoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoletoStatus::Verifying => "verifying",
            BoletoStatus::Aprobado => "aprobado",
            BoletoStatus::Canjeado => "Canjeado",
        }
    }
}

impl fmt::Display for BoletoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for BoletoStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "verifying" => Ok(BoletoStatus::Verifying),
            "aprobado" => Ok(BoletoStatus::Aprobado),
            "Canjeado" => Ok(BoletoStatus::Canjeado),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// A status value outside the closed enumeration. The migration's CHECK
/// constraint prevents these from being stored; hitting this during row
/// decoding means the schema and the code disagree.
#[derive(Debug, thiserror::Error)]
#[error("unknown boleto status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Boleto {
    pub id_boleto: i64,
    pub id_concierto: i64,
    pub id_usuario: Option<String>,
    pub id_localidad: i64,
    pub fecha_compra: NaiveDate,
    pub hora_compra: NaiveTime,
    pub precio_final: Decimal,
    pub cantidad_boletos: i32,
    #[sqlx(try_from = "String")]
    pub status: BoletoStatus,
    pub session_id: Option<String>,
    /// PNG data URI of the QR code, null until the artifact is generated.
    pub qr_imagen: Option<String>,
}

/// Purchase request body. Range checks happen at the handler boundary;
/// everything past it trusts these invariants.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoletoRequest {
    pub id_concierto: i64,
    pub id_localidad: i64,
    pub cantidad_boletos: i32,
    pub precio_final: Decimal,
    pub session_id: Option<String>,
}
