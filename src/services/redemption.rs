//! Single-use redemption of a boleto at the point of entry.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::BoletoStatus;
use crate::repositories::{BoletoRepo, StatusTransition};

/// What a redemption attempt found. Every variant is an expected outcome of
/// scanning a ticket, not an error: the scanning device gets a structured
/// answer in all of these cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    /// No boleto with that id exists.
    NotFound,
    /// The boleto was already consumed at the entrance.
    AlreadyRedeemed,
    /// The boleto is not yet cleared for entry; carries the status that
    /// blocked it (e.g. still `verifying` while payment confirms).
    NotApproved(BoletoStatus),
    /// This caller consumed the boleto.
    Redeemed {
        id_concierto: i64,
        fecha_compra: NaiveDate,
    },
}

/// Attempt to consume a boleto.
///
/// The transition `aprobado -> Canjeado` is delegated to the store's
/// conditional update, so when several scanners race on the same id exactly
/// one of them gets [`RedemptionOutcome::Redeemed`]; the rest observe
/// [`RedemptionOutcome::AlreadyRedeemed`]. Nothing is written for any other
/// outcome.
pub async fn redeem(pool: &PgPool, id_boleto: i64) -> Result<RedemptionOutcome, sqlx::Error> {
    let Some(boleto) = BoletoRepo::find_by_id(pool, id_boleto).await? else {
        return Ok(RedemptionOutcome::NotFound);
    };

    match boleto.status {
        BoletoStatus::Canjeado => Ok(RedemptionOutcome::AlreadyRedeemed),
        BoletoStatus::Aprobado => {
            let transition = BoletoRepo::transition_status(
                pool,
                id_boleto,
                &[BoletoStatus::Aprobado],
                BoletoStatus::Canjeado,
            )
            .await?;

            match transition {
                StatusTransition::Applied(redeemed) => {
                    tracing::info!(id_boleto, "Boleto canjeado");
                    Ok(RedemptionOutcome::Redeemed {
                        id_concierto: redeemed.id_concierto,
                        fecha_compra: redeemed.fecha_compra,
                    })
                }
                // A concurrent scan won the conditional write between our
                // read and this statement.
                StatusTransition::Rejected(_) | StatusTransition::NotFound => {
                    Ok(RedemptionOutcome::AlreadyRedeemed)
                }
            }
        }
        blocked => Ok(RedemptionOutcome::NotApproved(blocked)),
    }
}
