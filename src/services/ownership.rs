//! Owner-facing boleto listing.

use sqlx::PgPool;

use crate::models::{Boleto, BoletoStatus};
use crate::repositories::BoletoRepo;

/// Statuses an owner sees in their own listing. Rows still `verifying`
/// stay invisible until payment confirms.
const VISIBLE_STATUSES: [BoletoStatus; 2] = [BoletoStatus::Aprobado, BoletoStatus::Canjeado];

pub async fn list_my_boletos(pool: &PgPool, owner_sub: &str) -> Result<Vec<Boleto>, sqlx::Error> {
    BoletoRepo::list_by_user_and_statuses(pool, owner_sub, &VISIBLE_STATUSES).await
}
