//! Persistence layer for the `boletos` table.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{Boleto, BoletoStatus};

/// Column list for boletos queries.
const BOLETO_COLUMNS: &str = "id_boleto, id_concierto, id_usuario, id_localidad, \
    fecha_compra, hora_compra, precio_final, cantidad_boletos, status, \
    session_id, qr_imagen";

/// Insert payload for a new boleto. The status column is not part of the
/// draft: every row starts as `verifying` no matter what the caller holds.
#[derive(Debug, Clone)]
pub struct CreateBoleto {
    pub id_concierto: i64,
    pub id_usuario: Option<String>,
    pub id_localidad: i64,
    pub fecha_compra: NaiveDate,
    pub hora_compra: NaiveTime,
    pub precio_final: Decimal,
    pub cantidad_boletos: i32,
    pub session_id: Option<String>,
}

/// Result of a conditional status transition.
#[derive(Debug)]
pub enum StatusTransition {
    /// The row's status was in the expected set and has been moved.
    Applied(Boleto),
    /// The row exists but its status was outside the expected set; carries
    /// the status observed after the refused write, for error reporting.
    Rejected(BoletoStatus),
    /// No row with that id.
    NotFound,
}

/// Provides the boleto lifecycle operations against the database.
pub struct BoletoRepo;

impl BoletoRepo {
    /// Insert a new boleto with status forced to `verifying`, returning the
    /// persisted row including the server-assigned id.
    pub async fn create(pool: &PgPool, input: &CreateBoleto) -> Result<Boleto, sqlx::Error> {
        let query = format!(
            "INSERT INTO boletos
                (id_concierto, id_usuario, id_localidad, fecha_compra, hora_compra,
                 precio_final, cantidad_boletos, status, session_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'verifying', $8)
             RETURNING {BOLETO_COLUMNS}"
        );
        sqlx::query_as::<_, Boleto>(&query)
            .bind(input.id_concierto)
            .bind(&input.id_usuario)
            .bind(input.id_localidad)
            .bind(input.fecha_compra)
            .bind(input.hora_compra)
            .bind(input.precio_final)
            .bind(input.cantidad_boletos)
            .bind(&input.session_id)
            .fetch_one(pool)
            .await
    }

    /// Store the generated QR data URI on an existing boleto.
    ///
    /// Returns [`sqlx::Error::RowNotFound`] when the id does not exist.
    pub async fn attach_qr(pool: &PgPool, id_boleto: i64, qr_imagen: &str) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE boletos SET qr_imagen = $1 WHERE id_boleto = $2")
            .bind(qr_imagen)
            .bind(id_boleto)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    /// Point lookup by id.
    pub async fn find_by_id(pool: &PgPool, id_boleto: i64) -> Result<Option<Boleto>, sqlx::Error> {
        let query = format!("SELECT {BOLETO_COLUMNS} FROM boletos WHERE id_boleto = $1");
        sqlx::query_as::<_, Boleto>(&query)
            .bind(id_boleto)
            .fetch_optional(pool)
            .await
    }

    /// All boletos of one owner whose status is in the given set, in
    /// purchase order.
    pub async fn list_by_user_and_statuses(
        pool: &PgPool,
        id_usuario: &str,
        statuses: &[BoletoStatus],
    ) -> Result<Vec<Boleto>, sqlx::Error> {
        let statuses: Vec<&str> = statuses.iter().map(BoletoStatus::as_str).collect();
        let query = format!(
            "SELECT {BOLETO_COLUMNS} FROM boletos
             WHERE id_usuario = $1 AND status = ANY($2)
             ORDER BY id_boleto"
        );
        sqlx::query_as::<_, Boleto>(&query)
            .bind(id_usuario)
            .bind(&statuses)
            .fetch_all(pool)
            .await
    }

    /// Atomically move a boleto to `new_status`, but only while its current
    /// status is in `expected`.
    ///
    /// The check and the write are one `UPDATE ... WHERE status = ANY(...)`
    /// statement, so of any number of concurrent callers racing on the same
    /// row at most one observes [`StatusTransition::Applied`]. A refused
    /// write re-reads the row to report the status that blocked it.
    pub async fn transition_status(
        pool: &PgPool,
        id_boleto: i64,
        expected: &[BoletoStatus],
        new_status: BoletoStatus,
    ) -> Result<StatusTransition, sqlx::Error> {
        let expected: Vec<&str> = expected.iter().map(BoletoStatus::as_str).collect();
        let query = format!(
            "UPDATE boletos SET status = $1
             WHERE id_boleto = $2 AND status = ANY($3)
             RETURNING {BOLETO_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Boleto>(&query)
            .bind(new_status.as_str())
            .bind(id_boleto)
            .bind(&expected)
            .fetch_optional(pool)
            .await?;

        if let Some(boleto) = updated {
            return Ok(StatusTransition::Applied(boleto));
        }

        match Self::find_by_id(pool, id_boleto).await? {
            Some(boleto) => Ok(StatusTransition::Rejected(boleto.status)),
            None => Ok(StatusTransition::NotFound),
        }
    }
}
