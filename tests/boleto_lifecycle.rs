//! Integration tests for the boleto lifecycle against a real database:
//! - Issuance (row creation, QR artifact binding)
//! - Status transitions (monotonic, conditional, atomic)
//! - Redemption outcomes, including the concurrent double-scan race
//! - Owner listings

use assert_matches::assert_matches;
use chrono::{Local, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::PgPool;

use conciertop_server::models::{BoletoStatus, CreateBoletoRequest};
use conciertop_server::repositories::{BoletoRepo, CreateBoleto, StatusTransition};
use conciertop_server::services::redemption::{self, RedemptionOutcome};
use conciertop_server::services::{issuance, ownership};

const VALIDATION_BASE_URL: &str = "http://localhost:8000";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_draft(id_usuario: &str) -> CreateBoleto {
    CreateBoleto {
        id_concierto: 5,
        id_usuario: Some(id_usuario.to_string()),
        id_localidad: 2,
        fecha_compra: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        hora_compra: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        precio_final: Decimal::new(15000, 2),
        cantidad_boletos: 2,
        session_id: None,
    }
}

fn new_request() -> CreateBoletoRequest {
    CreateBoletoRequest {
        id_concierto: 5,
        id_localidad: 2,
        cantidad_boletos: 2,
        precio_final: Decimal::new(15000, 2),
        session_id: Some("cs_test_abc123".to_string()),
    }
}

/// Payment confirmation, as the external process would perform it.
async fn approve(pool: &PgPool, id_boleto: i64) {
    let transition = BoletoRepo::transition_status(
        pool,
        id_boleto,
        &[BoletoStatus::Verifying],
        BoletoStatus::Aprobado,
    )
    .await
    .unwrap();
    assert_matches!(transition, StatusTransition::Applied(_));
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_forces_verifying_and_assigns_an_id(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();

    assert!(boleto.id_boleto > 0);
    assert_eq!(boleto.status, BoletoStatus::Verifying);
    assert_eq!(boleto.id_concierto, 5);
    assert_eq!(boleto.precio_final, Decimal::new(15000, 2));
    assert_eq!(boleto.qr_imagen, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn attach_qr_on_a_missing_id_is_row_not_found(pool: PgPool) {
    let result = BoletoRepo::attach_qr(&pool, 999_999, "data:image/png;base64,AAAA").await;
    assert_matches!(result, Err(sqlx::Error::RowNotFound));
}

#[sqlx::test(migrations = "./migrations")]
async fn transition_applies_only_from_an_expected_status(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();

    // aprobado -> Canjeado is refused while the row is still verifying.
    let refused = BoletoRepo::transition_status(
        &pool,
        boleto.id_boleto,
        &[BoletoStatus::Aprobado],
        BoletoStatus::Canjeado,
    )
    .await
    .unwrap();
    assert_matches!(refused, StatusTransition::Rejected(BoletoStatus::Verifying));

    approve(&pool, boleto.id_boleto).await;

    let applied = BoletoRepo::transition_status(
        &pool,
        boleto.id_boleto,
        &[BoletoStatus::Aprobado],
        BoletoStatus::Canjeado,
    )
    .await
    .unwrap();
    assert_matches!(
        applied,
        StatusTransition::Applied(ref b) if b.status == BoletoStatus::Canjeado
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn canjeado_is_terminal(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();
    approve(&pool, boleto.id_boleto).await;
    assert_matches!(
        redemption::redeem(&pool, boleto.id_boleto).await.unwrap(),
        RedemptionOutcome::Redeemed { .. }
    );

    // No path leads back out of Canjeado.
    let backward = BoletoRepo::transition_status(
        &pool,
        boleto.id_boleto,
        &[BoletoStatus::Verifying, BoletoStatus::Aprobado],
        BoletoStatus::Aprobado,
    )
    .await
    .unwrap();
    assert_matches!(backward, StatusTransition::Rejected(BoletoStatus::Canjeado));
}

#[sqlx::test(migrations = "./migrations")]
async fn transition_on_a_missing_id_reports_not_found(pool: PgPool) {
    let transition = BoletoRepo::transition_status(
        &pool,
        999_999,
        &[BoletoStatus::Aprobado],
        BoletoStatus::Canjeado,
    )
    .await
    .unwrap();
    assert_matches!(transition, StatusTransition::NotFound);
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn issue_returns_a_verifying_boleto_with_its_artifact(pool: PgPool) {
    let before = Local::now().date_naive();
    let boleto = issuance::issue(&pool, VALIDATION_BASE_URL, "user-1", &new_request())
        .await
        .unwrap();
    let after = Local::now().date_naive();

    assert!(boleto.id_boleto > 0);
    assert_eq!(boleto.status, BoletoStatus::Verifying);
    assert_eq!(boleto.id_usuario.as_deref(), Some("user-1"));
    assert_eq!(boleto.session_id.as_deref(), Some("cs_test_abc123"));
    assert!(boleto.fecha_compra >= before && boleto.fecha_compra <= after);

    let qr_imagen = boleto.qr_imagen.expect("artifact must be attached");
    assert!(qr_imagen.starts_with("data:image/png;base64,"));

    // The artifact is exactly the encoding of the validation URL for this id.
    let url = issuance::build_validation_url(VALIDATION_BASE_URL, boleto.id_boleto);
    assert_eq!(qr_imagen, conciertop_server::qr::encode_validation_url(&url).unwrap());

    // And it is persisted, not only returned.
    let stored = BoletoRepo::find_by_id(&pool, boleto.id_boleto)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.qr_imagen.as_deref(), Some(qr_imagen.as_str()));
}

// ---------------------------------------------------------------------------
// Redemption
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn redeeming_a_nonexistent_id_is_not_found(pool: PgPool) {
    let outcome = redemption::redeem(&pool, 999_999).await.unwrap();
    assert_eq!(outcome, RedemptionOutcome::NotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn redeeming_a_verifying_boleto_is_refused_without_a_write(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();

    let outcome = redemption::redeem(&pool, boleto.id_boleto).await.unwrap();
    assert_eq!(
        outcome,
        RedemptionOutcome::NotApproved(BoletoStatus::Verifying)
    );

    let stored = BoletoRepo::find_by_id(&pool, boleto.id_boleto)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BoletoStatus::Verifying);
}

#[sqlx::test(migrations = "./migrations")]
async fn one_success_then_already_redeemed(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();
    approve(&pool, boleto.id_boleto).await;

    let first = redemption::redeem(&pool, boleto.id_boleto).await.unwrap();
    assert_eq!(
        first,
        RedemptionOutcome::Redeemed {
            id_concierto: 5,
            fecha_compra: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    );

    let second = redemption::redeem(&pool, boleto.id_boleto).await.unwrap();
    assert_eq!(second, RedemptionOutcome::AlreadyRedeemed);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_scans_admit_exactly_one(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();
    approve(&pool, boleto.id_boleto).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let id_boleto = boleto.id_boleto;
        handles.push(tokio::spawn(async move {
            redemption::redeem(&pool, id_boleto).await.unwrap()
        }));
    }

    let mut redeemed = 0;
    let mut already = 0;
    for handle in handles {
        match handle.await.unwrap() {
            RedemptionOutcome::Redeemed { .. } => redeemed += 1,
            RedemptionOutcome::AlreadyRedeemed => already += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(redeemed, 1);
    assert_eq!(already, 7);
}

// ---------------------------------------------------------------------------
// Owner listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn verifying_boletos_are_invisible_to_their_owner(pool: PgPool) {
    let boleto = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();

    assert!(ownership::list_my_boletos(&pool, "user-1")
        .await
        .unwrap()
        .is_empty());

    approve(&pool, boleto.id_boleto).await;

    let listed = ownership::list_my_boletos(&pool, "user-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id_boleto, boleto.id_boleto);
    assert_eq!(listed[0].status, BoletoStatus::Aprobado);
}

#[sqlx::test(migrations = "./migrations")]
async fn listings_are_scoped_to_the_owner_and_keep_redeemed_rows(pool: PgPool) {
    let mine = BoletoRepo::create(&pool, &new_draft("user-1")).await.unwrap();
    let theirs = BoletoRepo::create(&pool, &new_draft("user-2")).await.unwrap();
    approve(&pool, mine.id_boleto).await;
    approve(&pool, theirs.id_boleto).await;

    assert_matches!(
        redemption::redeem(&pool, mine.id_boleto).await.unwrap(),
        RedemptionOutcome::Redeemed { .. }
    );

    let listed = ownership::list_my_boletos(&pool, "user-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, BoletoStatus::Canjeado);
}
