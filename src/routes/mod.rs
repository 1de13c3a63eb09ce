use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::handlers::boletos::{
    create_boleto, get_boletos_by_user, validate_boleto_api, validate_boleto_page,
};
use crate::handlers::health_check;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let boletos = Router::new()
        .route("/", post(create_boleto))
        .route("/by_current_user_id", get(get_boletos_by_user))
        .route("/validate/:id_boleto", get(validate_boleto_page))
        .route("/api/validate/:id_boleto", get(validate_boleto_api));

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/boletos", boletos)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}
