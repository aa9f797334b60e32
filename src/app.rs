use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/goals", get(handlers::list_goals).post(handlers::create_goal))
        .route(
            "/api/goals/:id",
            put(handlers::update_goal).delete(handlers::delete_goal),
        )
        .route("/api/goals/:id/outcome", post(handlers::score_goal))
        .route("/api/years", get(handlers::get_years))
        .route("/api/heatmap", get(handlers::get_heatmap))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route("/api/settings/theme/toggle", post(handlers::toggle_theme))
        .route("/api/session/sign-out", post(handlers::sign_out))
        .with_state(state)
}
