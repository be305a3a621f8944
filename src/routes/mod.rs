pub mod recipe;
pub mod user;


use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    AppState,
    config::AuthMode,
    middleware::{auth_middleware, log_errors},
    utils::{ApiResponse, success_to_api_response},
};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    auth_mode: String,
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    success_to_api_response(HealthResponse {
        status: "ok",
        auth_mode: state.auth.mode().to_string(),
    })
}

/// 构建完整路由。公开路由与受保护路由显式分开，鉴权中间件只挂在后者上
pub fn router(state: AppState) -> Router {
    let mut public_routes = Router::new().route("/health", get(health));

    if state.config.auth_mode != AuthMode::None {
        public_routes = public_routes
            .route("/signup", post(user::signup))
            .route("/signin", post(user::signin))
            .route("/signout", post(user::signout))
            .route("/refresh", post(user::refresh));
    }

    let mut protected_routes = Router::new()
        .route("/recipes", post(recipe::create_recipe))
        .route("/recipes/search", get(recipe::search_recipes))
        .route(
            "/recipes/{id}",
            get(recipe::get_recipe)
                .put(recipe::update_recipe)
                .delete(recipe::delete_recipe),
        );

    if state.config.protect_list {
        protected_routes = protected_routes.route("/recipes", get(recipe::list_recipes));
    } else {
        public_routes = public_routes.route("/recipes", get(recipe::list_recipes));
    }

    let protected_routes = protected_routes.route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let api = Router::new().merge(public_routes).merge(protected_routes);
    let router = if state.config.api_base_uri.is_empty() {
        api
    } else {
        Router::new().nest(&state.config.api_base_uri, api)
    };

    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 仅在调试构建中放开 CORS
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
