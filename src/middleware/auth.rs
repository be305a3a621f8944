use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{AppState, auth::Authorizer, error::AppError};

/// 鉴权中间件，只挂在受保护的路由上。通过后把 `Identity` 放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match state.auth.authorize(request.headers()).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(
                "Rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                e
            );
            return Err(e);
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
