use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::{
    AppState,
    auth::{Issued, SESSION_COOKIE, SessionTicket},
    database::User,
    error::AppError,
    utils::{MessageResponse, hash_password, success_to_api_response},
};

use super::model::{SignInRequest, SignUpRequest, SignUpResponse};

/// Cookie 寿命与服务端会话剩余时间一致
fn session_cookie(ticket: &SessionTicket) -> Cookie<'static> {
    let remaining = ticket.expires_at.saturating_sub(Utc::now().timestamp()).max(0);
    Cookie::build((SESSION_COOKIE, ticket.session_id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(remaining))
        .build()
}

/// 令牌放在响应体里，会话只通过 Cookie 下发
fn credentials_response(issued: Issued, jar: CookieJar) -> Response {
    match issued {
        Issued::Tokens(pair) => success_to_api_response(pair).into_response(),
        Issued::Session(ticket) => {
            let jar = jar.add(session_cookie(&ticket));
            (jar, success_to_api_response(ticket)).into_response()
        }
    }
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    req.validate()?;

    let password_hash = hash_password(&req.password, state.config.bcrypt_cost)?;
    let user = User::new(req.username, password_hash);
    state.users.insert(&user).await?;

    Ok((
        StatusCode::CREATED,
        success_to_api_response(SignUpResponse {
            user_id: user.user_id.to_string(),
            username: user.username,
        }),
    ))
}

#[axum::debug_handler]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let issued = state
        .auth
        .sign_in(state.users.as_ref(), &req.username, &req.password)
        .await?;
    Ok(credentials_response(issued, jar))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let issued = state.auth.refresh(&headers).await?;
    Ok(credentials_response(issued, jar))
}

#[axum::debug_handler]
pub async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    state.auth.sign_out(&headers).await?;

    let jar = if jar.get(SESSION_COOKIE).is_some() {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    } else {
        jar
    };
    Ok((
        jar,
        success_to_api_response(MessageResponse {
            message: "Signed out",
        }),
    ))
}
