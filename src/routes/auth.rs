use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::auth_dto::{AccountResponse, HrSignupPayload, LoginPayload, LoginResponse, UserSignupPayload},
    error::Result,
    services::identity_service::{cleared_session_cookie_header, session_cookie_header},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/hr/signup",
    request_body = HrSignupPayload,
    responses(
        (status = 201, description = "HR account created", body = Json<AccountResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn hr_signup(
    State(state): State<AppState>,
    Json(payload): Json<HrSignupPayload>,
) -> Result<impl IntoResponse> {
    let account = state.account_service.signup_hr(payload).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

#[utoipa::path(
    post,
    path = "/api/user/signup",
    request_body = UserSignupPayload,
    responses(
        (status = 201, description = "Candidate account created", body = Json<AccountResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn user_signup(
    State(state): State<AppState>,
    Json(payload): Json<UserSignupPayload>,
) -> Result<impl IntoResponse> {
    let account = state.account_service.signup_user(payload).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session issued", body = Json<LoginResponse>),
        (status = 401, description = "Invalid credentials or role")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let (token, account) = state.account_service.login(payload).await?;
    let cookie = session_cookie_header(&token, state.account_service.session_ttl_seconds());
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token,
            account: AccountResponse::from(account),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
#[axum::debug_handler]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, cleared_session_cookie_header())],
        Json(json!({ "success": true })),
    )
}
