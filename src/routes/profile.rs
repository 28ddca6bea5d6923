use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;

use crate::{
    dto::{
        auth_dto::AccountResponse,
        profile_dto::{
            ExtractSkillsPayload, SkillsResponse, UpdateProfilePayload, UploadQuery,
            UploadResponse,
        },
    },
    error::Result,
    services::identity_service::Identity,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "The caller's profile", body = Json<AccountResponse>),
        (status = 401, description = "No session")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let account = state.account_service.profile(&identity).await?;
    Ok(Json(AccountResponse::from(account)))
}

#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<AccountResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let account = state
        .account_service
        .update_profile(&identity, payload)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

#[utoipa::path(
    post,
    path = "/api/upload-resume",
    params(
        ("filename" = Option<String>, Query, description = "Original file name; decides the accepted type")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Stored", body = Json<UploadResponse>),
        (status = 400, description = "Empty, oversized or unsupported file")
    )
)]
#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let filename = query.filename.unwrap_or_else(|| "resume.pdf".to_string());
    let url = state
        .storage_service
        .store_resume(identity.account_id, &filename, body)
        .await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}

#[utoipa::path(
    post,
    path = "/api/extract-skills",
    request_body = ExtractSkillsPayload,
    responses(
        (status = 200, description = "Skills extracted and saved to the profile", body = Json<SkillsResponse>),
        (status = 400, description = "Resume unreachable or unsupported"),
        (status = 500, description = "Model or configuration failure")
    )
)]
#[axum::debug_handler]
pub async fn extract_skills(
    State(state): State<AppState>,
    Extension(candidate): Extension<Identity>,
    Json(payload): Json<ExtractSkillsPayload>,
) -> Result<impl IntoResponse> {
    let skills = state.skill_service.extract(&candidate, payload).await?;
    Ok(Json(SkillsResponse { skills }))
}
