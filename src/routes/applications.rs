use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::application_dto::SubmitApplicationPayload,
    error::Result,
    models::application::{Application, ApplicationWithJob},
    services::identity_service::Identity,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = SubmitApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<Application>),
        (status = 400, description = "Invalid payload or deadline passed"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(candidate): Extension<Identity>,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.submit(&candidate, payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/user/applications",
    responses(
        (status = 200, description = "The caller's applications, newest first", body = Json<Vec<ApplicationWithJob>>)
    )
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(candidate): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_candidate(&candidate)
        .await?;
    Ok(Json(applications))
}
