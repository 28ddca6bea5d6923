use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::application_dto::UpdateStatusPayload,
    error::Result,
    models::application::{ApplicantListItem, Application, ApplicationDetail},
    services::identity_service::Identity,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/hr/applicants",
    responses(
        (status = 200, description = "Applications to the caller's jobs", body = Json<Vec<ApplicantListItem>>)
    )
)]
#[axum::debug_handler]
pub async fn list_applicants(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let applicants = state.application_service.list_for_hr(&hr).await?;
    Ok(Json(applicants))
}

#[utoipa::path(
    get,
    path = "/api/hr/applicants/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Applicant detail", body = Json<ApplicationDetail>),
        (status = 404, description = "Applicant not found")
    )
)]
#[axum::debug_handler]
pub async fn get_applicant(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state.application_service.detail_for_hr(&hr, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/hr/applicants/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = Json<Application>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Applicant not found")
    )
)]
#[axum::debug_handler]
pub async fn update_applicant_status(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .update_status(&hr, id, payload)
        .await?;
    Ok(Json(application))
}
