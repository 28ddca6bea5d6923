use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::job_dto::JobPayload,
    error::Result,
    models::job::{Job, JobDetail, JobWithApplicationFlag},
    services::identity_service::Identity,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/hr/jobs",
    request_body = JobPayload,
    responses(
        (status = 201, description = "Job created", body = Json<Job>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not an HR session")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Json(payload): Json<JobPayload>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.create(&hr, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/api/hr/jobs",
    responses(
        (status = 200, description = "Jobs posted by the caller, newest first", body = Json<Vec<Job>>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_owned(&hr).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/hr/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job with its owner", body = Json<JobDetail>),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state.job_service.get_owned(&hr, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/hr/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = JobPayload,
    responses(
        (status = 200, description = "Job updated", body = Json<Job>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobPayload>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.update(&hr, id, payload).await?;
    Ok(Json(job))
}

#[utoipa::path(
    delete,
    path = "/api/hr/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(&hr, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/user/jobs",
    responses(
        (status = 200, description = "Open jobs with the caller's application state", body = Json<Vec<JobWithApplicationFlag>>)
    )
)]
#[axum::debug_handler]
pub async fn list_open_jobs(
    State(state): State<AppState>,
    Extension(candidate): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_open(&candidate).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/user/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Open job", body = Json<JobWithApplicationFlag>),
        (status = 404, description = "Job not found or closed")
    )
)]
#[axum::debug_handler]
pub async fn get_open_job(
    State(state): State<AppState>,
    Extension(candidate): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_open(&candidate, id).await?;
    Ok(Json(job))
}
