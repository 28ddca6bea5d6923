use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::interview_dto::{ScheduleInterviewPayload, ScheduleInterviewResponse},
    error::Result,
    models::interview::InterviewListItem,
    services::identity_service::Identity,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/hr/interviews",
    request_body = ScheduleInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled; calendar and email outcome reported", body = Json<ScheduleInterviewResponse>),
        (status = 400, description = "Missing or unparseable fields"),
        (status = 404, description = "Applicant or job not found")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    let scheduled = state.interview_service.schedule(&hr, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ScheduleInterviewResponse {
            meet_link: scheduled.meet_link.unwrap_or_default(),
            calendar_event_created: scheduled.calendar_event_created,
            email_sent: scheduled.email_sent,
            interview: scheduled.interview,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/hr/interviews",
    responses(
        (status = 200, description = "Interviews by date then time", body = Json<Vec<InterviewListItem>>)
    )
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(hr): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let interviews = state.interview_service.list_for_hr(&hr).await?;
    Ok(Json(interviews))
}
