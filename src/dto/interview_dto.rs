use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::interview::Interview;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewPayload {
    #[validate(required(message = "applicantId is required"))]
    pub applicant_id: Option<Uuid>,
    #[validate(required(message = "jobId is required"))]
    pub job_id: Option<Uuid>,
    #[serde(default, alias = "interviewDate")]
    #[validate(length(min = 1, message = "Interview date is required"))]
    pub date: String,
    #[serde(default, alias = "interviewTime")]
    #[validate(length(min = 1, message = "Interview time is required"))]
    pub time: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Interview type is required"))]
    pub interview_type: String,
    pub notes: Option<String>,
}

/// Outcome of scheduling. The optional steps report what actually happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewResponse {
    pub interview: Interview,
    pub meet_link: String,
    pub calendar_event_created: bool,
    pub email_sent: bool,
}
