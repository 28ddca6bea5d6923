use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationPayload {
    #[validate(required(message = "jobId is required"))]
    pub job_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    pub contact_email: String,
    pub phone_number: Option<String>,
    pub cover_letter: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Resume URL is required"))]
    pub resume_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusPayload {
    #[serde(default)]
    pub status: String,
}
