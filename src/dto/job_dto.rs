use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job::JobStatus;

/// Body of both job create and job update. `deadline` is an RFC 3339 instant or `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    #[serde(default, alias = "jobTitle")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(range(min = 1, message = "numOpenings must be a positive integer"))]
    pub num_openings: i32,
    #[serde(default)]
    pub min_salary: Decimal,
    #[serde(default)]
    pub max_salary: Decimal,
    #[serde(default, alias = "jobMode")]
    #[validate(length(min = 1, message = "Work mode is required"))]
    pub work_mode: String,
    #[serde(default, alias = "jobDescription")]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub deadline: String,
    pub status: Option<JobStatus>,
}
