use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::account::OwnerSummary;
use super::application::ApplicationStatus;
use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
    Draft,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            "draft" => Ok(JobStatus::Draft),
            other => Err(UnknownVariant {
                kind: "job status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub num_openings: i32,
    pub min_salary: Decimal,
    pub max_salary: Decimal,
    pub work_mode: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Applications are accepted up to and including the deadline instant.
    pub fn accepts_applications_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline.map_or(true, |deadline| now <= deadline)
    }
}

/// Validated job fields, shared by create and update.
#[derive(Debug, Clone)]
pub struct JobFields {
    pub title: String,
    pub num_openings: i32,
    pub min_salary: Decimal,
    pub max_salary: Decimal,
    pub work_mode: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub work_mode: String,
    pub min_salary: Decimal,
    pub max_salary: Decimal,
    pub deadline: Option<DateTime<Utc>>,
}

impl From<&Job> for JobSummary {
    fn from(value: &Job) -> Self {
        Self {
            id: value.id,
            title: value.title.clone(),
            work_mode: value.work_mode.clone(),
            min_salary: value.min_salary,
            max_salary: value.max_salary,
            deadline: value.deadline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub posted_by_account: OwnerSummary,
}

/// An open job as a candidate sees it, with their own application state folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithApplicationFlag {
    #[serde(flatten)]
    pub job: Job,
    pub has_applied: bool,
    pub user_application_status: Option<ApplicationStatus>,
}
