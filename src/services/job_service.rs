use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::JobRepository;
use crate::dto::job_dto::JobPayload;
use crate::error::{Error, Result};
use crate::models::job::{Job, JobDetail, JobFields, JobWithApplicationFlag};
use crate::services::identity_service::Identity;
use crate::utils::time::{now, parse_deadline};
use crate::utils::validation::{add_field_error, validate_with};

const JOB_NOT_FOUND: &str = "Job not found";

#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    pub async fn create(&self, hr: &Identity, payload: JobPayload) -> Result<Job> {
        self.create_at(hr, payload, now()).await
    }

    pub async fn create_at(
        &self,
        hr: &Identity,
        payload: JobPayload,
        now: DateTime<Utc>,
    ) -> Result<Job> {
        let fields = job_fields(payload, now)?;
        let job = self.jobs.insert_job(hr.account_id, fields).await?;
        tracing::info!(job_id = %job.id, account_id = %hr.account_id, "job created");
        Ok(job)
    }

    pub async fn list_owned(&self, hr: &Identity) -> Result<Vec<Job>> {
        self.jobs.jobs_by_owner(hr.account_id).await
    }

    pub async fn list_open(&self, candidate: &Identity) -> Result<Vec<JobWithApplicationFlag>> {
        self.list_open_at(candidate, now()).await
    }

    pub async fn list_open_at(
        &self,
        candidate: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobWithApplicationFlag>> {
        self.jobs
            .open_jobs_for_candidate(candidate.account_id, now)
            .await
    }

    /// A single open job as the candidate listing shows it.
    pub async fn get_open(&self, candidate: &Identity, id: Uuid) -> Result<JobWithApplicationFlag> {
        self.list_open(candidate)
            .await?
            .into_iter()
            .find(|row| row.job.id == id)
            .ok_or_else(|| Error::NotFound(JOB_NOT_FOUND.to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Job> {
        self.jobs
            .find_job(id)
            .await?
            .ok_or_else(|| Error::NotFound(JOB_NOT_FOUND.to_string()))
    }

    /// Another account's job is reported exactly like a missing one.
    pub async fn get_owned(&self, hr: &Identity, id: Uuid) -> Result<JobDetail> {
        self.jobs
            .find_job_detail(id)
            .await?
            .filter(|detail| detail.job.posted_by == hr.account_id)
            .ok_or_else(|| Error::NotFound(JOB_NOT_FOUND.to_string()))
    }

    pub async fn update(&self, hr: &Identity, id: Uuid, payload: JobPayload) -> Result<Job> {
        self.update_at(hr, id, payload, now()).await
    }

    pub async fn update_at(
        &self,
        hr: &Identity,
        id: Uuid,
        payload: JobPayload,
        now: DateTime<Utc>,
    ) -> Result<Job> {
        let fields = job_fields(payload, now)?;
        let job = self
            .jobs
            .update_owned_job(id, hr.account_id, fields)
            .await?
            .ok_or_else(|| Error::NotFound(JOB_NOT_FOUND.to_string()))?;
        tracing::info!(job_id = %job.id, account_id = %hr.account_id, "job updated");
        Ok(job)
    }

    pub async fn delete(&self, hr: &Identity, id: Uuid) -> Result<()> {
        if !self.jobs.delete_owned_job(id, hr.account_id).await? {
            return Err(Error::NotFound(JOB_NOT_FOUND.to_string()));
        }
        tracing::info!(job_id = %id, account_id = %hr.account_id, "job deleted");
        Ok(())
    }
}

/// Validates a job body. The deadline's calendar date may not lie before `now`'s.
/// `minSalary <= maxSalary` is not cross-checked.
fn job_fields(payload: JobPayload, now: DateTime<Utc>) -> Result<JobFields> {
    let deadline = parse_deadline(&payload.deadline);
    validate_with(&payload, |errors| {
        if payload.title.trim().is_empty() && !payload.title.is_empty() {
            add_field_error(errors, "title", "length", "Title is required");
        }
        if payload.title.chars().any(char::is_control) {
            add_field_error(
                errors,
                "title",
                "characters",
                "Title cannot contain line breaks or control characters",
            );
        }
        if payload.min_salary < Decimal::ZERO {
            add_field_error(errors, "min_salary", "range", "minSalary cannot be negative");
        }
        if payload.max_salary < Decimal::ZERO {
            add_field_error(errors, "max_salary", "range", "maxSalary cannot be negative");
        }
        match deadline {
            None => add_field_error(
                errors,
                "deadline",
                "date",
                "Deadline must be a valid date (YYYY-MM-DD or RFC 3339)",
            ),
            Some(d) if d.date_naive() < now.date_naive() => {
                add_field_error(errors, "deadline", "date", "Deadline cannot be in the past")
            }
            Some(_) => {}
        }
    })?;

    let deadline = deadline.ok_or_else(|| Error::BadRequest("Invalid deadline".to_string()))?;
    Ok(JobFields {
        title: payload.title.trim().to_string(),
        num_openings: payload.num_openings,
        min_salary: payload.min_salary,
        max_salary: payload.max_salary,
        work_mode: payload.work_mode.trim().to_string(),
        description: payload.description,
        deadline,
        status: payload.status.unwrap_or_default(),
    })
}
