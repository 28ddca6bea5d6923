use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{Account, AccountSummary, NewAccount, OwnerSummary, ProfileChanges};
use crate::models::application::{
    ApplicantListItem, Application, ApplicationDetail, ApplicationStatus, ApplicationWithJob,
    NewApplication,
};
use crate::models::interview::{
    Interview, InterviewApplicant, InterviewJob, InterviewListItem, NewInterview,
};
use crate::models::job::{Job, JobDetail, JobFields, JobSummary, JobWithApplicationFlag};

use super::repository::{
    AccountRepository, ApplicationRepository, InterviewRepository, JobRepository,
};

const ACCOUNT_COLUMNS: &[&str] = &[
    "id", "email", "name", "phone", "password_hash", "role", "company", "skills", "image",
    "created_at",
];
const JOB_COLUMNS: &[&str] = &[
    "id", "title", "num_openings", "min_salary", "max_salary", "work_mode", "description",
    "deadline", "status", "posted_by", "created_at", "updated_at",
];
const APPLICATION_COLUMNS: &[&str] = &[
    "id", "user_id", "job_id", "full_name", "contact_email", "phone_number", "cover_letter",
    "resume_url", "status", "applied_at", "updated_at",
];
const INTERVIEW_COLUMNS: &[&str] = &[
    "id", "application_id", "job_id", "interview_date", "interview_time", "starts_at",
    "ends_at", "interview_type", "status", "meet_link", "notes", "scheduled_by", "created_at",
];

fn columns(alias: &str, cols: &[&str]) -> String {
    cols.iter()
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct OpenJobRow {
    #[sqlx(flatten)]
    job: Job,
    application_status: Option<String>,
}

#[derive(FromRow)]
struct JobDetailRow {
    #[sqlx(flatten)]
    job: Job,
    owner_name: String,
    owner_email: String,
    owner_company: Option<String>,
}

#[derive(FromRow)]
struct ApplicationJobRow {
    #[sqlx(flatten)]
    application: Application,
    job_title: String,
    job_work_mode: String,
    job_min_salary: Decimal,
    job_max_salary: Decimal,
    job_deadline: Option<DateTime<Utc>>,
}

impl ApplicationJobRow {
    fn job_summary(&self) -> JobSummary {
        JobSummary {
            id: self.application.job_id,
            title: self.job_title.clone(),
            work_mode: self.job_work_mode.clone(),
            min_salary: self.job_min_salary,
            max_salary: self.job_max_salary,
            deadline: self.job_deadline,
        }
    }
}

#[derive(FromRow)]
struct ApplicantRow {
    #[sqlx(flatten)]
    base: ApplicationJobRow,
    user_name: String,
    user_email: String,
    user_phone: Option<String>,
}

impl ApplicantRow {
    fn user_summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.base.application.user_id,
            name: self.user_name.clone(),
            email: self.user_email.clone(),
            phone: self.user_phone.clone(),
        }
    }
}

#[derive(FromRow)]
struct ApplicantDetailRow {
    #[sqlx(flatten)]
    applicant: ApplicantRow,
    owner_id: Uuid,
    owner_name: String,
    owner_email: String,
    owner_company: Option<String>,
}

#[derive(FromRow)]
struct InterviewRow {
    #[sqlx(flatten)]
    interview: Interview,
    applicant_full_name: String,
    applicant_contact_email: String,
    job_title: String,
    job_work_mode: String,
}

const APPLICATION_JOB_JOIN_EXTRAS: &str = "j.title AS job_title, j.work_mode AS job_work_mode, \
     j.min_salary AS job_min_salary, j.max_salary AS job_max_salary, j.deadline AS job_deadline";

#[async_trait]
impl AccountRepository for PgStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let query = format!(
            "INSERT INTO accounts (email, name, phone, password_hash, role, company)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            ACCOUNT_COLUMNS.join(", ")
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&account.email)
            .bind(&account.name)
            .bind(&account.phone)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .bind(&account.company)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match Error::from(err) {
                Error::Conflict(_) => {
                    Error::Conflict("A user with this email already exists!".to_string())
                }
                other => other,
            })
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>> {
        let query = format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS.join(", ")
        );
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let query = format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS.join(", ")
        );
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<Account>> {
        let query = format!(
            "UPDATE accounts
             SET name = COALESCE($2, name),
                 phone = COALESCE($3, phone),
                 image = COALESCE($4, image),
                 skills = COALESCE($5, skills)
             WHERE id = $1
             RETURNING {}",
            ACCOUNT_COLUMNS.join(", ")
        );
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.phone)
            .bind(changes.image)
            .bind(changes.skills)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }
}

#[async_trait]
impl JobRepository for PgStore {
    async fn insert_job(&self, owner: Uuid, fields: JobFields) -> Result<Job> {
        let query = format!(
            "INSERT INTO jobs (
                title, num_openings, min_salary, max_salary, work_mode,
                description, deadline, status, posted_by
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            JOB_COLUMNS.join(", ")
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(&fields.title)
            .bind(fields.num_openings)
            .bind(fields.min_salary)
            .bind(fields.max_salary)
            .bind(&fields.work_mode)
            .bind(&fields.description)
            .bind(fields.deadline)
            .bind(fields.status.as_str())
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    async fn jobs_by_owner(&self, owner: Uuid) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE posted_by = $1 ORDER BY created_at DESC",
            JOB_COLUMNS.join(", ")
        );
        let jobs = sqlx::query_as::<_, Job>(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn open_jobs_for_candidate(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobWithApplicationFlag>> {
        let query = format!(
            "SELECT {}, a.status AS application_status
             FROM jobs j
             LEFT JOIN applications a ON a.job_id = j.id AND a.user_id = $1
             WHERE j.status = 'active' AND (j.deadline IS NULL OR j.deadline >= $2)
             ORDER BY j.created_at DESC",
            columns("j", JOB_COLUMNS)
        );
        let rows = sqlx::query_as::<_, OpenJobRow>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let status = row
                    .application_status
                    .map(|s| s.parse::<ApplicationStatus>())
                    .transpose()
                    .map_err(|e| Error::Internal(e.to_string()))?;
                Ok(JobWithApplicationFlag {
                    job: row.job,
                    has_applied: status.is_some(),
                    user_application_status: status,
                })
            })
            .collect()
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS.join(", "));
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn find_job_detail(&self, id: Uuid) -> Result<Option<JobDetail>> {
        let query = format!(
            "SELECT {}, o.name AS owner_name, o.email AS owner_email, o.company AS owner_company
             FROM jobs j
             JOIN accounts o ON o.id = j.posted_by
             WHERE j.id = $1",
            columns("j", JOB_COLUMNS)
        );
        let row = sqlx::query_as::<_, JobDetailRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| JobDetail {
            posted_by_account: OwnerSummary {
                id: row.job.posted_by,
                name: row.owner_name,
                email: row.owner_email,
                company: row.owner_company,
            },
            job: row.job,
        }))
    }

    async fn update_owned_job(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: JobFields,
    ) -> Result<Option<Job>> {
        let query = format!(
            "UPDATE jobs
             SET title = $3,
                 num_openings = $4,
                 min_salary = $5,
                 max_salary = $6,
                 work_mode = $7,
                 description = $8,
                 deadline = $9,
                 status = $10,
                 updated_at = NOW()
             WHERE id = $1 AND posted_by = $2
             RETURNING {}",
            JOB_COLUMNS.join(", ")
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(owner)
            .bind(&fields.title)
            .bind(fields.num_openings)
            .bind(fields.min_salary)
            .bind(fields.max_salary)
            .bind(&fields.work_mode)
            .bind(&fields.description)
            .bind(fields.deadline)
            .bind(fields.status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn delete_owned_job(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1 AND posted_by = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let query = format!(
            "INSERT INTO applications (
                user_id, job_id, full_name, contact_email, phone_number,
                cover_letter, resume_url, status
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'applied')
             RETURNING {}",
            APPLICATION_COLUMNS.join(", ")
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(application.user_id)
            .bind(application.job_id)
            .bind(&application.full_name)
            .bind(&application.contact_email)
            .bind(&application.phone_number)
            .bind(&application.cover_letter)
            .bind(&application.resume_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::Conflict("You have already applied for this job.".to_string())
                }
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    Error::NotFound("Job not found".to_string())
                }
                other => Error::from(other),
            })
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS.join(", ")
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }

    async fn applications_for_candidate(&self, user_id: Uuid) -> Result<Vec<ApplicationWithJob>> {
        let query = format!(
            "SELECT {}, {}
             FROM applications a
             JOIN jobs j ON j.id = a.job_id
             WHERE a.user_id = $1
             ORDER BY a.applied_at DESC",
            columns("a", APPLICATION_COLUMNS),
            APPLICATION_JOB_JOIN_EXTRAS
        );
        let rows = sqlx::query_as::<_, ApplicationJobRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| ApplicationWithJob {
                job: row.job_summary(),
                application: row.application,
            })
            .collect())
    }

    async fn applicants_for_owner(&self, owner: Uuid) -> Result<Vec<ApplicantListItem>> {
        let query = format!(
            "SELECT {}, {},
                    u.name AS user_name, u.email AS user_email, u.phone AS user_phone
             FROM applications a
             JOIN jobs j ON j.id = a.job_id
             JOIN accounts u ON u.id = a.user_id
             WHERE j.posted_by = $1
             ORDER BY a.applied_at DESC",
            columns("a", APPLICATION_COLUMNS),
            APPLICATION_JOB_JOIN_EXTRAS
        );
        let rows = sqlx::query_as::<_, ApplicantRow>(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| ApplicantListItem {
                user: row.user_summary(),
                job: row.base.job_summary(),
                application: row.base.application,
            })
            .collect())
    }

    async fn application_detail_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<ApplicationDetail>> {
        let query = format!(
            "SELECT {}, {},
                    u.name AS user_name, u.email AS user_email, u.phone AS user_phone,
                    o.id AS owner_id, o.name AS owner_name, o.email AS owner_email,
                    o.company AS owner_company
             FROM applications a
             JOIN jobs j ON j.id = a.job_id
             JOIN accounts u ON u.id = a.user_id
             JOIN accounts o ON o.id = j.posted_by
             WHERE a.id = $1 AND j.posted_by = $2",
            columns("a", APPLICATION_COLUMNS),
            APPLICATION_JOB_JOIN_EXTRAS
        );
        let row = sqlx::query_as::<_, ApplicantDetailRow>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| ApplicationDetail {
            user: row.applicant.user_summary(),
            job: row.applicant.base.job_summary(),
            posted_by: OwnerSummary {
                id: row.owner_id,
                name: row.owner_name,
                email: row.owner_email,
                company: row.owner_company,
            },
            application: row.applicant.base.application,
        }))
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let query = format!(
            "UPDATE applications SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            APPLICATION_COLUMNS.join(", ")
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }
}

#[async_trait]
impl InterviewRepository for PgStore {
    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let query = format!(
            "INSERT INTO interviews (
                application_id, job_id, interview_date, interview_time, starts_at, ends_at,
                interview_type, status, meet_link, notes, scheduled_by
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'scheduled', $8, $9, $10)
             RETURNING {}",
            INTERVIEW_COLUMNS.join(", ")
        );
        let row = sqlx::query_as::<_, Interview>(&query)
            .bind(interview.application_id)
            .bind(interview.job_id)
            .bind(interview.interview_date)
            .bind(&interview.interview_time)
            .bind(interview.starts_at)
            .bind(interview.ends_at)
            .bind(&interview.interview_type)
            .bind(&interview.meet_link)
            .bind(&interview.notes)
            .bind(interview.scheduled_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn interviews_for_hr(&self, hr: Uuid) -> Result<Vec<InterviewListItem>> {
        let query = format!(
            "SELECT {},
                    a.full_name AS applicant_full_name,
                    a.contact_email AS applicant_contact_email,
                    j.title AS job_title,
                    j.work_mode AS job_work_mode
             FROM interviews i
             JOIN applications a ON a.id = i.application_id
             JOIN jobs j ON j.id = i.job_id
             WHERE i.scheduled_by = $1 OR j.posted_by = $1
             ORDER BY i.interview_date ASC, i.starts_at ASC",
            columns("i", INTERVIEW_COLUMNS)
        );
        let rows = sqlx::query_as::<_, InterviewRow>(&query)
            .bind(hr)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| InterviewListItem {
                applicant: InterviewApplicant {
                    id: row.interview.application_id,
                    full_name: row.applicant_full_name,
                    contact_email: row.applicant_contact_email,
                },
                job: InterviewJob {
                    id: row.interview.job_id,
                    title: row.job_title,
                    work_mode: row.job_work_mode,
                },
                interview: row.interview,
            })
            .collect())
    }
}
