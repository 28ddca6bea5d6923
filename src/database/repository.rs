//! Storage seams. Every workflow service talks to the store through these traits so the
//! same rules (one application per candidate and job, owner-scoped job writes) hold for the
//! Postgres store and the in-process store alike.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::account::{Account, NewAccount, ProfileChanges};
use crate::models::application::{
    ApplicantListItem, Application, ApplicationDetail, ApplicationStatus, ApplicationWithJob,
    NewApplication,
};
use crate::models::interview::{Interview, InterviewListItem, NewInterview};
use crate::models::job::{Job, JobDetail, JobFields, JobWithApplicationFlag};

use super::memory::MemoryStore;
use super::postgres::PgStore;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account>;
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<Account>>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert_job(&self, owner: Uuid, fields: JobFields) -> Result<Job>;
    /// Newest first.
    async fn jobs_by_owner(&self, owner: Uuid) -> Result<Vec<Job>>;
    /// Active jobs still open at `now`, annotated with `user_id`'s application in one query.
    async fn open_jobs_for_candidate(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobWithApplicationFlag>>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>>;
    async fn find_job_detail(&self, id: Uuid) -> Result<Option<JobDetail>>;
    /// Touches nothing unless `owner` posted the job.
    async fn update_owned_job(&self, id: Uuid, owner: Uuid, fields: JobFields)
        -> Result<Option<Job>>;
    async fn delete_owned_job(&self, id: Uuid, owner: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Fails with `Conflict` when the candidate already applied to the job.
    async fn insert_application(&self, application: NewApplication) -> Result<Application>;
    async fn find_application(&self, id: Uuid) -> Result<Option<Application>>;
    async fn applications_for_candidate(&self, user_id: Uuid) -> Result<Vec<ApplicationWithJob>>;
    async fn applicants_for_owner(&self, owner: Uuid) -> Result<Vec<ApplicantListItem>>;
    async fn application_detail_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<ApplicationDetail>>;
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>>;
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview>;
    /// Interviews scheduled by `hr` or attached to jobs `hr` owns, by date then start time.
    async fn interviews_for_hr(&self, hr: Uuid) -> Result<Vec<InterviewListItem>>;
}

/// One handle per aggregate, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub interviews: Arc<dyn InterviewRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool)))
    }

    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::default()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AccountRepository + JobRepository + ApplicationRepository + InterviewRepository + 'static,
    {
        Self {
            accounts: store.clone(),
            jobs: store.clone(),
            applications: store.clone(),
            interviews: store,
        }
    }
}
