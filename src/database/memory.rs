//! In-process store used by the test suite and when no `DATABASE_URL` is configured.
//! Mirrors the Postgres constraints: unique account email, one application per
//! candidate and job, cascading job deletes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{Account, AccountSummary, NewAccount, OwnerSummary, ProfileChanges};
use crate::models::application::{
    ApplicantListItem, Application, ApplicationDetail, ApplicationStatus, ApplicationWithJob,
    NewApplication,
};
use crate::models::interview::{
    Interview, InterviewApplicant, InterviewJob, InterviewListItem, InterviewStatus, NewInterview,
};
use crate::models::job::{
    Job, JobDetail, JobFields, JobStatus, JobSummary, JobWithApplicationFlag,
};
use crate::utils::time::now;

use super::repository::{
    AccountRepository, ApplicationRepository, InterviewRepository, JobRepository,
};

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    interviews: Vec<Interview>,
}

impl Tables {
    fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

/// Rows are kept in insertion order, so newest-first is a reverse walk. Ties on the
/// timestamp keep that order because the sort is stable.
fn newest_first<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.reverse();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Err(Error::Conflict(
                "A user with this email already exists!".to_string(),
            ));
        }
        let row = Account {
            id: Uuid::new_v4(),
            email: account.email,
            name: account.name,
            phone: account.phone,
            password_hash: account.password_hash,
            role: account.role,
            company: account.company,
            skills: None,
            image: None,
            created_at: now(),
        };
        tables.accounts.push(row.clone());
        Ok(row)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.tables.read().await.account(id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<Account>> {
        let mut tables = self.tables.write().await;
        let Some(account) = tables.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            account.name = name;
        }
        if let Some(phone) = changes.phone {
            account.phone = Some(phone);
        }
        if let Some(image) = changes.image {
            account.image = Some(image);
        }
        if let Some(skills) = changes.skills {
            account.skills = Some(skills);
        }
        Ok(Some(account.clone()))
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert_job(&self, owner: Uuid, fields: JobFields) -> Result<Job> {
        let mut tables = self.tables.write().await;
        if tables.account(owner).is_none() {
            return Err(Error::NotFound("Account not found".to_string()));
        }
        let created_at = now();
        let job = Job {
            id: Uuid::new_v4(),
            title: fields.title,
            num_openings: fields.num_openings,
            min_salary: fields.min_salary,
            max_salary: fields.max_salary,
            work_mode: fields.work_mode,
            description: fields.description,
            deadline: Some(fields.deadline),
            status: fields.status,
            posted_by: owner,
            created_at,
            updated_at: created_at,
        };
        tables.jobs.push(job.clone());
        Ok(job)
    }

    async fn jobs_by_owner(&self, owner: Uuid) -> Result<Vec<Job>> {
        let tables = self.tables.read().await;
        let jobs = tables
            .jobs
            .iter()
            .filter(|j| j.posted_by == owner)
            .cloned()
            .collect();
        Ok(newest_first(jobs, |j| j.created_at))
    }

    async fn open_jobs_for_candidate(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobWithApplicationFlag>> {
        let tables = self.tables.read().await;
        let open = tables
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active)
            .filter(|j| j.accepts_applications_at(now))
            .map(|job| {
                let status = tables
                    .applications
                    .iter()
                    .find(|a| a.job_id == job.id && a.user_id == user_id)
                    .map(|a| a.status);
                JobWithApplicationFlag {
                    job: job.clone(),
                    has_applied: status.is_some(),
                    user_application_status: status,
                }
            })
            .collect();
        Ok(newest_first(open, |row| row.job.created_at))
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.tables.read().await.job(id).cloned())
    }

    async fn find_job_detail(&self, id: Uuid) -> Result<Option<JobDetail>> {
        let tables = self.tables.read().await;
        let Some(job) = tables.job(id) else {
            return Ok(None);
        };
        let Some(owner) = tables.account(job.posted_by) else {
            return Ok(None);
        };
        Ok(Some(JobDetail {
            job: job.clone(),
            posted_by_account: OwnerSummary::from(owner),
        }))
    }

    async fn update_owned_job(
        &self,
        id: Uuid,
        owner: Uuid,
        fields: JobFields,
    ) -> Result<Option<Job>> {
        let mut tables = self.tables.write().await;
        let Some(job) = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == id && j.posted_by == owner)
        else {
            return Ok(None);
        };
        job.title = fields.title;
        job.num_openings = fields.num_openings;
        job.min_salary = fields.min_salary;
        job.max_salary = fields.max_salary;
        job.work_mode = fields.work_mode;
        job.description = fields.description;
        job.deadline = Some(fields.deadline);
        job.status = fields.status;
        job.updated_at = now();
        Ok(Some(job.clone()))
    }

    async fn delete_owned_job(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.jobs.len();
        tables.jobs.retain(|j| !(j.id == id && j.posted_by == owner));
        if tables.jobs.len() == before {
            return Ok(false);
        }
        tables.applications.retain(|a| a.job_id != id);
        tables.interviews.retain(|i| i.job_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let mut tables = self.tables.write().await;
        if tables.job(application.job_id).is_none() {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        if tables
            .applications
            .iter()
            .any(|a| a.user_id == application.user_id && a.job_id == application.job_id)
        {
            return Err(Error::Conflict(
                "You have already applied for this job.".to_string(),
            ));
        }
        let applied_at = now();
        let row = Application {
            id: Uuid::new_v4(),
            user_id: application.user_id,
            job_id: application.job_id,
            full_name: application.full_name,
            contact_email: application.contact_email,
            phone_number: application.phone_number,
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            status: ApplicationStatus::Applied,
            applied_at,
            updated_at: applied_at,
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn applications_for_candidate(&self, user_id: Uuid) -> Result<Vec<ApplicationWithJob>> {
        let tables = self.tables.read().await;
        let rows = tables
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                tables.job(a.job_id).map(|job| ApplicationWithJob {
                    application: a.clone(),
                    job: JobSummary::from(job),
                })
            })
            .collect();
        Ok(newest_first(rows, |row| row.application.applied_at))
    }

    async fn applicants_for_owner(&self, owner: Uuid) -> Result<Vec<ApplicantListItem>> {
        let tables = self.tables.read().await;
        let rows = tables
            .applications
            .iter()
            .filter_map(|a| {
                let job = tables.job(a.job_id).filter(|j| j.posted_by == owner)?;
                let user = tables.account(a.user_id)?;
                Some(ApplicantListItem {
                    application: a.clone(),
                    user: AccountSummary::from(user),
                    job: JobSummary::from(job),
                })
            })
            .collect();
        Ok(newest_first(rows, |row| row.application.applied_at))
    }

    async fn application_detail_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<ApplicationDetail>> {
        let tables = self.tables.read().await;
        let detail = tables
            .applications
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| {
                let job = tables.job(a.job_id).filter(|j| j.posted_by == owner)?;
                let user = tables.account(a.user_id)?;
                let poster = tables.account(job.posted_by)?;
                Some(ApplicationDetail {
                    application: a.clone(),
                    user: AccountSummary::from(user),
                    job: JobSummary::from(job),
                    posted_by: OwnerSummary::from(poster),
                })
            });
        Ok(detail)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let mut tables = self.tables.write().await;
        let Some(application) = tables.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        application.status = status;
        application.updated_at = now();
        Ok(Some(application.clone()))
    }
}

#[async_trait]
impl InterviewRepository for MemoryStore {
    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let mut tables = self.tables.write().await;
        if !tables
            .applications
            .iter()
            .any(|a| a.id == interview.application_id)
        {
            return Err(Error::NotFound("Application not found".to_string()));
        }
        let row = Interview {
            id: Uuid::new_v4(),
            application_id: interview.application_id,
            job_id: interview.job_id,
            interview_date: interview.interview_date,
            interview_time: interview.interview_time,
            starts_at: interview.starts_at,
            ends_at: interview.ends_at,
            interview_type: interview.interview_type,
            status: InterviewStatus::Scheduled,
            meet_link: interview.meet_link,
            notes: interview.notes,
            scheduled_by: interview.scheduled_by,
            created_at: now(),
        };
        tables.interviews.push(row.clone());
        Ok(row)
    }

    async fn interviews_for_hr(&self, hr: Uuid) -> Result<Vec<InterviewListItem>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<InterviewListItem> = tables
            .interviews
            .iter()
            .filter_map(|i| {
                let job = tables.job(i.job_id)?;
                if i.scheduled_by != hr && job.posted_by != hr {
                    return None;
                }
                let application = tables
                    .applications
                    .iter()
                    .find(|a| a.id == i.application_id)?;
                Some(InterviewListItem {
                    interview: i.clone(),
                    applicant: InterviewApplicant {
                        id: application.id,
                        full_name: application.full_name.clone(),
                        contact_email: application.contact_email.clone(),
                    },
                    job: InterviewJob {
                        id: job.id,
                        title: job.title.clone(),
                        work_mode: job.work_mode.clone(),
                    },
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.interview.interview_date, a.interview.starts_at)
                .cmp(&(b.interview.interview_date, b.interview.starts_at))
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Role;
    use chrono::Duration;
    use rust_decimal::Decimal;

    async fn account(store: &MemoryStore, email: &str, role: Role) -> Account {
        store
            .create_account(NewAccount {
                email: email.to_string(),
                name: "Test Person".to_string(),
                phone: None,
                password_hash: None,
                role,
                company: None,
            })
            .await
            .unwrap()
    }

    fn fields(title: &str) -> JobFields {
        JobFields {
            title: title.to_string(),
            num_openings: 1,
            min_salary: Decimal::new(50_000, 0),
            max_salary: Decimal::new(90_000, 0),
            work_mode: "remote".to_string(),
            description: "Build things".to_string(),
            deadline: now() + Duration::days(7),
            status: JobStatus::Active,
        }
    }

    fn application_for(user: Uuid, job: Uuid) -> NewApplication {
        NewApplication {
            user_id: user,
            job_id: job,
            full_name: "Test Person".to_string(),
            contact_email: "cand@example.com".to_string(),
            phone_number: None,
            cover_letter: None,
            resume_url: "https://files.example.com/cv.pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::default();
        account(&store, "hr@example.com", Role::Hr).await;
        let err = store
            .create_account(NewAccount {
                email: "hr@example.com".to_string(),
                name: "Other".to_string(),
                phone: None,
                password_hash: None,
                role: Role::User,
                company: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn second_application_to_same_job_conflicts() {
        let store = MemoryStore::default();
        let hr = account(&store, "hr@example.com", Role::Hr).await;
        let cand = account(&store, "cand@example.com", Role::User).await;
        let job = store.insert_job(hr.id, fields("Engineer")).await.unwrap();

        store
            .insert_application(application_for(cand.id, job.id))
            .await
            .unwrap();
        let err = store
            .insert_application(application_for(cand.id, job.id))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn owner_scoped_writes_and_cascade() {
        let store = MemoryStore::default();
        let hr = account(&store, "hr@example.com", Role::Hr).await;
        let other = account(&store, "other@example.com", Role::Hr).await;
        let cand = account(&store, "cand@example.com", Role::User).await;
        let job = store.insert_job(hr.id, fields("Engineer")).await.unwrap();
        store
            .insert_application(application_for(cand.id, job.id))
            .await
            .unwrap();

        assert!(store
            .update_owned_job(job.id, other.id, fields("Hijacked"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_owned_job(job.id, other.id).await.unwrap());
        assert!(store.applicants_for_owner(other.id).await.unwrap().is_empty());

        assert!(store.delete_owned_job(job.id, hr.id).await.unwrap());
        assert!(store
            .applications_for_candidate(cand.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = MemoryStore::default();
        let hr = account(&store, "hr@example.com", Role::Hr).await;
        store.insert_job(hr.id, fields("First")).await.unwrap();
        store.insert_job(hr.id, fields("Second")).await.unwrap();

        let titles: Vec<_> = store
            .jobs_by_owner(hr.id)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }
}
