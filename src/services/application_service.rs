use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::{ApplicationRepository, JobRepository};
use crate::dto::application_dto::{SubmitApplicationPayload, UpdateStatusPayload};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicantListItem, Application, ApplicationDetail, ApplicationStatus, ApplicationWithJob,
    NewApplication,
};
use crate::services::identity_service::Identity;
use crate::utils::time::now;
use crate::utils::validation::{add_field_error, is_basic_email, validate_with};

const APPLICANT_NOT_FOUND: &str = "Applicant not found";

#[derive(Clone)]
pub struct ApplicationService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl ApplicationService {
    pub fn new(jobs: Arc<dyn JobRepository>, applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { jobs, applications }
    }

    pub async fn submit(
        &self,
        candidate: &Identity,
        payload: SubmitApplicationPayload,
    ) -> Result<Application> {
        self.submit_at(candidate, payload, now()).await
    }

    /// Applying exactly at the deadline instant is still accepted.
    pub async fn submit_at(
        &self,
        candidate: &Identity,
        payload: SubmitApplicationPayload,
        now: DateTime<Utc>,
    ) -> Result<Application> {
        validate_with(&payload, |errors| {
            if !is_basic_email(payload.contact_email.trim()) {
                add_field_error(
                    errors,
                    "contact_email",
                    "email",
                    "A valid contact email is required",
                );
            }
        })?;
        let job_id = payload
            .job_id
            .ok_or_else(|| Error::BadRequest("jobId is required".to_string()))?;

        let job = self
            .jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        if !job.accepts_applications_at(now) {
            return Err(Error::DeadlinePassed);
        }

        let application = self
            .applications
            .insert_application(NewApplication {
                user_id: candidate.account_id,
                job_id,
                full_name: payload.full_name.trim().to_string(),
                contact_email: payload.contact_email.trim().to_string(),
                phone_number: non_blank(payload.phone_number),
                cover_letter: non_blank(payload.cover_letter),
                resume_url: payload.resume_url.trim().to_string(),
            })
            .await?;
        tracing::info!(
            application_id = %application.id,
            job_id = %job_id,
            account_id = %candidate.account_id,
            "application submitted"
        );
        Ok(application)
    }

    pub async fn list_for_candidate(&self, candidate: &Identity) -> Result<Vec<ApplicationWithJob>> {
        self.applications
            .applications_for_candidate(candidate.account_id)
            .await
    }

    pub async fn list_for_hr(&self, hr: &Identity) -> Result<Vec<ApplicantListItem>> {
        self.applications.applicants_for_owner(hr.account_id).await
    }

    pub async fn detail_for_hr(&self, hr: &Identity, id: Uuid) -> Result<ApplicationDetail> {
        self.applications
            .application_detail_for_owner(id, hr.account_id)
            .await?
            .ok_or_else(|| Error::NotFound(APPLICANT_NOT_FOUND.to_string()))
    }

    /// Any value of the status set is accepted regardless of the current stage or of who
    /// owns the job.
    pub async fn update_status(
        &self,
        hr: &Identity,
        id: Uuid,
        payload: UpdateStatusPayload,
    ) -> Result<Application> {
        let status = parse_status(&payload.status)?;
        self.set_status(id, status).await.map(|application| {
            tracing::info!(
                application_id = %id,
                status = %status,
                account_id = %hr.account_id,
                "application status updated"
            );
            application
        })
    }

    pub async fn set_status(&self, id: Uuid, status: ApplicationStatus) -> Result<Application> {
        self.applications
            .set_application_status(id, status)
            .await?
            .ok_or_else(|| Error::NotFound(APPLICANT_NOT_FOUND.to_string()))
    }
}

fn parse_status(raw: &str) -> Result<ApplicationStatus> {
    raw.trim().parse::<ApplicationStatus>().map_err(|_| {
        let mut errors = validator::ValidationErrors::new();
        let allowed = ApplicationStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        add_field_error(
            &mut errors,
            "status",
            "enum",
            format!("Status must be one of: {}", allowed),
        );
        Error::Validation(errors)
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repositories;
    use crate::models::account::{NewAccount, Role};
    use crate::models::job::{JobFields, JobStatus};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    struct Fixture {
        svc: ApplicationService,
        hr: Identity,
        other_hr: Identity,
        candidate: Identity,
        job_id: Uuid,
        deadline: DateTime<Utc>,
    }

    async fn account(repos: &Repositories, email: &str, role: Role) -> Identity {
        let account = repos
            .accounts
            .create_account(NewAccount {
                email: email.into(),
                name: "Someone".into(),
                phone: None,
                password_hash: None,
                role,
                company: None,
            })
            .await
            .unwrap();
        Identity::from(&account)
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::memory();
        let hr = account(&repos, "hr@acme.test", Role::Hr).await;
        let other_hr = account(&repos, "hr2@acme.test", Role::Hr).await;
        let candidate = account(&repos, "cand@mail.test", Role::User).await;
        let deadline = Utc.with_ymd_and_hms(2026, 10, 20, 18, 0, 0).unwrap();
        let job = repos
            .jobs
            .insert_job(
                hr.account_id,
                JobFields {
                    title: "Data Engineer".into(),
                    num_openings: 1,
                    min_salary: Decimal::ZERO,
                    max_salary: Decimal::new(100, 0),
                    work_mode: "remote".into(),
                    description: "Pipelines".into(),
                    deadline,
                    status: JobStatus::Active,
                },
            )
            .await
            .unwrap();
        Fixture {
            svc: ApplicationService::new(repos.jobs.clone(), repos.applications.clone()),
            hr,
            other_hr,
            candidate,
            job_id: job.id,
            deadline,
        }
    }

    fn payload(job_id: Uuid) -> SubmitApplicationPayload {
        SubmitApplicationPayload {
            job_id: Some(job_id),
            full_name: "Cand Idate".into(),
            contact_email: "cand@mail.test".into(),
            phone_number: Some("  ".into()),
            cover_letter: Some("Hello".into()),
            resume_url: "https://files.test/cv.pdf".into(),
        }
    }

    #[tokio::test]
    async fn deadline_boundary() {
        let f = fixture().await;
        let at_deadline = f
            .svc
            .submit_at(&f.candidate, payload(f.job_id), f.deadline)
            .await
            .unwrap();
        assert_eq!(at_deadline.status, ApplicationStatus::Applied);
        assert_eq!(at_deadline.phone_number, None);

        let late = f
            .svc
            .submit_at(
                &f.candidate,
                payload(f.job_id),
                f.deadline + Duration::seconds(1),
            )
            .await;
        assert!(matches!(late, Err(Error::DeadlinePassed)));
    }

    #[tokio::test]
    async fn duplicate_submission_conflicts_and_stores_one() {
        let f = fixture().await;
        let early = f.deadline - Duration::days(1);
        f.svc
            .submit_at(&f.candidate, payload(f.job_id), early)
            .await
            .unwrap();
        let again = f
            .svc
            .submit_at(&f.candidate, payload(f.job_id), early)
            .await;
        assert!(matches!(again, Err(Error::Conflict(_))));
        assert_eq!(f.svc.list_for_candidate(&f.candidate).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_submissions() {
        let f = fixture().await;
        let early = f.deadline - Duration::days(1);

        let mut bad_email = payload(f.job_id);
        bad_email.contact_email = "cand@nowhere".into();
        assert!(matches!(
            f.svc.submit_at(&f.candidate, bad_email, early).await,
            Err(Error::Validation(_))
        ));

        let missing_job = f
            .svc
            .submit_at(&f.candidate, payload(Uuid::new_v4()), early)
            .await;
        assert!(matches!(missing_job, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn status_updates_accept_only_known_values() {
        let f = fixture().await;
        let app = f
            .svc
            .submit_at(&f.candidate, payload(f.job_id), f.deadline)
            .await
            .unwrap();

        for raw in ["promoted", "", "Reviewed"] {
            let res = f
                .svc
                .update_status(&f.hr, app.id, UpdateStatusPayload { status: raw.into() })
                .await;
            assert!(matches!(res, Err(Error::Validation(_))), "{raw:?} accepted");
        }

        let updated = f
            .svc
            .update_status(&f.other_hr, app.id, UpdateStatusPayload { status: "rejected".into() })
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Rejected);
    }

    #[tokio::test]
    async fn applicant_views_are_owner_scoped() {
        let f = fixture().await;
        let app = f
            .svc
            .submit_at(&f.candidate, payload(f.job_id), f.deadline)
            .await
            .unwrap();

        assert_eq!(f.svc.list_for_hr(&f.hr).await.unwrap().len(), 1);
        assert!(f.svc.list_for_hr(&f.other_hr).await.unwrap().is_empty());
        assert!(matches!(
            f.svc.detail_for_hr(&f.other_hr, app.id).await,
            Err(Error::NotFound(_))
        ));
        let detail = f.svc.detail_for_hr(&f.hr, app.id).await.unwrap();
        assert_eq!(detail.posted_by.id, f.hr.account_id);
        assert_eq!(detail.user.id, f.candidate.account_id);
    }
}
