use std::sync::Arc;

use crate::config::InterviewConfig;
use crate::database::{ApplicationRepository, InterviewRepository, JobRepository};
use crate::dto::interview_dto::ScheduleInterviewPayload;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::interview::{Interview, InterviewListItem, NewInterview};
use crate::models::job::Job;
use crate::services::calendar_service::{CalendarClient, CalendarEventRequest};
use crate::services::identity_service::Identity;
use crate::services::mail_service::{escape_html, MailMessage, Mailer};
use crate::utils::time::{parse_calendar_date, parse_clock_time, slot_window};
use crate::utils::validation::{add_field_error, validate_with};

/// What scheduling produced. The calendar and mail steps are optional and report their outcome
/// here instead of failing the call.
#[derive(Debug, Clone)]
pub struct ScheduledInterview {
    pub interview: Interview,
    pub meet_link: Option<String>,
    pub calendar_event_created: bool,
    pub email_sent: bool,
}

#[derive(Clone)]
pub struct InterviewService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    interviews: Arc<dyn InterviewRepository>,
    calendar: Arc<dyn CalendarClient>,
    mailer: Arc<dyn Mailer>,
    settings: InterviewConfig,
}

impl InterviewService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        interviews: Arc<dyn InterviewRepository>,
        calendar: Arc<dyn CalendarClient>,
        mailer: Arc<dyn Mailer>,
        settings: InterviewConfig,
    ) -> Self {
        Self {
            jobs,
            applications,
            interviews,
            calendar,
            mailer,
            settings,
        }
    }

    pub async fn schedule(
        &self,
        hr: &Identity,
        payload: ScheduleInterviewPayload,
    ) -> Result<ScheduledInterview> {
        let offset = self.settings.utc_offset;
        let date = parse_calendar_date(&payload.date, &offset);
        let time = parse_clock_time(&payload.time);
        validate_with(&payload, |errors| {
            if !payload.date.is_empty() && date.is_none() {
                add_field_error(errors, "date", "date", "Interview date could not be parsed");
            }
            if !payload.time.is_empty() && time.is_none() {
                add_field_error(
                    errors,
                    "time",
                    "time",
                    "Interview time must look like 10:00AM or 14:30",
                );
            }
        })?;
        let (Some(application_id), Some(job_id), Some(date), Some(time)) =
            (payload.applicant_id, payload.job_id, date, time)
        else {
            return Err(Error::BadRequest("Missing interview fields".to_string()));
        };
        let (starts_at, ends_at) = slot_window(date, time, &offset, self.settings.slot_minutes)
            .ok_or_else(|| Error::BadRequest("Interview time does not exist in the configured zone".to_string()))?;

        let application = self
            .applications
            .find_application(application_id)
            .await?
            .filter(|a| a.job_id == job_id)
            .ok_or_else(|| Error::NotFound("Applicant not found".to_string()))?;
        if application.status.is_terminal() {
            tracing::warn!(
                application_id = %application.id,
                status = %application.status,
                "scheduling an interview for an application in a terminal stage"
            );
        }
        let job = self
            .jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        let slot_label = format!("{} {}", date.format("%A, %d %B %Y"), time.format("%I:%M %p"));
        let event = self
            .calendar
            .create_event(&CalendarEventRequest {
                summary: format!("Interview: {} ({})", job.title, application.full_name),
                description: interview_description(&payload, &job),
                start: starts_at.with_timezone(&offset),
                end: ends_at.with_timezone(&offset),
                timezone: self.settings.timezone_name.clone(),
                attendees: vec![application.contact_email.clone(), hr.email.clone()],
            })
            .await;
        let (meet_link, calendar_event_created) = match event {
            Ok(event) => {
                tracing::info!(event_id = %event.event_id, application_id = %application.id, "calendar event created");
                (event.meet_link, true)
            }
            Err(err) => {
                tracing::warn!(error = %err, application_id = %application.id, "calendar event failed; continuing without a link");
                (None, false)
            }
        };

        let interview = self
            .interviews
            .insert_interview(NewInterview {
                application_id: application.id,
                job_id,
                interview_date: date,
                interview_time: payload.time.trim().to_string(),
                starts_at,
                ends_at,
                interview_type: payload.interview_type.trim().to_string(),
                meet_link: meet_link.clone(),
                notes: payload
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                scheduled_by: hr.account_id,
            })
            .await?;

        let email_sent = match self
            .mailer
            .send(&invitation_email(
                &application,
                &job,
                hr,
                &slot_label,
                &self.settings.timezone_name,
                &interview,
            ))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, application_id = %application.id, "interview email failed");
                false
            }
        };

        self.applications
            .set_application_status(application.id, ApplicationStatus::Interviewed)
            .await?
            .ok_or_else(|| Error::NotFound("Applicant not found".to_string()))?;

        tracing::info!(
            interview_id = %interview.id,
            application_id = %application.id,
            account_id = %hr.account_id,
            calendar_event_created,
            email_sent,
            "interview scheduled"
        );
        Ok(ScheduledInterview {
            interview,
            meet_link,
            calendar_event_created,
            email_sent,
        })
    }

    pub async fn list_for_hr(&self, hr: &Identity) -> Result<Vec<InterviewListItem>> {
        self.interviews.interviews_for_hr(hr.account_id).await
    }
}

fn interview_description(payload: &ScheduleInterviewPayload, job: &Job) -> String {
    let mut description = format!("{} interview for {}", payload.interview_type.trim(), job.title);
    if let Some(notes) = payload.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        description.push_str("\n\n");
        description.push_str(notes.trim());
    }
    description
}

fn invitation_email(
    application: &Application,
    job: &Job,
    hr: &Identity,
    slot_label: &str,
    timezone: &str,
    interview: &Interview,
) -> MailMessage {
    let link = interview
        .meet_link
        .as_deref()
        .map(|l| format!("<p>Join link: <a href=\"{0}\">{0}</a></p>", escape_html(l)))
        .unwrap_or_else(|| "<p>A meeting link will be shared separately.</p>".to_string());
    let notes = interview
        .notes
        .as_deref()
        .map(|n| format!("<p>Notes: {}</p>", escape_html(n)))
        .unwrap_or_default();
    MailMessage {
        to: application.contact_email.clone(),
        cc: vec![hr.email.clone()],
        subject: format!("Interview scheduled: {}", job.title),
        html_body: format!(
            "<p>Hi {},</p>\
             <p>Your {} interview for <strong>{}</strong> is scheduled for {} ({}).</p>\
             {}{}\
             <p>Regards,<br>{}</p>",
            escape_html(&application.full_name),
            escape_html(&interview.interview_type),
            escape_html(&job.title),
            slot_label,
            escape_html(timezone),
            link,
            notes,
            escape_html(hr.company.as_deref().unwrap_or(&hr.name)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_utc_offset;
    use crate::database::Repositories;
    use crate::models::account::{NewAccount, Role};
    use crate::models::application::NewApplication;
    use crate::models::interview::InterviewStatus;
    use crate::models::job::{JobFields, JobStatus};
    use crate::services::calendar_service::{CalendarEvent, MockCalendarClient};
    use crate::services::mail_service::MockMailer;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    struct Fixture {
        repos: Repositories,
        hr: Identity,
        application: Application,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::memory();
        let mut ids = Vec::new();
        for (email, role) in [("hr@acme.test", Role::Hr), ("cand@mail.test", Role::User)] {
            let account = repos
                .accounts
                .create_account(NewAccount {
                    email: email.into(),
                    name: "Person".into(),
                    phone: None,
                    password_hash: None,
                    role,
                    company: Some("Acme".into()),
                })
                .await
                .unwrap();
            ids.push(account);
        }
        let hr = Identity::from(&ids[0]);
        let job = repos
            .jobs
            .insert_job(
                hr.account_id,
                JobFields {
                    title: "Data Engineer".into(),
                    num_openings: 2,
                    min_salary: Decimal::ZERO,
                    max_salary: Decimal::ZERO,
                    work_mode: "remote".into(),
                    description: "Pipelines".into(),
                    deadline: Utc::now() + Duration::days(1),
                    status: JobStatus::Active,
                },
            )
            .await
            .unwrap();
        let application = repos
            .applications
            .insert_application(NewApplication {
                user_id: ids[1].id,
                job_id: job.id,
                full_name: "Cand Idate".into(),
                contact_email: "cand@mail.test".into(),
                phone_number: None,
                cover_letter: None,
                resume_url: "https://files.test/cv.pdf".into(),
            })
            .await
            .unwrap();
        Fixture {
            repos,
            hr,
            application,
        }
    }

    fn settings() -> InterviewConfig {
        InterviewConfig {
            timezone_name: "Asia/Kolkata".into(),
            utc_offset: parse_utc_offset("+05:30").unwrap(),
            slot_minutes: 30,
        }
    }

    fn service(f: &Fixture, calendar: MockCalendarClient, mailer: MockMailer) -> InterviewService {
        InterviewService::new(
            f.repos.jobs.clone(),
            f.repos.applications.clone(),
            f.repos.interviews.clone(),
            Arc::new(calendar),
            Arc::new(mailer),
            settings(),
        )
    }

    fn payload(f: &Fixture) -> ScheduleInterviewPayload {
        ScheduleInterviewPayload {
            applicant_id: Some(f.application.id),
            job_id: Some(f.application.job_id),
            date: "2026-10-17".into(),
            time: "10:00AM".into(),
            interview_type: "Technical".into(),
            notes: Some("Bring a laptop".into()),
        }
    }

    #[tokio::test]
    async fn schedules_with_calendar_link_and_email() {
        let f = fixture().await;
        let mut calendar = MockCalendarClient::new();
        calendar
            .expect_create_event()
            .withf(|req| {
                req.start.to_rfc3339() == "2026-10-17T10:00:00+05:30"
                    && req.end.to_rfc3339() == "2026-10-17T10:30:00+05:30"
                    && req.attendees == vec!["cand@mail.test".to_string(), "hr@acme.test".to_string()]
            })
            .times(1)
            .returning(|_| {
                Ok(CalendarEvent {
                    event_id: "evt-1".into(),
                    meet_link: Some("https://meet.google.com/abc".into()),
                })
            });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|msg| msg.to == "cand@mail.test" && msg.cc == vec!["hr@acme.test".to_string()])
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(&f, calendar, mailer);
        let scheduled = svc.schedule(&f.hr, payload(&f)).await.unwrap();

        assert!(scheduled.calendar_event_created);
        assert!(scheduled.email_sent);
        assert_eq!(scheduled.meet_link.as_deref(), Some("https://meet.google.com/abc"));
        assert_eq!(scheduled.interview.status, InterviewStatus::Scheduled);
        assert_eq!(
            scheduled.interview.starts_at.to_rfc3339(),
            "2026-10-17T04:30:00+00:00"
        );

        let app = f
            .repos
            .applications
            .find_application(f.application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Interviewed);
    }

    #[tokio::test]
    async fn calendar_and_mail_failures_do_not_abort() {
        let f = fixture().await;
        let mut calendar = MockCalendarClient::new();
        calendar
            .expect_create_event()
            .returning(|_| Err(Error::upstream_server("calendar down")));
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_| Err(Error::upstream_server("smtp down")));

        let svc = service(&f, calendar, mailer);
        let scheduled = svc.schedule(&f.hr, payload(&f)).await.unwrap();

        assert_eq!(scheduled.meet_link, None);
        assert!(!scheduled.calendar_event_created);
        assert!(!scheduled.email_sent);
        assert_eq!(scheduled.interview.meet_link, None);

        let listed = svc.list_for_hr(&f.hr).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].applicant.full_name, "Cand Idate");
        let app = f
            .repos
            .applications
            .find_application(f.application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Interviewed);
    }

    #[tokio::test]
    async fn structural_failures_abort_before_side_effects() {
        let f = fixture().await;
        let mut calendar = MockCalendarClient::new();
        calendar.expect_create_event().times(0);
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);
        let svc = service(&f, calendar, mailer);

        let mut bad_time = payload(&f);
        bad_time.time = "10 o'clock".into();
        assert!(matches!(
            svc.schedule(&f.hr, bad_time).await,
            Err(Error::Validation(_))
        ));

        let mut wrong_job = payload(&f);
        wrong_job.job_id = Some(Uuid::new_v4());
        assert!(matches!(
            svc.schedule(&f.hr, wrong_job).await,
            Err(Error::NotFound(_))
        ));

        let mut missing = payload(&f);
        missing.applicant_id = None;
        assert!(matches!(
            svc.schedule(&f.hr, missing).await,
            Err(Error::Validation(_))
        ));
        assert!(svc.list_for_hr(&f.hr).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invitation_escapes_user_text_and_keeps_headers_intact() {
        let f = fixture().await;
        let mut job = f
            .repos
            .jobs
            .find_job(f.application.job_id)
            .await
            .unwrap()
            .unwrap();
        job.title = "Engineer\r\nBcc: attacker@evil.test".into();
        let mut application = f.application.clone();
        application.full_name = "<img src=x onerror=alert(1)>".into();
        let now = Utc::now();
        let interview = Interview {
            id: Uuid::new_v4(),
            application_id: application.id,
            job_id: job.id,
            interview_date: now.date_naive(),
            interview_time: "10:00AM".into(),
            starts_at: now,
            ends_at: now + Duration::minutes(30),
            interview_type: "<b>Technical</b>".into(),
            status: InterviewStatus::Scheduled,
            meet_link: Some("https://meet.google.com/abc\"><script>".into()),
            notes: Some("<script>steal()</script>".into()),
            scheduled_by: f.hr.account_id,
            created_at: now,
        };

        let message = invitation_email(&application, &job, &f.hr, "Friday", "Asia/Kolkata", &interview);
        assert!(!message.html_body.contains("<img"));
        assert!(!message.html_body.contains("<script>"));
        assert!(!message.html_body.contains("<b>"));
        assert!(message.html_body.contains("&lt;img src=x onerror=alert(1)&gt;"));

        let mime = crate::services::mail_service::render_mime("talent@acme.test", &message);
        let (head, _) = mime.split_once("\r\n\r\n").unwrap();
        assert!(head.lines().all(|line| !line.starts_with("Bcc:")));
    }
}
