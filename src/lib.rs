pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::database::Repositories;
use crate::error::{Error, Result};
use crate::services::{
    account_service::AccountService,
    ai_service::{GeminiSkillModel, SkillModel},
    application_service::ApplicationService,
    calendar_service::{CalendarClient, GoogleCalendar, UnconfiguredCalendar},
    google_auth::GoogleAuth,
    interview_service::InterviewService,
    job_service::JobService,
    mail_service::{GmailMailer, Mailer, UnconfiguredMailer},
    resume_service::{HttpResumeSource, ResumeSource},
    skill_service::SkillService,
    storage_service::StorageService,
};
use crate::utils::token::SessionKeys;

/// Third-party seams. Production wiring comes from `Integrations::from_config`; tests pass stubs.
#[derive(Clone)]
pub struct Integrations {
    pub calendar: Arc<dyn CalendarClient>,
    pub mailer: Arc<dyn Mailer>,
    pub skill_model: Arc<dyn SkillModel>,
    pub resumes: Arc<dyn ResumeSource>,
}

impl Integrations {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.outbound_timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let (calendar, mailer): (Arc<dyn CalendarClient>, Arc<dyn Mailer>) = match &config.google {
            Some(google) => {
                let auth = Arc::new(GoogleAuth::new(client.clone(), google.clone()));
                (
                    Arc::new(GoogleCalendar::new(auth.clone())),
                    Arc::new(GmailMailer::new(auth)),
                )
            }
            None => {
                tracing::warn!("Google credentials missing; interviews will be scheduled without calendar events or email");
                (Arc::new(UnconfiguredCalendar), Arc::new(UnconfiguredMailer))
            }
        };

        Ok(Self {
            calendar,
            mailer,
            skill_model: Arc::new(GeminiSkillModel::new(
                client.clone(),
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
            )),
            resumes: Arc::new(HttpResumeSource::new(
                client,
                &config.public_base_url,
                &config.uploads_dir,
            )),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub keys: SessionKeys,
    pub account_service: AccountService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub interview_service: InterviewService,
    pub skill_service: SkillService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(config: &Config, repos: Repositories) -> Result<Self> {
        Ok(Self::with_integrations(
            config,
            repos,
            Integrations::from_config(config)?,
        ))
    }

    pub fn with_integrations(config: &Config, repos: Repositories, integrations: Integrations) -> Self {
        let keys = SessionKeys::new(&config.jwt_secret, config.session_ttl_hours);

        Self {
            account_service: AccountService::new(repos.accounts.clone(), keys.clone()),
            job_service: JobService::new(repos.jobs.clone()),
            application_service: ApplicationService::new(
                repos.jobs.clone(),
                repos.applications.clone(),
            ),
            interview_service: InterviewService::new(
                repos.jobs.clone(),
                repos.applications.clone(),
                repos.interviews.clone(),
                integrations.calendar,
                integrations.mailer,
                config.interview.clone(),
            ),
            skill_service: SkillService::new(
                repos.accounts,
                integrations.resumes,
                integrations.skill_model,
            ),
            storage_service: StorageService::new(&config.uploads_dir, &config.public_base_url),
            keys,
        }
    }
}
