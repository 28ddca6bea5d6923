#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use chrono::{Duration, FixedOffset, Utc};
use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;
use tower::ServiceExt;

use jobotics_backend::{
    config::{Config, InterviewConfig},
    database::Repositories,
    error::{Error, Result},
    routes::build_router,
    services::{
        ai_service::SkillModel,
        calendar_service::{CalendarClient, CalendarEvent, CalendarEventRequest},
        mail_service::{MailMessage, Mailer},
        resume_service::ResumeSource,
    },
    AppState, Integrations,
};

pub const PASSWORD: &str = "correct-horse-battery";
pub const MEET_LINK: &str = "https://meet.google.com/abc-defg-hij";

pub struct StubCalendar {
    fail: bool,
    pub requests: Mutex<Vec<CalendarEventRequest>>,
}

#[async_trait]
impl CalendarClient for StubCalendar {
    async fn create_event(&self, request: &CalendarEventRequest) -> Result<CalendarEvent> {
        self.requests
            .lock()
            .unwrap()
            .push(request.clone());
        if self.fail {
            return Err(Error::upstream_server("calendar unavailable"));
        }
        Ok(CalendarEvent {
            event_id: "evt-1".to_string(),
            meet_link: Some(MEET_LINK.to_string()),
        })
    }
}

pub struct RecordingMailer {
    fail: bool,
    pub sent: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        if self.fail {
            return Err(Error::upstream_server("mail unavailable"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct CannedSkillModel(pub String);

#[async_trait]
impl SkillModel for CannedSkillModel {
    async fn extract_skills(&self, _resume_text: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

pub struct StaticResume(pub Bytes);

#[async_trait]
impl ResumeSource for StaticResume {
    async fn fetch(&self, _url: &str) -> Result<Bytes> {
        Ok(self.0.clone())
    }
}

pub struct Options {
    pub integrations_fail: bool,
    pub model_answer: String,
    pub resume_text: &'static str,
    pub max_upload_bytes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            integrations_fail: false,
            model_answer: r#"["Rust", "PostgreSQL"]"#.to_string(),
            resume_text: "Backend engineer with eight years of Rust, PostgreSQL and Kubernetes.",
            max_upload_bytes: 64 * 1024,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub calendar: Arc<StubCalendar>,
    pub mailer: Arc<RecordingMailer>,
    pub uploads: TempDir,
}

pub fn test_config(uploads_dir: &str, max_upload_bytes: usize) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: None,
        jwt_secret: "test_secret_key".to_string(),
        session_ttl_hours: 1,
        public_base_url: "http://localhost:8000".to_string(),
        api_rps: 10_000,
        trust_forwarded_for: false,
        uploads_dir: uploads_dir.to_string(),
        max_upload_bytes,
        cors_allowed_origins: Vec::new(),
        outbound_timeout_secs: 5,
        interview: InterviewConfig {
            timezone_name: "Asia/Kolkata".to_string(),
            utc_offset: FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap(),
            slot_minutes: 30,
        },
        google: None,
        gemini_api_key: None,
        gemini_model: "gemini-1.5-flash".to_string(),
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let uploads = tempfile::tempdir().expect("uploads dir");
        let config = test_config(
            uploads.path().to_str().expect("utf-8 temp path"),
            options.max_upload_bytes,
        );

        let calendar = Arc::new(StubCalendar {
            fail: options.integrations_fail,
            requests: Mutex::new(Vec::new()),
        });
        let mailer = Arc::new(RecordingMailer {
            fail: options.integrations_fail,
            sent: Mutex::new(Vec::new()),
        });
        let integrations = Integrations {
            calendar: calendar.clone(),
            mailer: mailer.clone(),
            skill_model: Arc::new(CannedSkillModel(options.model_answer)),
            resumes: Arc::new(StaticResume(Bytes::from_static(options.resume_text.as_bytes()))),
        };

        let state = AppState::with_integrations(&config, Repositories::memory(), integrations);
        Self {
            router: build_router(state, &config),
            calendar,
            mailer,
            uploads,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Bytes) {
        let res = self.router.clone().oneshot(req).await.expect("router response");
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("response body");
        (status, headers, body)
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let (status, _, bytes) = self.send(req).await;
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    /// Signs up an HR account and returns its bearer token.
    pub async fn hr(&self, email: &str) -> String {
        let (status, _) = self
            .call(
                "POST",
                "/api/hr/signup",
                None,
                Some(json!({
                    "name": "Asha Rao",
                    "email": email,
                    "phone": "+919876543210",
                    "company": "Acme Labs",
                    "password": PASSWORD
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(email, Some("hr")).await
    }

    /// Signs up a candidate account and returns its bearer token.
    pub async fn candidate(&self, email: &str) -> String {
        let (status, _) = self
            .call(
                "POST",
                "/api/user/signup",
                None,
                Some(json!({
                    "name": "Ravi Kumar",
                    "email": email,
                    "phone": "+919812345678",
                    "password": PASSWORD
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(email, Some("user")).await
    }

    pub async fn login(&self, email: &str, role: Option<&str>) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD, "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Posts a job closing tomorrow and returns its id.
    pub async fn post_job(&self, hr_token: &str, title: &str) -> String {
        let (status, body) = self
            .call("POST", "/api/hr/jobs", Some(hr_token), Some(job_body(title, &tomorrow())))
            .await;
        assert_eq!(status, StatusCode::CREATED, "job create failed: {body}");
        body["id"].as_str().expect("job id").to_string()
    }

    /// Applies to a job and returns the application id.
    pub async fn apply(&self, candidate_token: &str, job_id: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/applications",
                Some(candidate_token),
                Some(application_body(job_id)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "apply failed: {body}");
        body["id"].as_str().expect("application id").to_string()
    }
}

pub fn tomorrow() -> String {
    (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string()
}

pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

pub fn job_body(title: &str, deadline: &str) -> JsonValue {
    json!({
        "title": title,
        "numOpenings": 2,
        "minSalary": 50000,
        "maxSalary": 90000,
        "workMode": "remote",
        "description": "Build and run the hiring platform backend.",
        "deadline": deadline
    })
}

pub fn application_body(job_id: &str) -> JsonValue {
    json!({
        "jobId": job_id,
        "fullName": "Ravi Kumar",
        "contactEmail": "ravi@mail.test",
        "phoneNumber": "+919812345678",
        "resumeUrl": "http://localhost:8000/uploads/resumes/ravi/cv.pdf"
    })
}
