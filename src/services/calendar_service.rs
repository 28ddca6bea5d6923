use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::google_auth::GoogleAuth;

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

#[derive(Debug, Clone)]
pub struct CalendarEventRequest {
    pub summary: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub timezone: String,
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub event_id: String,
    pub meet_link: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Creates the event and asks for a generated video-meeting link.
    async fn create_event(&self, request: &CalendarEventRequest) -> Result<CalendarEvent>;
}

/// Google Calendar over REST, authorised with the shared refresh token.
pub struct GoogleCalendar {
    auth: Arc<GoogleAuth>,
}

impl GoogleCalendar {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self { auth }
    }
}

pub fn event_body(request: &CalendarEventRequest, request_id: &str) -> JsonValue {
    json!({
        "summary": request.summary,
        "description": request.description,
        "start": {
            "dateTime": request.start.to_rfc3339(),
            "timeZone": request.timezone,
        },
        "end": {
            "dateTime": request.end.to_rfc3339(),
            "timeZone": request.timezone,
        },
        "attendees": request
            .attendees
            .iter()
            .map(|email| json!({ "email": email }))
            .collect::<Vec<_>>(),
        "conferenceData": {
            "createRequest": {
                "requestId": request_id,
                "conferenceSolutionKey": { "type": "hangoutsMeet" },
            }
        },
    })
}

/// `hangoutLink` when present, otherwise the first video entry point.
pub fn meet_link_from(event: &JsonValue) -> Option<String> {
    event
        .get("hangoutLink")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| {
            event
                .pointer("/conferenceData/entryPoints")
                .and_then(|v| v.as_array())
                .and_then(|points| {
                    points
                        .iter()
                        .find(|p| p.get("entryPointType").and_then(|t| t.as_str()) == Some("video"))
                })
                .and_then(|p| p.get("uri"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .filter(|link| !link.is_empty())
}

#[async_trait]
impl CalendarClient for GoogleCalendar {
    async fn create_event(&self, request: &CalendarEventRequest) -> Result<CalendarEvent> {
        let token = self.auth.access_token().await?;
        let body = event_body(request, &Uuid::new_v4().to_string());

        let res = self
            .auth
            .client()
            .post(EVENTS_URL)
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::upstream_server(format!(
                "Calendar API error {}: {}",
                status, text
            )));
        }

        let event: JsonValue = res.json().await?;
        Ok(CalendarEvent {
            event_id: event
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            meet_link: meet_link_from(&event),
        })
    }
}

/// Used when the Google credentials are not configured; every call fails and the
/// scheduler carries on without a link.
pub struct UnconfiguredCalendar;

#[async_trait]
impl CalendarClient for UnconfiguredCalendar {
    async fn create_event(&self, _request: &CalendarEventRequest) -> Result<CalendarEvent> {
        Err(Error::Config(
            "Google Calendar credentials are not configured".to_string(),
        ))
    }
}
