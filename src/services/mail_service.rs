use std::sync::Arc;

use async_trait::async_trait;
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use serde_json::json;

use crate::error::{Error, Result};
use crate::services::google_auth::GoogleAuth;

const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// RFC 2822 message as Gmail's `raw` field expects it, before base64url encoding.
/// Header values are folded onto one line and non-ASCII text is RFC 2047 encoded.
pub fn render_mime(from: &str, message: &MailMessage) -> String {
    let mut headers = vec![
        format!("From: {}", single_line(from)),
        format!("To: {}", single_line(&message.to)),
    ];
    if !message.cc.is_empty() {
        let cc: Vec<String> = message.cc.iter().map(|c| single_line(c)).collect();
        headers.push(format!("Cc: {}", cc.join(", ")));
    }
    headers.push(format!("Subject: {}", encode_header(&message.subject)));
    headers.push("MIME-Version: 1.0".to_string());
    headers.push("Content-Type: text/html; charset=\"UTF-8\"".to_string());
    format!("{}\r\n\r\n{}", headers.join("\r\n"), message.html_body)
}

/// Control characters (CR and LF included) become spaces so a value cannot open a new header.
fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

fn encode_header(value: &str) -> String {
    let line = single_line(value);
    if line.is_ascii() {
        line
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(line.as_bytes()))
    }
}

/// Escapes text for interpolation into an HTML body or attribute.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub struct GmailMailer {
    auth: Arc<GoogleAuth>,
}

impl GmailMailer {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let token = self.auth.access_token().await?;
        let raw = URL_SAFE_NO_PAD.encode(render_mime(self.auth.sender_email(), message));

        let res = self
            .auth
            .client()
            .post(SEND_URL)
            .bearer_auth(token)
            .json(&json!({ "raw": raw }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::upstream_server(format!(
                "Gmail API error {}: {}",
                status, text
            )));
        }
        Ok(())
    }
}

pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _message: &MailMessage) -> Result<()> {
        Err(Error::Config("Gmail credentials are not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_headers_and_body() {
        let mime = render_mime(
            "talent@acme.test",
            &MailMessage {
                to: "cand@mail.test".into(),
                cc: vec!["hr@acme.test".into()],
                subject: "Interview scheduled".into(),
                html_body: "<p>See you</p>".into(),
            },
        );
        assert!(mime.starts_with("From: talent@acme.test\r\nTo: cand@mail.test\r\nCc: hr@acme.test"));
        assert!(mime.ends_with("\r\n\r\n<p>See you</p>"));

        let encoded = URL_SAFE_NO_PAD.encode(&mime);
        assert!(!encoded.contains('+') && !encoded.contains('/') && !encoded.contains('='));
    }

    #[test]
    fn header_values_cannot_add_headers() {
        let mime = render_mime(
            "talent@acme.test",
            &MailMessage {
                to: "cand@mail.test\r\nBcc: spy@evil.test".into(),
                cc: vec!["hr@acme.test\nBcc: spy@evil.test".into()],
                subject: "Interview scheduled: Engineer\r\nBcc: attacker@evil.test".into(),
                html_body: "<p>body</p>".into(),
            },
        );
        let (head, body) = mime.split_once("\r\n\r\n").unwrap();
        assert_eq!(body, "<p>body</p>");
        assert!(head.lines().all(|line| !line.starts_with("Bcc:")));
        assert!(head.contains("Subject: Interview scheduled: Engineer  Bcc: attacker@evil.test"));
        assert_eq!(head.lines().count(), 6);
    }

    #[test]
    fn non_ascii_subjects_are_encoded() {
        assert_eq!(encode_header("Interview"), "Interview");
        let encoded = encode_header("Entretien: Ingénieur");
        assert!(encoded.starts_with("=?UTF-8?B?") && encoded.ends_with("?="));
        let inner = &encoded["=?UTF-8?B?".len()..encoded.len() - 2];
        assert_eq!(STANDARD.decode(inner).unwrap(), "Entretien: Ingénieur".as_bytes());
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }
}
