use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};

use crate::error::{Error, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SKILL_PROMPT: &str = r#"You are an experienced technical recruiter.
Read the resume below and list the candidate's distinct professional skills
(technologies, tools, languages, methods and domain skills).

Rules:
1. Respond with a JSON array of strings and nothing else.
2. Each entry is a short skill name such as "Python" or "Project Management".
3. Do not repeat a skill.

Resume:
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillModel: Send + Sync {
    /// Returns the model's raw text answer for the given resume text.
    async fn extract_skills(&self, resume_text: &str) -> Result<String>;
}

/// Gemini `generateContent` over REST. A missing API key is a configuration error at call time.
pub struct GeminiSkillModel {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiSkillModel {
    pub fn new(client: Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl SkillModel for GeminiSkillModel {
    async fn extract_skills(&self, resume_text: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        let payload = json!({
            "contents": [{
                "parts": [{ "text": format!("{}{}", SKILL_PROMPT, resume_text) }]
            }],
            "generationConfig": { "temperature": 0.2 }
        });

        let res = self
            .client
            .post(format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model))
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::upstream_server(format!(
                "Gemini API error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::upstream_server("Gemini response had no text"))
    }
}

/// Turns a model answer into a skill list. Prefers a JSON string array (optionally inside a
/// Markdown code fence); anything else is split on newlines, commas and semicolons.
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    let unfenced = strip_code_fence(raw);

    if let Ok(JsonValue::Array(items)) = serde_json::from_str::<JsonValue>(unfenced) {
        if items.iter().all(JsonValue::is_string) {
            return items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    unfenced
        .split(['\n', ',', ';'])
        .map(|s| s.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
