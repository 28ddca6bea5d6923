use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{Account, Role};
use crate::utils::token::{Claims, SessionKeys};

pub const SESSION_COOKIE: &str = "jobotics_session";

/// The verified caller of a request, threaded explicitly into every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Identity(Identity),
    Anonymous,
}

impl Identity {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        Some(Self {
            account_id: claims.sub.parse().ok()?,
            role: claims.role.parse().ok()?,
            email: claims.email,
            name: claims.name,
            company: claims.company,
        })
    }

    pub fn to_claims(&self) -> Claims {
        Claims {
            sub: self.account_id.to_string(),
            role: self.role.as_str().to_string(),
            email: self.email.clone(),
            name: self.name.clone(),
            company: self.company.clone(),
            iat: 0,
            exp: 0,
        }
    }
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            role: account.role,
            email: account.email.clone(),
            name: account.name.clone(),
            company: account.company.clone(),
        }
    }
}

/// Bearer header wins over the session cookie. Anything that fails verification is anonymous.
pub fn resolve_caller(keys: &SessionKeys, headers: &HeaderMap) -> Caller {
    let token = bearer_token(headers).or_else(|| session_cookie(headers));
    token
        .and_then(|token| keys.verify(&token))
        .and_then(Identity::from_claims)
        .map(Caller::Identity)
        .unwrap_or(Caller::Anonymous)
}

pub fn require_session(caller: Caller) -> Result<Identity> {
    match caller {
        Caller::Identity(identity) => Ok(identity),
        Caller::Anonymous => Err(Error::Unauthorized("Authentication required".to_string())),
    }
}

pub fn require_role(caller: Caller, role: Role) -> Result<Identity> {
    let identity = require_session(caller)?;
    if identity.role != role {
        tracing::debug!(account_id = %identity.account_id, required = %role, "role rejected");
        return Err(Error::Unauthorized(format!(
            "This action requires the {} role",
            role
        )));
    }
    Ok(identity)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie_header(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

pub fn cleared_session_cookie_header() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
