use std::sync::Arc;

use crate::database::AccountRepository;
use crate::dto::auth_dto::{HrSignupPayload, LoginPayload, UserSignupPayload};
use crate::dto::profile_dto::UpdateProfilePayload;
use crate::error::{Error, Result};
use crate::models::account::{Account, NewAccount, ProfileChanges, Role};
use crate::services::identity_service::Identity;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::SessionKeys;
use crate::utils::validation::{add_field_error, is_valid_phone, validate_with};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Signup, credential login and profile edits.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    keys: SessionKeys,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>, keys: SessionKeys) -> Self {
        Self { accounts, keys }
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.keys.ttl_seconds()
    }

    pub async fn signup_hr(&self, payload: HrSignupPayload) -> Result<Account> {
        validate_with(&payload, |errors| check_phone(errors, &payload.phone))?;
        let account = self
            .register(NewAccount {
                email: normalize_email(&payload.email),
                name: payload.name.trim().to_string(),
                phone: Some(payload.phone.trim().to_string()),
                password_hash: Some(hash_password(&payload.password)?),
                role: Role::Hr,
                company: Some(payload.company.trim().to_string()),
            })
            .await?;
        Ok(account)
    }

    pub async fn signup_user(&self, payload: UserSignupPayload) -> Result<Account> {
        validate_with(&payload, |errors| check_phone(errors, &payload.phone))?;
        self.register(NewAccount {
            email: normalize_email(&payload.email),
            name: payload.name.trim().to_string(),
            phone: Some(payload.phone.trim().to_string()),
            password_hash: Some(hash_password(&payload.password)?),
            role: Role::User,
            company: None,
        })
        .await
    }

    async fn register(&self, account: NewAccount) -> Result<Account> {
        let created = self.accounts.create_account(account).await?;
        tracing::info!(account_id = %created.id, role = %created.role, "account created");
        Ok(created)
    }

    /// Returns the signed session token and the account it was issued for.
    pub async fn login(&self, payload: LoginPayload) -> Result<(String, Account)> {
        validate_with(&payload, |_| {})?;
        let account = self
            .accounts
            .find_account_by_email(&normalize_email(&payload.email))
            .await?
            .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let Some(hash) = account.password_hash.as_deref() else {
            return Err(Error::Unauthorized(
                "This account uses social sign-in and has no password".to_string(),
            ));
        };
        if !verify_password(&payload.password, hash) {
            tracing::info!(account_id = %account.id, "login rejected: bad password");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        if let Some(role) = payload.role {
            if role != account.role {
                return Err(Error::Unauthorized(format!(
                    "This account is not registered as {}",
                    role
                )));
            }
        }

        let token = self.keys.issue(Identity::from(&account).to_claims())?;
        tracing::info!(account_id = %account.id, "login succeeded");
        Ok((token, account))
    }

    pub async fn profile(&self, identity: &Identity) -> Result<Account> {
        self.accounts
            .find_account(identity.account_id)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        payload: UpdateProfilePayload,
    ) -> Result<Account> {
        validate_with(&payload, |errors| {
            if let Some(phone) = payload.phone.as_deref() {
                check_phone(errors, phone);
            }
        })?;

        let changes = ProfileChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            phone: payload.phone.map(|p| p.trim().to_string()),
            image: payload.image,
            skills: payload.skills.map(clean_skills),
        };
        self.save_profile(identity, changes).await
    }

    pub async fn save_profile(&self, identity: &Identity, changes: ProfileChanges) -> Result<Account> {
        self.accounts
            .update_profile(identity.account_id, changes)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn check_phone(errors: &mut validator::ValidationErrors, phone: &str) {
    if !is_valid_phone(phone.trim()) {
        add_field_error(
            errors,
            "phone",
            "phone",
            "Phone must be 10 to 15 digits with an optional leading +",
        );
    }
}

pub fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
