use std::sync::Arc;

use crate::database::AccountRepository;
use crate::dto::profile_dto::ExtractSkillsPayload;
use crate::error::{Error, Result};
use crate::models::account::ProfileChanges;
use crate::services::ai_service::{parse_skill_list, SkillModel};
use crate::services::identity_service::Identity;
use crate::services::resume_service::{extract_text, ResumeSource};
use crate::utils::validation::validate_with;

const MIN_USEFUL_TEXT: usize = 50;

/// Resume -> text -> model -> skill list saved on the caller's profile.
#[derive(Clone)]
pub struct SkillService {
    accounts: Arc<dyn AccountRepository>,
    resumes: Arc<dyn ResumeSource>,
    model: Arc<dyn SkillModel>,
}

impl SkillService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        resumes: Arc<dyn ResumeSource>,
        model: Arc<dyn SkillModel>,
    ) -> Self {
        Self {
            accounts,
            resumes,
            model,
        }
    }

    pub async fn extract(
        &self,
        candidate: &Identity,
        payload: ExtractSkillsPayload,
    ) -> Result<Vec<String>> {
        validate_with(&payload, |_| {})?;

        let bytes = self.resumes.fetch(payload.resume_url.trim()).await?;
        let text = extract_text(bytes, &payload.mime_type).await?;
        if text.trim().chars().count() < MIN_USEFUL_TEXT {
            tracing::warn!(
                account_id = %candidate.account_id,
                chars = text.trim().chars().count(),
                "resume text is very short; skills may be incomplete"
            );
        }

        let answer = self.model.extract_skills(&text).await?;
        let skills = parse_skill_list(&answer);

        self.accounts
            .update_profile(
                candidate.account_id,
                ProfileChanges {
                    skills: Some(skills.clone()),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

        tracing::info!(account_id = %candidate.account_id, count = skills.len(), "skills extracted");
        Ok(skills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repositories;
    use crate::models::account::{NewAccount, Role};
    use crate::services::ai_service::MockSkillModel;
    use crate::services::resume_service::MockResumeSource;
    use bytes::Bytes;

    async fn candidate(repos: &Repositories) -> Identity {
        let account = repos
            .accounts
            .create_account(NewAccount {
                email: "cand@mail.test".into(),
                name: "Cand".into(),
                phone: None,
                password_hash: None,
                role: Role::User,
                company: None,
            })
            .await
            .unwrap();
        Identity::from(&account)
    }

    fn payload() -> ExtractSkillsPayload {
        ExtractSkillsPayload {
            resume_url: "https://files.test/cv.txt".into(),
            mime_type: "text/plain".into(),
        }
    }

    #[tokio::test]
    async fn malformed_model_output_is_recovered_and_saved() {
        let repos = Repositories::memory();
        let who = candidate(&repos).await;

        let mut resumes = MockResumeSource::new();
        resumes
            .expect_fetch()
            .returning(|_| Ok(Bytes::from_static(b"Senior engineer. Python, Go and Rust.")));
        let mut model = MockSkillModel::new();
        model
            .expect_extract_skills()
            .withf(|text| text.contains("Senior engineer"))
            .returning(|_| Ok("Python, Go; Rust".to_string()));

        let svc = SkillService::new(repos.accounts.clone(), Arc::new(resumes), Arc::new(model));
        let skills = svc.extract(&who, payload()).await.unwrap();
        assert_eq!(skills, vec!["Python", "Go", "Rust"]);

        let stored = repos.accounts.find_account(who.account_id).await.unwrap().unwrap();
        assert_eq!(stored.skills, Some(skills));
    }

    #[tokio::test]
    async fn fetch_failure_is_a_caller_error() {
        let repos = Repositories::memory();
        let who = candidate(&repos).await;

        let mut resumes = MockResumeSource::new();
        resumes
            .expect_fetch()
            .returning(|_| Err(Error::upstream_input("Failed to fetch resume")));
        let mut model = MockSkillModel::new();
        model.expect_extract_skills().times(0);

        let svc = SkillService::new(repos.accounts.clone(), Arc::new(resumes), Arc::new(model));
        let err = svc.extract(&who, payload()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { caller_input: true, .. }));
    }
}
