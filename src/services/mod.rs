pub mod account_service;
pub mod ai_service;
pub mod application_service;
pub mod calendar_service;
pub mod google_auth;
pub mod identity_service;
pub mod interview_service;
pub mod job_service;
pub mod mail_service;
pub mod resume_service;
pub mod skill_service;
pub mod storage_service;
