pub mod applicants;
pub mod applications;
pub mod auth;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod profile;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::middleware::{
    auth::{require_any_session, require_candidate, require_hr},
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Full application router: API behind the rate limiter, plus health and the uploads directory.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route("/api/hr/signup", post(auth::hr_signup))
        .route("/api/user/signup", post(auth::user_signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout));

    let hr_api = Router::new()
        .route("/api/hr/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/api/hr/jobs/:id",
            get(jobs::get_job)
                .patch(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route("/api/hr/applicants", get(applicants::list_applicants))
        .route(
            "/api/hr/applicants/:id",
            get(applicants::get_applicant).patch(applicants::update_applicant_status),
        )
        .route(
            "/api/hr/interviews",
            get(interviews::list_interviews).post(interviews::schedule_interview),
        )
        .route_layer(from_fn_with_state(state.clone(), require_hr));

    let candidate_api = Router::new()
        .route("/api/user/jobs", get(jobs::list_open_jobs))
        .route("/api/user/jobs/:id", get(jobs::get_open_job))
        .route(
            "/api/user/applications",
            get(applications::list_my_applications),
        )
        .route("/api/applications", post(applications::submit_application))
        .route("/api/extract-skills", post(profile::extract_skills))
        .route_layer(from_fn_with_state(state.clone(), require_candidate));

    let session_api = Router::new()
        .route(
            "/api/user/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route(
            "/api/upload-resume",
            post(profile::upload_resume).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route_layer(from_fn_with_state(state.clone(), require_any_session));

    let api = public_api
        .merge(hr_api)
        .merge(candidate_api)
        .merge(session_api)
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps, config.trust_forwarded_for),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
}
