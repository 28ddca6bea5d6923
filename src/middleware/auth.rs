use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::Result;
use crate::models::account::Role;
use crate::services::identity_service::{require_role, require_session, resolve_caller};
use crate::AppState;

/// Any signed-in account. The resolved `Identity` is placed in request extensions.
pub async fn require_any_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let identity = require_session(resolve_caller(&state.keys, req.headers()))?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

pub async fn require_hr(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    require_role_layer(state, Role::Hr, req, next).await
}

pub async fn require_candidate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    require_role_layer(state, Role::User, req, next).await
}

async fn require_role_layer(
    state: AppState,
    role: Role,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let identity = require_role(resolve_caller(&state.keys, req.headers()), role)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
