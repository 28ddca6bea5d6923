use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

const WINDOW: Duration = Duration::from_secs(1);
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    hits: u32,
}

/// Fixed one-second windows, one per client key.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    trust_forwarded_for: bool,
    clients: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(rps: u32, trust_forwarded_for: bool) -> Self {
        Self {
            rps: rps.max(1),
            trust_forwarded_for,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if clients.len() >= SWEEP_THRESHOLD {
            clients.retain(|_, window| now.duration_since(window.opened) < WINDOW);
        }

        let window = clients.entry(client.to_string()).or_insert(Window {
            opened: now,
            hits: 0,
        });
        if now.duration_since(window.opened) >= WINDOW {
            *window = Window {
                opened: now,
                hits: 0,
            };
        }
        if window.hits >= self.rps {
            return false;
        }
        window.hits += 1;
        true
    }
}

/// Peer address, or the first `X-Forwarded-For` hop when running behind a trusted proxy.
/// Requests with neither share one bucket.
fn client_key(req: &Request<Body>, trust_forwarded_for: bool) -> String {
    let forwarded = trust_forwarded_for
        .then(|| req.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&req, limiter.trust_forwarded_for);
    if !limiter.allow_at(&client, Instant::now()) {
        tracing::warn!(client = %client, path = %req.uri().path(), "rate limit exceeded");
        return Error::RateLimited.into_response();
    }
    next.run(req).await
}
