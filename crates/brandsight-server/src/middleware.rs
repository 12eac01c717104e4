//! Request middleware: request ids, bearer auth, and the per-caller analysis
//! quota. Rejections use the same error envelope as the handlers.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, RETRY_AFTER},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried as a request extension and echoed in `x-request-id`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// The caller's `x-request-id`, or a fresh `UUIDv4`.
    fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
        Self(id)
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let echo = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut res = next.run(req).await;
    if let Some(echo) = echo {
        res.headers_mut().insert(REQUEST_ID_HEADER, echo);
    }
    res
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Who is calling, as settled by [`require_bearer_auth`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    /// Position of the matching key in the configured list.
    Key(usize),
    /// Auth is disabled; every caller shares one identity.
    Anonymous,
}

/// Bearer keys accepted on `/api/v1` routes other than health.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Reads `BRANDSIGHT_API_KEYS` (comma-separated bearer tokens).
    ///
    /// # Errors
    ///
    /// See [`AuthState::from_keys`].
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("BRANDSIGHT_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// Parse a comma-separated key list. An empty list disables auth in
    /// development.
    ///
    /// # Errors
    ///
    /// Fails when the list is empty outside development.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        keys.sort();
        keys.dedup();

        if keys.is_empty() {
            if !is_development {
                anyhow::bail!(
                    "BRANDSIGHT_API_KEYS is required outside development; provide comma-separated bearer tokens"
                );
            }
            tracing::warn!("BRANDSIGHT_API_KEYS not set; bearer auth disabled in development");
            return Ok(Self::disabled());
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(Vec::new()),
            enabled: false,
        }
    }

    /// Index of the key equal to `token`. Every key is compared.
    fn identify(&self, token: &str) -> Option<usize> {
        self.api_keys
            .iter()
            .enumerate()
            .fold(None, |found, (i, key)| {
                let matched = bool::from(key.as_bytes().ct_eq(token.as_bytes()));
                found.or(matched.then_some(i))
            })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Rejects requests without a known bearer key and records the [`Caller`].
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let caller = if auth.enabled {
        match bearer_token(req.headers()).and_then(|t| auth.identify(t)) {
            Some(index) => Caller::Key(index),
            None => {
                return ApiError::new(
                    request_id_of(&req),
                    "unauthorized",
                    "missing or invalid bearer token",
                )
                .into_response();
            }
        }
    } else {
        Caller::Anonymous
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}

// ---------------------------------------------------------------------------
// Analysis quota
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct QuotaWindow {
    started_at: Instant,
    used: u32,
}

/// Caps how many analyses each [`Caller`] may start per window.
///
/// Only `POST /analyze` is metered. The caller map holds at most one entry
/// per configured key plus [`Caller::Anonymous`].
#[derive(Debug, Clone)]
pub struct AnalyzeQuota {
    limit: u32,
    window: Duration,
    callers: Arc<Mutex<HashMap<Caller, QuotaWindow>>>,
}

impl AnalyzeQuota {
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            callers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn per_hour(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60 * 60))
    }

    /// Count one analysis for `caller` at `now`. On refusal returns the time
    /// left until the caller's window resets.
    async fn admit(&self, caller: &Caller, now: Instant) -> Result<(), Duration> {
        let mut callers = self.callers.lock().await;
        let window = callers.entry(caller.clone()).or_insert(QuotaWindow {
            started_at: now,
            used: 0,
        });

        let elapsed = now.saturating_duration_since(window.started_at);
        if elapsed >= self.window {
            window.started_at = now;
            window.used = 0;
        } else if window.used >= self.limit {
            return Err(self.window.saturating_sub(elapsed));
        }

        window.used += 1;
        Ok(())
    }
}

/// Route layer for `POST /analyze`; answers 429 with `Retry-After` once the
/// caller's quota is spent.
pub async fn limit_analyses(
    State(quota): State<AnalyzeQuota>,
    req: Request,
    next: Next,
) -> Response {
    let caller = req
        .extensions()
        .get::<Caller>()
        .cloned()
        .unwrap_or(Caller::Anonymous);

    let Err(retry_after) = quota.admit(&caller, Instant::now()).await else {
        return next.run(req).await;
    };

    let secs = retry_after.as_secs().max(1);
    tracing::warn!(?caller, retry_after_secs = secs, "analysis quota exhausted");
    let mut res = ApiError::new(
        request_id_of(&req),
        "rate_limited",
        format!("analysis quota exhausted; retry in {secs}s"),
    )
    .into_response();
    res.headers_mut().insert(RETRY_AFTER, HeaderValue::from(secs));
    res
}
