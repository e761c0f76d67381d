//! REST implementation of [`LongTermSearchProvider`].
//!
//! `RestLongTermClient` wraps a `reqwest::Client` and translates search
//! calls into `POST /v1/long-term-memory/search` against the memory server,
//! with automatic retry + exponential back-off on transient (5xx / timeout)
//! failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use uuid::Uuid;
use wm_domain::config::LongTermConfig;
use wm_domain::error::{Error, Result};
use wm_domain::trace::TraceEvent;

use crate::provider::LongTermSearchProvider;
use crate::types::{LongTermSearchRequest, LongTermSearchResponse};

const SEARCH_PATH: &str = "/v1/long-term-memory/search";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST client for the long-term memory search API.
///
/// Created once and reused for the lifetime of the process.
/// The underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestLongTermClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    max_retries: u32,
}

impl RestLongTermClient {
    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a new client from the shared `LongTermConfig`.
    pub fn new(cfg: &LongTermConfig) -> Result<Self> {
        if cfg.base_url.is_empty() {
            return Err(Error::Config("long_term.base_url must not be empty".into()));
        }

        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let base_url = cfg.base_url.trim_end_matches('/').to_owned();

        Ok(Self {
            http,
            base_url,
            api_key: cfg.api_key.clone(),
            timeout,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let rb = rb
            .header("X-Client-Type", "working-memory")
            .header("X-Trace-Id", &trace_id);

        match self.api_key {
            Some(ref key) => rb.bearer_auth(key),
            None => rb,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Send the request, retrying transient failures up to `max_retries`
    /// times with capped exponential back-off.
    ///
    /// 5xx responses, timeouts and connection errors are retried. 4xx is
    /// final, with 401/403 surfacing as `Error::Auth`. Every attempt emits
    /// a `TraceEvent::LongTermSearchCall`.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut attempt: u32 = 0;
        loop {
            let started = Instant::now();
            let sent = self.decorate(build_request()).send().await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let status = match &sent {
                Ok(resp) => resp.status().as_u16(),
                Err(e) => e.status().map_or(0, |s| s.as_u16()),
            };
            TraceEvent::LongTermSearchCall {
                endpoint: endpoint.to_owned(),
                status,
                duration_ms,
            }
            .emit();

            let err = match sent {
                Ok(resp) => match classify(endpoint, resp).await {
                    Attempt::Done(resp) => return Ok(resp),
                    Attempt::Fatal(err) => return Err(err),
                    Attempt::Transient(err) => err,
                },
                Err(e) => from_reqwest(e),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            attempt += 1;

            let delay = backoff_delay(attempt);
            tracing::debug!(endpoint, attempt, ?delay, error = %err, "retrying long-term search");
            tokio::time::sleep(delay).await;
        }
    }
}

/// What one HTTP exchange means for the retry loop.
enum Attempt {
    Done(Response),
    Transient(Error),
    Fatal(Error),
}

async fn classify(endpoint: &str, resp: Response) -> Attempt {
    let status = resp.status();
    if status.is_success() || status.is_redirection() || status.is_informational() {
        return Attempt::Done(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let code = status.as_u16();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Attempt::Fatal(Error::Auth(format!("{endpoint} auth failed ({code}): {body}")))
    } else if status.is_server_error() {
        Attempt::Transient(Error::LongTerm(format!("{endpoint} returned {code}: {body}")))
    } else {
        Attempt::Fatal(Error::LongTerm(format!("{endpoint} returned {code}: {body}")))
    }
}

const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Delay before retry number `attempt` (1-based): 100ms, 200ms, 400ms, ...
/// capped at [`MAX_BACKOFF`].
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(factor)).min(MAX_BACKOFF)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl LongTermSearchProvider for RestLongTermClient {
    async fn search(&self, req: LongTermSearchRequest) -> Result<LongTermSearchResponse> {
        let url = self.url(SEARCH_PATH);
        let resp = self
            .execute_with_retry("POST /v1/long-term-memory/search", || {
                self.http.post(&url).json(&req)
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            Error::LongTerm(format!("failed to parse search response: {e}: {body}"))
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
