// Link liveness probing

use crate::error::Result;
use crate::result::{ProbeOutcome, UnreachableReason};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_USER_AGENT: &str = concat!("mailqa/", env!("CARGO_PKG_VERSION"));

/// A single-shot reachability check. Implementations must not retry and must
/// never fail: every problem is folded into [`ProbeOutcome::Unreachable`].
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// GET-based probe backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_options(timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    fn classify_error(err: &reqwest::Error) -> UnreachableReason {
        if err.is_timeout() {
            UnreachableReason::Timeout
        } else if err.is_builder() {
            UnreachableReason::InvalidUrl
        } else if err.is_connect() {
            UnreachableReason::Connect
        } else {
            UnreachableReason::Request(err.to_string())
        }
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        debug!("Probing {}", url);

        let start = Instant::now();
        let outcome = match self.client.get(url).send().await {
            Ok(response) if response.status() == StatusCode::OK => ProbeOutcome::Reachable,
            Ok(response) => {
                ProbeOutcome::Unreachable(UnreachableReason::Status(response.status().as_u16()))
            }
            Err(e) => ProbeOutcome::Unreachable(Self::classify_error(&e)),
        };

        debug!("Probe of {} finished in {:?}: {:?}", url, start.elapsed(), outcome);
        outcome
    }
}
