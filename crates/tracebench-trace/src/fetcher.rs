//! Trace retrieval from the observability backend.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{FetchError, Result};
use tracebench_types::TraceDocument;

pub const LANGFUSE_PUBLIC_KEY_ENV: &str = "LANGFUSE_PUBLIC_KEY";
pub const LANGFUSE_SECRET_KEY_ENV: &str = "LANGFUSE_SECRET_KEY";
pub const LANGFUSE_HOST_ENV: &str = "LANGFUSE_HOST";
pub const DEFAULT_LANGFUSE_HOST: &str = "https://cloud.langfuse.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Anything that can hand out a trace document for a trace id.
#[async_trait]
pub trait TraceSource: Send + Sync {
    async fn fetch_trace(&self, trace_id: &str) -> Result<TraceDocument>;
}

/// Connection settings for a Langfuse-compatible backend
#[derive(Debug, Clone)]
pub struct LangfuseConfig {
    pub public_key: String,
    pub secret_key: String,
    pub host: String,
    pub timeout_secs: u64,
}

impl LangfuseConfig {
    pub fn new<P: Into<String>, S: Into<String>>(public_key: P, secret_key: S) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            host: DEFAULT_LANGFUSE_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_host<H: Into<String>>(mut self, host: H) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Read credentials from `LANGFUSE_PUBLIC_KEY` / `LANGFUSE_SECRET_KEY`
    /// and the optional `LANGFUSE_HOST`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let public_key = read(LANGFUSE_PUBLIC_KEY_ENV);
        let secret_key = read(LANGFUSE_SECRET_KEY_ENV);

        match (public_key, secret_key) {
            (Some(public_key), Some(secret_key)) => {
                let config = Self::new(public_key, secret_key);
                Ok(match read(LANGFUSE_HOST_ENV) {
                    Some(host) => config.with_host(host),
                    None => config,
                })
            }
            (public_key, secret_key) => {
                let missing: Vec<&str> = [
                    (public_key.is_none(), LANGFUSE_PUBLIC_KEY_ENV),
                    (secret_key.is_none(), LANGFUSE_SECRET_KEY_ENV),
                ]
                .into_iter()
                .filter_map(|(missing, name)| missing.then_some(name))
                .collect();
                Err(FetchError::missing_credentials(missing.join(", ")))
            }
        }
    }

    /// `GET` endpoint of a single trace
    pub fn trace_url(&self, trace_id: &str) -> String {
        format!(
            "{}/api/public/traces/{}",
            self.host.trim_end_matches('/'),
            trace_id
        )
    }
}

/// HTTP client for the public traces API, authenticated with the key pair.
#[derive(Debug, Clone)]
pub struct LangfuseClient {
    config: LangfuseConfig,
    http: reqwest::Client,
}

impl LangfuseClient {
    pub fn new(config: LangfuseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl TraceSource for LangfuseClient {
    #[instrument(skip(self), fields(host = %self.config.host))]
    async fn fetch_trace(&self, trace_id: &str) -> Result<TraceDocument> {
        let url = self.config.trace_url(trace_id);
        debug!(url = %url, "Fetching trace");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.public_key, Some(&self.config.secret_key))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::status(trace_id, status.as_u16(), body));
        }

        let document = serde_json::from_str(&body).map_err(|e| FetchError::decode(trace_id, e))?;
        debug!(bytes = body.len(), "Trace fetched");
        Ok(document)
    }
}
