use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::api::InferenceClient;
use crate::http::{HttpClient, RetryPolicy};
use crate::runtime::Runtime;

/// Environment variable overriding the inference API base URL.
pub const API_URL_ENV: &str = "EYESSISTANT_API_URL";

/// Hosted inference endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://eyessistant-api.onrender.com";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "eyessistant-cli";

/// Settings needed to talk to the inference API.
pub struct Config<R: Runtime> {
    pub runtime: R,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl<R: Runtime> Config<R> {
    /// Resolves the base URL from `api_url`, then `EYESSISTANT_API_URL`, then the hosted default.
    pub fn new(runtime: R, api_url: Option<String>) -> Self {
        let base_url = resolve_base_url(&runtime, api_url);
        Self {
            runtime,
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_http_client(&self) -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    /// Builds the inference client, consuming the configuration.
    pub fn into_client(self) -> Result<InferenceClient<R>> {
        let client = self.build_http_client()?;
        Ok(InferenceClient::new(
            self.runtime,
            HttpClient::new(client),
            &self.base_url,
            self.retry,
        ))
    }
}

fn resolve_base_url<R: Runtime>(runtime: &R, api_url: Option<String>) -> String {
    let explicit = api_url.filter(|url| !url.trim().is_empty());
    let url = match explicit {
        Some(url) => url,
        None => match runtime.env_var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!("Using {} from environment: {}", API_URL_ENV, url);
                url
            }
            _ => DEFAULT_API_URL.to_string(),
        },
    };

    url.trim().trim_end_matches('/').to_string()
}
