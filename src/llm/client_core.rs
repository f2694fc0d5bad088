use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::LlmConfig;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    pub url: String,
    pub(crate) inner: reqwest::Client,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_llm_config(url, LlmConfig::default())
    }

    pub fn with_llm_config(url: impl Into<String>, cfg: LlmConfig) -> Result<Self> {
        // read_timeout bounds each read of the streamed body, not the whole turn
        let inner = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .read_timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .context("build http client")?;
        Ok(Self {
            url: url.into(),
            inner,
        })
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_configured_endpoint() {
        let client = OllamaClient::new("http://localhost:11434/api/chat").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn builds_with_custom_timeouts() {
        let cfg = LlmConfig {
            request_timeout_ms: 5_000,
            connect_timeout_ms: 250,
        };
        let client = OllamaClient::with_llm_config("http://127.0.0.1:1/api/chat", cfg).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/api/chat");
    }
}
