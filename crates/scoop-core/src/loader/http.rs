use reqwest::header::{CONTENT_TYPE, USER_AGENT};

use super::{FetchFuture, LoaderConfig, RemoteLoader};
use crate::LoadError;
use crate::payload::{PayloadFormat, decode_records};

/// Fetches the flavor list with a single GET request. No retries.
pub struct HttpLoader {
    client: reqwest::Client,
    config: LoaderConfig,
}

impl HttpLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing client (connection pool, proxy settings).
    pub fn with_client(client: reqwest::Client, config: LoaderConfig) -> Self {
        Self { client, config }
    }
}

impl RemoteLoader for HttpLoader {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch<'a>(&'a self, source: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let resp = self
                .client
                .get(source)
                .header(USER_AGENT, self.config.user_agent.as_str())
                .timeout(self.config.timeout)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(LoadError::Status(status.as_u16()));
            }

            let format = match self.config.format {
                PayloadFormat::Auto => resp
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(PayloadFormat::from_content_type)
                    .unwrap_or_default(),
                forced => forced,
            };

            let body = resp.bytes().await?;
            tracing::debug!(source, bytes = body.len(), ?format, "fetched flavor payload");
            decode_records(&body, format)
        })
    }
}
