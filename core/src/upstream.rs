use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::errors::UpstreamError;

/// HTTP client for the server the watch talks to.
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&format!(
            "{}://{}:{}/",
            config.scheme, config.host, config.port
        ))
        .map_err(|e| UpstreamError::InvalidUrl {
            reason: e.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl {
                reason: format!("{} cannot carry a path", base_url),
            });
        }

        let mut builder = Client::builder();
        if config.accept_http09 {
            builder = builder.http09_responses();
        }
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder.build().map_err(|e| UpstreamError::ClientCreation {
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `payload` to the base URL as a single, percent-encoded path segment.
    pub fn target_url(&self, payload: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl {
                reason: format!("{} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .push(payload);
        Ok(url)
    }

    /// Issues one GET for `payload` and returns the body text.
    ///
    /// Any status code counts as a response; only transport failures are errors.
    pub async fn fetch(&self, payload: &str) -> Result<String, UpstreamError> {
        let url = self.target_url(payload)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream answered {} for {}", status, url);
        }

        response
            .text()
            .await
            .map_err(|source| UpstreamError::Transport { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig::default()).unwrap()
    }

    #[test]
    fn test_target_url_appends_payload() {
        let client = client();
        for payload in ["b", "d", "status42", "t-1_x~"] {
            assert_eq!(
                client.target_url(payload).unwrap().as_str(),
                format!("http://10.0.0.4:3002/{payload}")
            );
        }
    }

    #[test]
    fn test_target_url_encodes_reserved_characters() {
        let url = client().target_url("a b/c?d#e").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.4:3002/a%20b%2Fc%3Fd%23e");
        assert_eq!(url.host_str(), Some("10.0.0.4"));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_empty_payload_targets_root() {
        assert_eq!(
            client().target_url("").unwrap().as_str(),
            "http://10.0.0.4:3002/"
        );
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = UpstreamConfig {
            host: "bad host".to_string(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            UpstreamClient::new(&config),
            Err(UpstreamError::InvalidUrl { .. })
        ));
    }
}
