//! HTTP pose provider
//!
//! POSTs `{"gloss": "<token>"}` to the pose generation service and decodes
//! the response with [`crate::decode_payload`].

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use glossa_core::{AnimationPayload, GlossaError, GlossaResult};

use crate::{decode_payload, PoseProvider, ProviderFuture};

/// Default pose generation endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/generate-avatar";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct GlossRequest<'a> {
    gloss: &'a str,
}

/// Fetches payloads from a remote pose generation service
#[derive(Debug, Clone)]
pub struct HttpPoseProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPoseProvider {
    /// Build a provider for `endpoint`; every request is bounded by `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> GlossaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GlossaError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(HttpPoseProvider {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, gloss: &str) -> GlossaResult<AnimationPayload> {
        debug!("Requesting pose data for {:?} from {}", gloss, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GlossRequest { gloss })
            .send()
            .await
            .map_err(|e| GlossaError::fetch(gloss, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GlossaError::fetch(gloss, format!("provider returned {status}")));
        }

        let body = response.bytes().await.map_err(|e| GlossaError::fetch(gloss, e))?;
        decode_payload(gloss, &body)
    }
}

impl PoseProvider for HttpPoseProvider {
    fn fetch<'a>(&'a self, gloss: &'a str) -> ProviderFuture<'a> {
        Box::pin(self.request(gloss))
    }
}
