//! HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use plunder_api::models::Envelope;
use reqwest::{header, Certificate, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::errors::CappError;
use crate::storage::settings::{ApiPaths, ClientSettings};

/// Raw access to the Plunder API server.
///
/// Every call either yields a fully decoded envelope or fails at the
/// transport level. Rejections carried inside the envelope are left for the
/// caller to inspect.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// GET a path relative to the server base URL
    async fn get(&self, path: &str) -> Result<Envelope, CappError>;

    /// POST a pre-serialized JSON body
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Envelope, CappError>;

    /// DELETE a path relative to the server base URL
    async fn delete(&self, path: &str) -> Result<Envelope, CappError>;
}

/// HTTP gateway backed by reqwest
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client from the client configuration
    pub fn new(settings: &ClientSettings) -> Result<Self, CappError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(30));
        if let Some(pem) = settings.cert_pem()? {
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: settings.base_url()?,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Envelope, CappError> {
        let url = self.base_url.join(path)?;
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        decode_envelope(path, status, &bytes).inspect_err(|e| {
            error!("HTTP {} {} failed: {}", method, path, e);
        })
    }
}

#[async_trait]
impl Gateway for HttpClient {
    async fn get(&self, path: &str) -> Result<Envelope, CappError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Envelope, CappError> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Envelope, CappError> {
        self.send(Method::DELETE, path, None).await
    }
}

/// Decode a response body into an envelope.
///
/// The server reports rejections inside the envelope, sometimes with a
/// non-2xx status, so the body is decoded first. A non-2xx response is only
/// honoured when its envelope carries the rejection.
pub fn decode_envelope(path: &str, status: StatusCode, body: &[u8]) -> Result<Envelope, CappError> {
    match serde_json::from_slice::<Envelope>(body) {
        Ok(envelope) if status.is_success() || envelope.is_rejected() => Ok(envelope),
        Ok(_) => Err(CappError::MalformedEnvelope {
            path: path.to_string(),
            reason: format!("{}: {}", status, String::from_utf8_lossy(body).trim()),
        }),
        Err(e) if status.is_success() => Err(CappError::MalformedEnvelope {
            path: path.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(CappError::MalformedEnvelope {
            path: path.to_string(),
            reason: format!("{}: {}", status, String::from_utf8_lossy(body).trim()),
        }),
    }
}

/// Fail on a rejected envelope, logging any warning it carries
pub fn ensure_accepted(path: &str, envelope: &Envelope) -> Result<(), CappError> {
    if !envelope.warning.is_empty() {
        warn!("{}: {}", path, envelope.warning);
    }
    if envelope.is_rejected() {
        debug!("{} rejected: {}", path, envelope.error);
        return Err(CappError::Rejected {
            error: envelope.error.clone(),
            friendly_error: envelope.friendly_error.clone(),
        });
    }
    Ok(())
}

/// Check an envelope and decode its payload. A rejected envelope never has
/// its payload looked at.
pub fn into_payload<T: DeserializeOwned>(path: &str, envelope: Envelope) -> Result<T, CappError> {
    ensure_accepted(path, &envelope)?;
    let payload = envelope
        .payload
        .ok_or_else(|| CappError::EmptyPayload(path.to_string()))?;
    Ok(serde_json::from_value(payload)?)
}

/// Typed client for the Plunder lease, deployment and parlay APIs
pub struct PlunderClient<G> {
    gateway: G,
    paths: ApiPaths,
}

impl<G: Gateway> PlunderClient<G> {
    /// Create a new typed client over a gateway
    pub fn new(gateway: G, paths: ApiPaths) -> Self {
        Self { gateway, paths }
    }

    /// Get the underlying gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Get the API path layout
    pub fn paths(&self) -> &ApiPaths {
        &self.paths
    }
}
