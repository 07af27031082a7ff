//! Single egress point for REST calls.
//!
//! Every request gets the bearer token of the shared session (when present),
//! JSON headers, the configured timeout and an `X-Request-Id`. Failures are
//! classified, logged here, and returned unchanged to the caller.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorKind};
use crate::session::SessionHandle;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionHandle>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionHandle>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::ClientConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path).query(query);
        let response = self.send(Method::GET, path, request).await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        let response = self.send(Method::POST, path, request).await?;
        decode(response).await
    }

    /// POST whose response body is irrelevant (only the status matters).
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, request).await.map(drop)
    }

    /// POST whose response body is informational: an empty or unreadable
    /// 2xx body yields `None` instead of an error.
    pub async fn post_lenient<B>(&self, path: &str, body: &B) -> Result<Option<Value>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        let response = self.send(Method::POST, path, request).await?;
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path, error = %err, "could not read response body; ignoring it");
                return Ok(None);
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(path, error = %err, "response body is not JSON; ignoring it");
                Ok(None)
            }
        }
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path).json(body);
        let response = self.send(Method::PUT, path, request).await?;
        decode(response).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, path).json(body);
        let response = self.send(Method::PATCH, path, request).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, request).await.map(drop)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, url);
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let request_id = Uuid::now_v7();
        let span = info_span!("api_request", %request_id, %method, path);

        async move {
            let result = request
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(err) => {
                    let err = ApiError::from(err);
                    log_failure(&err);
                    return Err(err);
                }
            };

            let status = response.status();
            if status.is_success() {
                debug!(status = status.as_u16(), "request succeeded");
                return Ok(response);
            }

            // Error bodies are best effort: HTML error pages just yield no detail.
            let body = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice(&bytes).ok());
            let err = ApiError::status_error(status, body);

            if err.kind() == ApiErrorKind::Unauthorized && self.session.clear_access_token().await {
                warn!("access token rejected; stored access token cleared");
            }

            log_failure(&err);
            Err(err)
        }
        .instrument(span)
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::from)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        let err = ApiError::Decode(e.to_string());
        log_failure(&err);
        err
    })
}

fn log_failure(err: &ApiError) {
    match err.kind() {
        ApiErrorKind::Unauthorized => warn!(error = %err, "unauthorized"),
        ApiErrorKind::Forbidden => warn!(error = %err, "forbidden"),
        ApiErrorKind::NotFound => warn!(error = %err, "resource not found"),
        ApiErrorKind::ValidationRejected => warn!(error = %err, detail = ?err.detail(), "request rejected"),
        ApiErrorKind::ServerFault => error!(error = %err, "server error"),
        ApiErrorKind::NetworkUnreachable => error!(error = %err, "no response from server"),
        ApiErrorKind::ClientConfigError => error!(error = %err, "could not build request"),
        ApiErrorKind::Decode => error!(error = %err, "unexpected response body"),
    }
}
