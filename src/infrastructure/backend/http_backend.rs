//! HTTP adapter for the hosted Mixwave backend.
//!
//! Everything transport-shaped is folded into the [`InteractionError`]
//! taxonomy here, at the boundary: timeouts and connection failures become
//! `Transient`, gateway-class statuses become `Transient`, 400/422 become
//! `Validation` carrying the server's message, and so on. Nothing above this
//! module ever sees a status code.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::interaction::backend::{
    CommentRecord, CreateComment, EntityDocument, InteractionBackend, ToggleReceipt,
};
use crate::domain::interaction::errors::InteractionError;
use crate::domain::interaction::stats::EntityRef;
use crate::domain::session::entity::Session;
use crate::domain::session::provider::SessionProvider;
use crate::domain::shared::pagination::PaginationRequest;

fn build_client(timeout: Duration, bearer_token: Option<&str>) -> anyhow::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = bearer_token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
    }
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

fn classify_transport(err: reqwest::Error) -> InteractionError {
    if err.is_timeout() {
        InteractionError::Transient("request timeout".into())
    } else if err.is_connect() {
        InteractionError::Transient("connection failed".into())
    } else {
        InteractionError::Unknown(err.to_string())
    }
}

fn classify_status(status: StatusCode, message: Option<String>) -> InteractionError {
    let detail = message.unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::UNAUTHORIZED => InteractionError::Unauthenticated,
        StatusCode::FORBIDDEN => InteractionError::Permission(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            InteractionError::Validation(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => InteractionError::RateLimited,
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => InteractionError::Transient(detail),
        _ => InteractionError::Unknown(detail),
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn reject(response: reqwest::Response) -> InteractionError {
    let status = response.status();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .map(|envelope| envelope.error.message);
    classify_status(status, message)
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        bearer_token: Option<&str>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout, bearer_token)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl InteractionBackend for HttpBackend {
    async fn toggle_like(
        &self,
        entity: EntityRef,
        user_id: Uuid,
    ) -> Result<ToggleReceipt, InteractionError> {
        let response = self
            .client
            .post(self.url(&format!("/interactions/{}/toggle-like", entity.id)))
            .json(&json!({ "userId": user_id }))
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        response
            .json::<ToggleReceipt>()
            .await
            .map_err(|e| InteractionError::Unknown(format!("malformed toggle response: {e}")))
    }

    async fn create_comment(
        &self,
        request: &CreateComment,
    ) -> Result<CommentRecord, InteractionError> {
        let response = self
            .client
            .post(self.url("/comments"))
            .header("Idempotency-Key", request.idempotency_key.to_string())
            .json(&json!({
                "entityId": request.entity.id,
                "userId": request.user_id,
                "text": request.text,
            }))
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        response
            .json::<DataEnvelope<CommentRecord>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| InteractionError::Unknown(format!("malformed comment response: {e}")))
    }

    async fn fetch_entity(&self, entity: EntityRef) -> Result<EntityDocument, InteractionError> {
        debug!(entity = %entity, "fetching authoritative entity document");
        let response = self
            .client
            .get(self.url(&format!("/entities/{}", entity.id)))
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        response
            .json::<EntityDocument>()
            .await
            .map_err(|e| InteractionError::Unknown(format!("malformed entity document: {e}")))
    }

    async fn fetch_comments(
        &self,
        entity: EntityRef,
        page: PaginationRequest,
    ) -> Result<Vec<CommentRecord>, InteractionError> {
        let response = self
            .client
            .get(self.url(&format!("/entities/{}/comments", entity.id)))
            .query(&[("limit", page.limit), ("offset", page.offset)])
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        response
            .json::<DataEnvelope<Vec<CommentRecord>>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| InteractionError::Unknown(format!("malformed comment list: {e}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Session endpoint client, sharing the backend's auth and timeout setup.
pub struct HttpSessionProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionProvider {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        bearer_token: Option<&str>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout, bearer_token)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn fetch_session(&self) -> Result<Option<Session>, InteractionError> {
        let response = self
            .client
            .get(format!("{}/auth/session", self.base_url))
            .send()
            .await
            .map_err(classify_transport)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        let payload = response
            .json::<SessionPayload>()
            .await
            .map_err(|e| InteractionError::Unknown(format!("malformed session payload: {e}")))?;
        Ok(Some(Session {
            user_id: payload.user_id,
            expires_at: payload.expires_at,
        }))
    }
}
