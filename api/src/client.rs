//! HTTP client for the Freizeit events backend

use crate::{
    config::ApiConfig,
    error::{ApiError, ConfigError, Result},
    health::{HealthCache, HealthStatus},
    provider::EventsApi,
    session::SessionStore,
    types::{
        Comment, CommentId, Event, EventId, Friend, LeaveOutcome, ListResponse, Participant,
        UserId, sort_newest_first,
    },
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether a request must carry the session token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Auth {
    /// Send the token if there is one
    Optional,
    /// Fail with [`ApiError::NotAuthenticated`] if there is none
    Required,
}

/// Freizeit API client
///
/// Cheap to clone; clones share the HTTP connection pool, session store and
/// health cache.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    session: Arc<dyn SessionStore>,
    health: Arc<HealthCache>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: ApiConfig, session: Arc<dyn SessionStore>) -> std::result::Result<Self, ConfigError> {
        let config = config.validated()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            health: Arc::new(HealthCache::new(config.health_ttl())),
            config,
            session,
        })
    }

    /// Create a client configured from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configured base URL is invalid.
    pub fn from_env(session: Arc<dyn SessionStore>) -> std::result::Result<Self, ConfigError> {
        Self::new(ApiConfig::from_env()?, session)
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The session store the client reads its token from
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve a media path returned by the backend to an absolute URL
    ///
    /// Absolute URLs are returned unchanged; relative paths are resolved
    /// against the server root (the base URL without `/api`).
    #[must_use]
    pub fn absolute_media_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let root = self.config.media_root();
        if path.starts_with('/') {
            format!("{root}{path}")
        } else {
            format!("{root}/{path}")
        }
    }

    /// Check `GET /health/`
    ///
    /// The result, including failures, is cached for the configured TTL.
    pub async fn check_health(&self) -> HealthStatus {
        if let Some(cached) = self.health.get().await {
            debug!(?cached, "Skipping health check (cached)");
            return cached;
        }

        let url = self.url("/health/");
        debug!(%url, "Checking backend health");
        let status = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) => HealthStatus::Unhealthy {
                reason: format!("status {}", response.status().as_u16()),
            },
            Err(e) => HealthStatus::Unhealthy {
                reason: e.to_string(),
            },
        };

        self.health.put(status.clone()).await;
        status
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder, auth: Auth) -> Result<RequestBuilder> {
        match self.session.token() {
            Some(token) => Ok(request.header(AUTHORIZATION, format!("Token {token}"))),
            None if auth == Auth::Required => Err(ApiError::NotAuthenticated),
            None => Ok(request),
        }
    }

    /// Send a request and turn non-success statuses into errors
    async fn dispatch(&self, request: RequestBuilder, auth: Auth) -> Result<Response> {
        let response = self
            .authorize(request, auth)?
            .send()
            .await
            .map_err(|e| ApiError::Unreachable {
                url: self.config.base_url.clone(),
                reason: e.to_string(),
            })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(self.failure(status, &body))
    }

    fn failure(&self, status: StatusCode, body: &str) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Session rejected (401); clearing stored session");
                self.session.clear();
                ApiError::Unauthorized
            },
            StatusCode::FORBIDDEN => {
                warn!("Session rejected (403); clearing stored session");
                self.session.clear();
                ApiError::Forbidden
            },
            status => match extract_error_message(body) {
                Some(message) => ApiError::Rejected {
                    status: status.as_u16(),
                    message,
                },
                None => ApiError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                },
            },
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T> {
        let response = self.dispatch(self.client.get(self.url(path)), auth).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
    }

    /// Send a mutating request; an empty or non-JSON body counts as success
    async fn mutate(&self, request: RequestBuilder) -> Result<Option<Value>> {
        let response = self.dispatch(request, Auth::Required).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_slice(&bytes).ok())
    }
}

impl EventsApi for ApiClient {
    fn fetch_event(&self, event_id: EventId) -> impl Future<Output = Result<Event>> + Send {
        async move {
            let mut event: Event = self
                .get_json(&format!("/events/{event_id}/"), Auth::Optional)
                .await?;

            if self.session.token().is_some() {
                match self.fetch_participants(event_id).await {
                    Ok(participants) => event.participants = Some(participants),
                    Err(error) => {
                        warn!(%event_id, %error, "Failed to load participants; continuing without them");
                    },
                }
            }

            Ok(event)
        }
    }

    fn fetch_participants(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Participant>>> + Send {
        async move {
            let list: ListResponse<Participant> = self
                .get_json(&format!("/events/{event_id}/participants/"), Auth::Required)
                .await?;
            let mut participants = list.into_vec();
            sort_newest_first(&mut participants);
            debug!(%event_id, count = participants.len(), "Loaded participants");
            Ok(participants)
        }
    }

    fn join_event(&self, event_id: EventId) -> impl Future<Output = Result<()>> + Send {
        async move {
            let request = self
                .client
                .post(self.url(&format!("/events/{event_id}/participants/")))
                .json(&json!({}));
            self.mutate(request).await?;
            Ok(())
        }
    }

    fn leave_event(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<LeaveOutcome>> + Send {
        async move {
            let participants = self.fetch_participants(event_id).await?;
            let Some(record) = participants.iter().find(|p| p.user.id == user_id) else {
                debug!(%event_id, %user_id, "No participation record; nothing to delete");
                return Ok(LeaveOutcome::NotParticipant);
            };

            let participation_id = record.id;
            let request = self.client.delete(self.url(&format!(
                "/events/{event_id}/participants/{participation_id}/"
            )));
            self.mutate(request).await?;
            Ok(LeaveOutcome::Removed { participation_id })
        }
    }

    fn fetch_comments(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send {
        async move {
            let list: ListResponse<Comment> = self
                .get_json(&format!("/events/{event_id}/comments/"), Auth::Optional)
                .await?;
            Ok(list.into_vec())
        }
    }

    fn add_comment(
        &self,
        event_id: EventId,
        text: String,
    ) -> impl Future<Output = Result<Comment>> + Send {
        async move {
            let request = self
                .client
                .post(self.url(&format!("/events/{event_id}/comments/")))
                .json(&json!({ "text": text }));
            let body = self.mutate(request).await?.ok_or_else(|| {
                ApiError::ResponseParseFailed("empty response to comment creation".to_string())
            })?;
            serde_json::from_value(body).map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
        }
    }

    fn delete_comment(&self, comment_id: CommentId) -> impl Future<Output = Result<()>> + Send {
        async move {
            let request = self.client.delete(self.url(&format!("/comments/{comment_id}/")));
            self.mutate(request).await?;
            Ok(())
        }
    }

    fn fetch_friend_ids(&self) -> impl Future<Output = Result<Vec<UserId>>> + Send {
        async move {
            let list: ListResponse<Friend> = self.get_json("/friends/list/", Auth::Required).await?;
            Ok(list.into_vec().into_iter().map(|friend| friend.id).collect())
        }
    }
}

/// Pull a human-readable message out of a backend error body
///
/// Prefers the keys `error`, `detail`, `message` and `non_field_errors`, then
/// any other field. Arrays of strings are joined with spaces.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value {
        Value::Object(fields) => ["error", "detail", "message", "non_field_errors"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(flatten_message))
            .or_else(|| fields.values().find_map(flatten_message)),
        _ => flatten_message(&value),
    }
}

fn flatten_message(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_message).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        },
        _ => None,
    }
}
