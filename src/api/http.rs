use super::types::{
    CommentDraft, CommentItem, CommentLikeAck, FeedBatch, LikeAck, Page, PageRequest,
    PostCommentAck,
};
use super::{ApiError, SocialApi};
use crate::config::FeedConfig;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Per-request deadline. Timeouts and cancellations surface to the
/// engine as ordinary failures.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response bodies are capped at 2MB to prevent memory exhaustion.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Rejected-status bodies are truncated to this many bytes before
/// being carried in the error message.
const MAX_ERROR_SNIPPET: usize = 256;

/// Reqwest-backed implementation of [`SocialApi`].
///
/// Carries the transport hygiene the engine relies on:
///
/// - every call bounded by a 10-second deadline
/// - bodies read through a size-capped stream
/// - non-2xx statuses mapped to [`ApiError::Rejected`] with a truncated
///   body snippet as the message
/// - HTTPS-only base URL, with an HTTP exception for localhost test
///   servers
/// - optional bearer token held in [`SecretString`], never logged
pub struct HttpSocialApi {
    client: reqwest::Client,
    base: String,
    token: Option<SecretString>,
}

impl std::fmt::Debug for HttpSocialApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSocialApi")
            .field("base", &self.base)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpSocialApi {
    /// Create a backend client for `base_url`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidBaseUrl`] if the URL does not parse
    /// - [`ApiError::InsecureBaseUrl`] for non-HTTPS URLs other than
    ///   localhost/127.0.0.1
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        token: Option<SecretString>,
    ) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url)?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    /// Create a backend client from loaded configuration, resolving the
    /// bearer token (env var over config file).
    pub fn from_config(config: &FeedConfig) -> Result<Self, ApiError> {
        let token = config.resolved_token().map(SecretString::from);
        Self::new(reqwest::Client::new(), &config.base_url, token)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            // Base URL already passed the HTTPS/localhost check, so the
            // token never travels over plain HTTP to a remote host.
            Some(token) => request.header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    /// Send a request, enforce the deadline, and map non-2xx statuses.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let request = self.authorize(request);

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| ApiError::Timeout)?
            .map_err(ApiError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = read_limited_bytes(response, MAX_BODY_SIZE)
                .await
                .unwrap_or_default();
            let snippet = &body[..body.len().min(MAX_ERROR_SNIPPET)];
            let message = String::from_utf8_lossy(snippet).into_owned();
            tracing::warn!(
                status = status.as_u16(),
                message = %message,
                "Backend rejected request"
            );
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn expect_ok(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await?;
        Ok(())
    }
}

impl SocialApi for HttpSocialApi {
    async fn fetch_feed(
        &self,
        trending: Option<PageRequest>,
        friends: Option<PageRequest>,
    ) -> Result<FeedBatch, ApiError> {
        let mut query: Vec<(&str, u32)> = Vec::with_capacity(4);
        if let Some(t) = trending {
            query.push(("trendingPage", t.page));
            query.push(("trendingSize", t.size));
        }
        if let Some(f) = friends {
            query.push(("friendsPage", f.page));
            query.push(("friendsSize", f.size));
        }

        let request = self
            .client
            .get(format!("{}/feed", self.base))
            .query(&query);
        self.fetch_json(request).await
    }

    async fn set_challenge_like(
        &self,
        challenge_id: i64,
        liked: bool,
    ) -> Result<LikeAck, ApiError> {
        let request = self
            .client
            .post(format!("{}/challenges/{}/like", self.base, challenge_id))
            .json(&serde_json::json!({ "isLiked": liked }));
        self.fetch_json(request).await
    }

    async fn delete_challenge(&self, challenge_id: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(format!("{}/challenges/{}", self.base, challenge_id));
        self.expect_ok(request).await
    }

    async fn fetch_comments(
        &self,
        challenge_id: i64,
        request: PageRequest,
    ) -> Result<Page<CommentItem>, ApiError> {
        let request = self
            .client
            .get(format!(
                "{}/challenges/{}/comments",
                self.base, challenge_id
            ))
            .query(&[("page", request.page), ("size", request.size)]);
        self.fetch_json(request).await
    }

    async fn post_comment(
        &self,
        challenge_id: i64,
        draft: CommentDraft,
    ) -> Result<PostCommentAck, ApiError> {
        let request = self
            .client
            .post(format!(
                "{}/challenges/{}/comments",
                self.base, challenge_id
            ))
            .json(&draft);
        self.fetch_json(request).await
    }

    async fn delete_comment(&self, challenge_id: i64, comment_id: i64) -> Result<(), ApiError> {
        let request = self.client.delete(format!(
            "{}/challenges/{}/comments/{}",
            self.base, challenge_id, comment_id
        ));
        self.expect_ok(request).await
    }

    async fn set_comment_like(
        &self,
        comment_id: i64,
        liked: bool,
    ) -> Result<CommentLikeAck, ApiError> {
        let request = self
            .client
            .post(format!("{}/comments/{}/like", self.base, comment_id))
            .json(&serde_json::json!({ "isLiked": liked }));
        self.fetch_json(request).await
    }
}

/// Enforce HTTPS for the base URL. HTTP is allowed only for
/// localhost/127.0.0.1 (testing purposes). Returns the base with any
/// trailing slash removed, ready for path concatenation.
fn validate_base_url(base: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(base).map_err(|_| ApiError::InvalidBaseUrl)?;
    match parsed.scheme() {
        "https" => {}
        "http" => {
            let host = parsed.host_str().unwrap_or("");
            if host != "localhost" && host != "127.0.0.1" {
                tracing::error!(
                    base_url = %base,
                    "Rejecting non-HTTPS base URL (HTTPS required except for localhost)"
                );
                return Err(ApiError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base, "Using non-HTTPS backend base URL (localhost only)");
        }
        _ => return Err(ApiError::InvalidBaseUrl),
    }
    Ok(base.trim_end_matches('/').to_string())
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
