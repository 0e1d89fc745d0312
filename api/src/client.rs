//! Authenticated request wrapper.
//!
//! Every endpoint call funnels through [`ApiClient::request`], which:
//! - attaches `Authorization: Bearer <access>` when a token is held,
//! - sets a JSON content type unless the body is multipart,
//! - on `401`, refreshes the access token once and retries the original
//!   request once with the new token,
//! - on refresh failure (or no refresh token), clears the session and
//!   abandons the call with [`ApiError::SessionExpired`].
//!
//! A refreshed token is only kept if the session still holds the refresh
//! token it was obtained with. A logout or new login during the refresh wins,
//! and the call is abandoned with `SessionExpired` instead of retried.
//!
//! CONCURRENCY
//! ===========
//! Refreshes are serialized behind an async mutex. A caller that acquires it
//! after another caller already rotated the access token reuses the new
//! token instead of refreshing again, so concurrent 401s share one refresh.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use futures::lock::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ApiError, HttpError};
use crate::session::Session;
use crate::transport::{Body, HttpRequest, HttpResponse, Method, Transport};
use crate::types::RefreshResult;

pub(crate) const REFRESH_PATH: &str = "/auth/token/refresh/";

/// Whether a call carries the session's bearer token and participates in
/// refresh-and-retry. Login, registration, and refresh itself do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    Anonymous,
}

pub struct ApiClient<T> {
    transport: T,
    config: ApiConfig,
    session: Session,
    refresh_gate: Mutex<()>,
}

impl<T: Transport> ApiClient<T> {
    #[must_use]
    pub fn new(transport: T, config: ApiConfig, session: Session) -> Self {
        Self { transport, config, session, refresh_gate: Mutex::new(()) }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send an authenticated request and return the parsed JSON body, or
    /// `None` for an empty (204) response.
    ///
    /// # Errors
    ///
    /// - [`ApiError::SessionExpired`] when authorization failed and could not
    ///   be refreshed (the session has been cleared).
    /// - [`ApiError::Http`] for any other non-success status.
    /// - [`ApiError::Transport`] / [`ApiError::Decode`] for network and
    ///   parse failures.
    pub async fn request(&self, method: Method, path: &str, body: Body) -> Result<Option<Value>, ApiError> {
        self.dispatch(method, path, body, Auth::Bearer).await
    }

    /// Like [`Self::request`] but decodes the body into `R`.
    ///
    /// # Errors
    ///
    /// As [`Self::request`], plus [`ApiError::EmptyBody`] when the server
    /// returned no content.
    pub async fn fetch<R: DeserializeOwned>(&self, method: Method, path: &str, body: Body) -> Result<R, ApiError> {
        let value = self.request(method, path, body).await?.ok_or(ApiError::EmptyBody)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Like [`Self::request`] for calls whose body is irrelevant (deletes).
    ///
    /// # Errors
    ///
    /// As [`Self::request`].
    pub async fn execute(&self, method: Method, path: &str, body: Body) -> Result<(), ApiError> {
        self.request(method, path, body).await.map(|_| ())
    }

    pub(crate) async fn fetch_anonymous<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<R, ApiError> {
        let value = self.dispatch(method, path, body, Auth::Anonymous).await?.ok_or(ApiError::EmptyBody)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn dispatch(&self, method: Method, path: &str, body: Body, auth: Auth) -> Result<Option<Value>, ApiError> {
        let sent_token = match auth {
            Auth::Bearer => self.session.access_token(),
            Auth::Anonymous => None,
        };
        let response = self.send_once(method, path, &body, sent_token.as_deref()).await?;
        if response.status != 401 || auth == Auth::Anonymous {
            return decode_body(response);
        }

        let Some(token) = self.refresh_access_token(sent_token.as_deref()).await else {
            return Err(ApiError::SessionExpired);
        };
        let retried = self.send_once(method, path, &body, Some(&token)).await?;
        decode_body(retried)
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: &Body,
        token: Option<&str>,
    ) -> Result<HttpResponse, ApiError> {
        let request = build_request(&self.config, method, path, body, token);
        let response = self.transport.send(request).await?;
        tracing::debug!(method = method.as_str(), path, status = response.status, "api request");
        Ok(response)
    }

    /// Obtain a fresh access token after `stale` was rejected.
    ///
    /// Returns `None` (after clearing the session) when no refresh token is
    /// held or the refresh call fails.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Option<String> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.session.access_token();
        if current.is_some() && current.as_deref() != stale {
            return current;
        }

        let Some(refresh) = self.session.refresh_token() else {
            self.session.expire();
            return None;
        };

        let body = Body::Json(serde_json::json!({ "refresh": refresh }));
        let request = build_request(&self.config, Method::Post, REFRESH_PATH, &body, None);
        let access = match self.transport.send(request).await {
            Ok(response) if response.is_success() => match serde_json::from_str::<RefreshResult>(&response.body) {
                Ok(parsed) => Some(parsed.access),
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh returned an unreadable body");
                    None
                }
            },
            Ok(response) => {
                tracing::warn!(status = response.status, "token refresh rejected");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                None
            }
        };

        match access {
            Some(access) if self.session.replace_access_if(&refresh, &access) => Some(access),
            Some(_) => {
                tracing::info!("session changed during token refresh; dropping refreshed token");
                None
            }
            None => {
                self.session.expire_if(&refresh);
                None
            }
        }
    }
}

fn build_request(config: &ApiConfig, method: Method, path: &str, body: &Body, token: Option<&str>) -> HttpRequest {
    let mut headers = Vec::with_capacity(2);
    if let Some(token) = token {
        headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
    }
    if !body.is_multipart() {
        headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
    }
    HttpRequest { method, url: config.endpoint_url(path), headers, body: body.clone() }
}

fn decode_body(response: HttpResponse) -> Result<Option<Value>, ApiError> {
    if !response.is_success() {
        return Err(HttpError::from_body(response.status, &response.body).into());
    }
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&response.body)?))
}
