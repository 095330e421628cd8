//! HTTP plumbing shared by every service: bearer token, JSON content type,
//! status mapping and the 401 policy.

use std::sync::Arc;

use reqwest::{
    header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    multipart::Form,
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::{ApiError, ApiException};
use tracing::{debug, warn};

use crate::{
    config::UnauthorizedPolicy,
    error::{ClientError, Result},
    session::SessionContext,
};

const JSON_MIME: &str = "application/json";

/// Query for endpoints that take no parameters.
pub const NO_QUERY: &[(&str, &str)] = &[];

/// One logical API base (clients, policies, ...) sharing the session and the
/// underlying connection pool with the others.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
    unauthorized: UnauthorizedPolicy,
}

impl ApiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        session: Arc<SessionContext>,
        unauthorized: UnauthorizedPolicy,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            unauthorized,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str, multipart: bool) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = self.session.token().await {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if !multipart {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME));
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.send_with(builder, true).await
    }

    async fn send_with(&self, builder: RequestBuilder, session_bound: bool) -> Result<Response> {
        let request = builder.build()?;
        debug!(method = %request.method(), url = %request.url(), "api request");
        let response = self.http.execute(request).await?;
        self.check_status(response, session_bound).await
    }

    /// A 401 on a session-bound request means the token expired and goes
    /// through the configured policy; anywhere else it is a plain API error.
    async fn check_status(&self, response: Response, session_bound: bool) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if session_bound && status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "token expired or invalid");
            if self.unauthorized == UnauthorizedPolicy::Logout {
                if let Err(err) = self.session.clear().await {
                    warn!(%err, "failed to clear session after 401");
                }
            }
            return Err(ClientError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
            ApiError::new(
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_default(),
            )
        });
        Err(ApiException::new(status.as_u16(), &api_error).into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            ClientError::InvalidResponse(format!("unexpected response body: {err}"))
        })
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path, false).await.query(query);
        Self::decode(self.send(builder).await?).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path, false).await.json(body);
        Self::decode(self.send(builder).await?).await
    }

    /// POST for the credential endpoints (login, register, password reset).
    /// Rejections never touch the current session.
    pub async fn post_public<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path, false).await.json(body);
        Self::decode(self.send_with(builder, false).await?).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path, false).await.json(body);
        Self::decode(self.send(builder).await?).await
    }

    /// DELETE; the body of the answer is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path, false).await;
        self.send(builder).await?;
        Ok(())
    }

    /// Multipart POST; reqwest sets the boundary content type itself.
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let builder = self.request(Method::POST, path, true).await.multipart(form);
        Self::decode(self.send(builder).await?).await
    }

    /// Raw download, used for the Excel exports.
    pub async fn get_bytes(&self, path: &str, accept: &'static str) -> Result<Vec<u8>> {
        let builder = self
            .request(Method::GET, path, false)
            .await
            .header(ACCEPT, HeaderValue::from_static(accept));
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
