//! Finexus API Client
//!
//! Single request pipeline shared by every resource service:
//!
//! 1. **Request side**: reads the session token and, when present and not expired,
//!    attaches it as `Authorization: Bearer <token>`. Method, URL and headers are
//!    logged at debug level with the credential masked.
//! 2. **Response side**: successes pass through untouched. A 401 clears the session
//!    cookie and sends the user to `/login`. Every other failure is returned to
//!    the caller as an [`AppError`].
//!
//! There is no retry and no cache; every call is a fresh round trip bounded by
//! `ApiConfig::timeout` (30 s by default).

use crate::config::ApiConfig;
use crate::models::Document;
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use crate::types::{AppError, AppResult};
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Client(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.send(self.http.get(self.url(path))).await?;
        Self::decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        Self::decode(response).await
    }

    /// POST whose success carries no meaningful body.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> AppResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.put(self.url(path)).json(body)).await?;
        Self::decode(response).await
    }

    /// PUT answered with a plain-text confirmation.
    pub async fn put_text<B>(&self, path: &str, body: &B) -> AppResult<String>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(self.http.put(self.url(path)).json(body)).await?;
        let text = response.text().await.map_err(Self::transport_error)?;
        Ok(text.trim().trim_matches('"').to_string())
    }

    /// GET a binary payload (boleto PDF and the like).
    pub async fn get_document(&self, path: &str, fallback_name: &str) -> AppResult<Document> {
        let response = self.send(self.http.get(self.url(path))).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<mime::Mime>().ok());
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| fallback_name.to_string());

        let bytes = response.bytes().await.map_err(Self::transport_error)?;

        Ok(Document {
            bytes,
            content_type,
            file_name,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let builder = match self.current_token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let request = builder
            .build()
            .map_err(|e| AppError::Client(e.to_string()))?;

        debug!(
            method = %request.method(),
            url = %request.url(),
            headers = ?masked_headers(request.headers()),
            "Sending request"
        );

        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "Request failed without response");
            Self::transport_error(e)
        })?;

        let status = response.status();
        debug!(method = %method, url = %url, status = status.as_u16(), "Received response");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized().await;
            return Err(AppError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body);
        warn!(method = %method, url = %url, status = status.as_u16(), message = ?message, "Backend returned an error");

        Err(AppError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn current_token(&self) -> Option<String> {
        match self.session.load().await {
            Ok(session) => session.token().map(str::to_string),
            Err(e) => {
                warn!("Could not read session, sending request without token: {}", e);
                None
            }
        }
    }

    async fn handle_unauthorized(&self) {
        warn!("Backend rejected the session token, logging out");
        if let Err(e) = self.session.clear_cookie().await {
            error!("Failed to clear session cookie: {}", e);
        }
        self.navigator.navigate(Route::Login);
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let bytes = response.bytes().await.map_err(Self::transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::Decode(e.to_string()))
    }

    fn transport_error(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout
        } else if e.is_builder() {
            AppError::Client(e.to_string())
        } else if e.is_decode() {
            AppError::Decode(e.to_string())
        } else {
            AppError::Connectivity(e.to_string())
        }
    }
}

/// Pulls a human-readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["message", "mensagem", "error", "erro"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string),
        Ok(serde_json::Value::String(text)) => Some(text),
        Ok(_) => None,
        // HTML error pages are noise
        Err(_) if trimmed.starts_with('<') => None,
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Suggested file name from `Content-Disposition`, reduced to its last path
/// component. The name is used as a local path, so directories are dropped.
fn file_name_from_disposition(value: &str) -> Option<String> {
    let raw = value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim_matches('"');

    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

fn mask_credential(value: &str) -> String {
    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    let tail: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("Bearer ••••{}", tail)
}

fn masked_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let raw = value.to_str().unwrap_or("<binary>");
            let shown = if *name == AUTHORIZATION {
                mask_credential(raw)
            } else {
                raw.to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::models::{Role, User};
    use crate::navigation::HistoryNavigator;
    use crate::session::{MemorySessionStore, Session};
    use chrono::Utc;

    pub(crate) struct Harness {
        pub client: ApiClient,
        pub session: Arc<MemorySessionStore>,
        pub navigator: Arc<HistoryNavigator>,
    }

    pub(crate) fn sample_user(id: i64, role: Role) -> User {
        User {
            id,
            name: "Maria Silva".into(),
            email: "maria@example.com".into(),
            document: "123.456.789-00".into(),
            phone: Some("11999990000".into()),
            role,
        }
    }

    pub(crate) fn harness(base_url: &str) -> Harness {
        harness_with(base_url, Session::default())
    }

    pub(crate) fn logged_in(base_url: &str, token: &str, role: Role) -> Harness {
        harness_with(
            base_url,
            Session::for_user(token, &sample_user(1, role), Utc::now()),
        )
    }

    pub(crate) fn harness_with(base_url: &str, session: Session) -> Harness {
        harness_for(&ApiConfig::new(base_url), session)
    }

    pub(crate) fn harness_for(config: &ApiConfig, session: Session) -> Harness {
        let store = Arc::new(MemorySessionStore::with_session(session));
        let navigator = Arc::new(HistoryNavigator::new());
        let client = ApiClient::new(config, store.clone(), navigator.clone())
            .expect("client builds");
        Harness {
            client,
            session: store,
            navigator,
        }
    }
}
