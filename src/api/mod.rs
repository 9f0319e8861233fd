//! HTTP client scoped to an organization and, optionally, a workspace.
//!
//! Every data-fetching and mutation path goes through [`ApiCall`], built by
//! [`create_api_call`], so that scoping headers and the organization path
//! prefix are applied uniformly.
//!
//! # Security Note - Logging
//!
//! The bearer token is marked sensitive on the header value, so reqwest prints
//! it as `Sensitive` in debug output. Request logging in this module records
//! the method, path, scope and request id only.

pub mod envelope;

use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretBox};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{LeadflowError, Result};

pub use envelope::{Envelope, Page, SUCCESS_CODE};

pub const ORG_HEADER: &str = "x-organization-id";
pub const WORKSPACE_HEADER: &str = "x-workspace-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Organization/workspace partition applied to every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub org_id: String,
    pub workspace_id: Option<String>,
}

impl Scope {
    pub fn new(org_id: impl Into<String>, workspace_id: Option<&str>) -> Self {
        Self {
            org_id: org_id.into(),
            workspace_id: workspace_id.map(str::to_string),
        }
    }

    pub fn org(org_id: impl Into<String>) -> Self {
        Self::new(org_id, None)
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.workspace_id {
            Some(ws) => write!(f, "{}/{}", self.org_id, ws),
            None => write!(f, "{}", self.org_id),
        }
    }
}

/// Path below the organization prefix, held as separate segments.
///
/// Fixed endpoint paths are split on `/`. Caller-supplied ids are appended
/// with [`ApiPath::id`] and always occupy exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append one id segment. `/` inside the id is percent-encoded.
    pub fn id(mut self, id: &str) -> Result<Self> {
        check_segment(id)?;
        self.segments.push(id.to_string());
        Ok(self)
    }

    /// Append another fixed segment.
    pub fn join(mut self, segment: &str) -> Self {
        self.segments.extend(ApiPath::new(segment).segments);
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&str> for ApiPath {
    fn from(path: &str) -> Self {
        ApiPath::new(path)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Empty, `.` and `..` would silently address another resource.
fn check_segment(segment: &str) -> Result<()> {
    if segment.trim().is_empty() || segment == "." || segment == ".." {
        return Err(LeadflowError::InvalidPathSegment(segment.to_string()));
    }
    Ok(())
}

/// Connection settings shared by every [`ApiCall`].
pub struct ApiSettings {
    pub base_url: Url,
    pub token: Option<SecretBox<String>>,
    pub timeout: Duration,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiSettings {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            LeadflowError::Config(format!("invalid base URL '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LeadflowError::Config(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(30),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut settings = Self::new(&config.base_url())?.with_timeout(config.timeout());
        if let Some(token) = config.api_token() {
            settings = settings.with_token(token);
        }
        Ok(settings)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretBox::new(Box::new(token.into())));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build a client for `org_id`, optionally narrowed to `workspace_id`.
pub fn create_api_call(
    settings: &ApiSettings,
    org_id: &str,
    workspace_id: Option<&str>,
) -> Result<ApiCall> {
    ApiCall::new(settings, Scope::new(org_id, workspace_id))
}

/// Scoped HTTP client.
///
/// Paths are relative to `{base_url}/organizations/{org_id}/`. Each verb
/// resolves to the envelope payload on success; failures are classified as
/// network, HTTP status, envelope or decode errors. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiCall {
    http: reqwest::Client,
    base_url: Url,
    scope: Scope,
}

impl ApiCall {
    pub fn new(settings: &ApiSettings, scope: Scope) -> Result<Self> {
        check_segment(&scope.org_id)?;
        let mut headers = HeaderMap::new();
        headers.insert(ORG_HEADER, header_value("organization id", &scope.org_id)?);
        if let Some(workspace_id) = &scope.workspace_id {
            headers.insert(
                WORKSPACE_HEADER,
                header_value("workspace id", workspace_id)?,
            );
        }
        if let Some(token) = &settings.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| {
                    LeadflowError::Config("API token contains invalid characters".to_string())
                })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| LeadflowError::Network {
                endpoint: "client_init".to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            scope,
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Absolute URL for a scoped path.
    pub fn url(&self, path: &ApiPath) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                LeadflowError::Config(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            segments
                .pop_if_empty()
                .push("organizations")
                .push(&self.scope.org_id);
            for segment in path.segments() {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: impl Into<ApiPath>) -> Result<T> {
        self.execute(Method::GET, path.into(), |req| req).await
    }

    pub async fn get_with_query<Q, T>(&self, path: impl Into<ApiPath>, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::GET, path.into(), |req| req.query(query)).await
    }

    pub async fn post<B, T>(&self, path: impl Into<ApiPath>, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path.into(), |req| req.json(body)).await
    }

    pub async fn patch<B, T>(&self, path: impl Into<ApiPath>, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::PATCH, path.into(), |req| req.json(body)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: ApiPath,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T> {
        let url = self.url(&path)?;
        let endpoint = format!("{method} {path}");
        let request_id = Uuid::new_v4().to_string();

        tracing::debug!(%endpoint, scope = %self.scope, %request_id, "sending request");

        let request = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.as_str());
        let response = build(request)
            .send()
            .await
            .map_err(|source| LeadflowError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| LeadflowError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;

        tracing::debug!(%endpoint, status = status.as_u16(), %request_id, "response received");

        if !status.is_success() {
            return Err(LeadflowError::HttpStatus {
                endpoint,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|source| LeadflowError::Decode {
                endpoint: endpoint.clone(),
                source,
            })?;
        envelope.into_result(&endpoint)
    }
}

fn header_value(what: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| LeadflowError::Config(format!("{what} '{value}' is not a valid header value")))
}
