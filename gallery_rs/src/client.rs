use crate::config::ClientConfig;
use crate::error::{GalleryError, GalleryErrorKind};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Default, Clone)]
pub struct ClientOptions {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GalleryClient {
    base_url: String,
    opts: ClientOptions,
    http: reqwest::Client,
}

impl GalleryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            opts: ClientOptions::default(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(cfg: &ClientConfig) -> Result<Self, GalleryError> {
        cfg.validate()?;
        let http = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        let mut client = Self::new(cfg.resolved_base_url());
        client.http = http;
        client.opts = ClientOptions {
            token: cfg.token.clone(),
            user_id: cfg.user_id.clone(),
        };
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.opts.token = Some(token.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.opts.user_id = Some(user_id.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> Option<&str> {
        self.opts.user_id.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.opts.token.is_some()
    }

    fn headers(&self) -> Result<HeaderMap, GalleryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.opts.token.as_deref() {
            let v = format!("Bearer {token}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&v).map_err(|e| {
                    GalleryError::new(GalleryErrorKind::Serialization, None, e.to_string())
                })?,
            );
        }
        Ok(headers)
    }

    /// Joins escaped path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, GalleryError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            GalleryError::new(
                GalleryErrorKind::Config,
                None,
                format!("invalid base url {}: {e}", self.base_url),
            )
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                GalleryError::new(
                    GalleryErrorKind::Config,
                    None,
                    format!("base url cannot carry a path: {}", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&impl Serialize>,
        body: Option<&impl Serialize>,
    ) -> Result<Response, GalleryError> {
        let url = self.url(segments)?;
        let path = url.path().to_string();
        let mut req = self.http.request(method.clone(), url);
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        req = req.headers(self.headers()?);
        req.send().await.map_err(|e| {
            tracing::warn!(%method, path = %path, error = %e, "request failed before a response");
            GalleryError::from(e)
        })
    }

    pub(crate) async fn map_error(&self, resp: Response) -> GalleryError {
        let status = resp.status();
        let code = status.as_u16();
        let url = resp.url().path().to_string();
        let text = resp.text().await.unwrap_or_default();
        tracing::error!(status = code, path = %url, body = %text, "request returned an error status");
        let kind = if code == 404 {
            GalleryErrorKind::NotFound
        } else if code == 401 || code == 403 {
            GalleryErrorKind::Auth
        } else if (400..500).contains(&code) {
            GalleryErrorKind::Validation
        } else {
            GalleryErrorKind::Server
        };
        GalleryError::new(
            kind,
            Some(code),
            if text.is_empty() {
                status.to_string()
            } else {
                text
            },
        )
    }

    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&impl Serialize>,
        body: Option<&impl Serialize>,
    ) -> Result<T, GalleryError> {
        let resp = self.send(method, segments, query, body).await?;
        if resp.status().is_success() {
            if resp.status().as_u16() == 204 {
                return Ok(serde_json::from_value(Value::Null)?);
            }
            return Ok(resp.json::<T>().await?);
        }
        Err(self.map_error(resp).await)
    }

    pub fn organizations(&self) -> crate::apis::OrganizationsApi {
        crate::apis::OrganizationsApi::new(self.clone())
    }

    pub fn events(&self) -> crate::apis::EventsApi {
        crate::apis::EventsApi::new(self.clone())
    }

    pub fn photos(&self) -> crate::apis::PhotosApi {
        crate::apis::PhotosApi::new(self.clone())
    }

    pub fn members(&self) -> crate::apis::MembersApi {
        crate::apis::MembersApi::new(self.clone())
    }
}
