use crate::error::{GalleryError, GalleryErrorKind};
use std::time::Duration;

pub const PRODUCTION_BASE_URL: &str = "http://52.89.156.167:3000";
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";

/// Which deployment the client talks to when no explicit base URL is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ApiMode {
    Production,
    #[default]
    Development,
}

impl ApiMode {
    pub fn parse(raw: &str) -> Result<Self, GalleryError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(GalleryError::new(
                GalleryErrorKind::Config,
                None,
                format!("unknown api mode: {other}"),
            )),
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_BASE_URL,
            Self::Development => DEVELOPMENT_BASE_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub mode: ApiMode,
    /// Overrides the mode's base URL when set.
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: ApiMode::Development,
            base_url: None,
            token: None,
            user_id: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self, GalleryError> {
        let mut cfg = Self::default();
        if let Some(v) = env_nonempty("GALLERY_API_MODE") {
            cfg.mode = ApiMode::parse(&v)?;
        }
        cfg.base_url = env_nonempty("GALLERY_API_BASE_URL");
        cfg.token = env_nonempty("GALLERY_API_TOKEN");
        cfg.user_id = env_nonempty("GALLERY_USER_ID");
        if let Some(v) = env_nonempty("GALLERY_API_TIMEOUT_MS") {
            let ms = v.parse::<u64>().map_err(|_| {
                GalleryError::new(
                    GalleryErrorKind::Config,
                    None,
                    format!("invalid GALLERY_API_TIMEOUT_MS: {v}"),
                )
            })?;
            cfg.timeout = Duration::from_millis(ms);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.timeout.is_zero() {
            return Err(GalleryError::new(
                GalleryErrorKind::Config,
                None,
                "timeout must be > 0",
            ));
        }
        if let Some(url) = self.base_url.as_deref() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GalleryError::new(
                    GalleryErrorKind::Config,
                    None,
                    format!("base_url must be http(s): {url}"),
                ));
            }
        }
        Ok(())
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.mode.base_url())
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
