//! Process-wide tracing setup.

use crate::{Error, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(Error::InvalidInput(format!(
                "unsupported log format: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct O11yConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for O11yConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            default_filter: "info".to_string(),
        }
    }
}

impl O11yConfig {
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("GALLERY_LOG_FORMAT") {
            if !v.trim().is_empty() {
                cfg.format = LogFormat::parse(&v)?;
            }
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_filter.trim().is_empty() {
            return Err(Error::InvalidInput(
                "default_filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn init_global_from_env() -> Result<()> {
    let cfg = O11yConfig::from_env()?;
    init_global(cfg)
}

/// Installs the global subscriber. Fails with `Conflict` if one is already set.
pub fn init_global(cfg: O11yConfig) -> Result<()> {
    cfg.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.default_filter.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    let res = match cfg.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init(),
    };
    res.map_err(|e| Error::Conflict(format!("tracing already initialized: {e}")))
}
