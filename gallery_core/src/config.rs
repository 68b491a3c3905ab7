use crate::{Error, Result};
use std::time::Duration;

/// Fan-out paginator tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorConfig {
    /// Upper bound on child fetches in flight within one batch.
    pub max_concurrent_fetches: usize,
    /// Message surfaced to the user when the parent fetch fails.
    pub failure_message: String,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            failure_message: "Failed to fetch organizations".to_string(),
        }
    }
}

impl PaginatorConfig {
    #[tracing::instrument(level = "debug")]
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_fetches == 0 {
            return Err(Error::InvalidInput(
                "max_concurrent_fetches must be > 0".to_string(),
            ));
        }
        if self.failure_message.trim().is_empty() {
            return Err(Error::InvalidInput("failure_message is empty".to_string()));
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = env_nonempty("GALLERY_MAX_CONCURRENT_FETCHES") {
            cfg.max_concurrent_fetches = v.parse::<usize>().map_err(|_| {
                Error::InvalidInput(format!("invalid GALLERY_MAX_CONCURRENT_FETCHES: {v}"))
            })?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Organization feed tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Rows revealed per "load more" before another page is fetched.
    pub display_step: usize,
    /// How often hosts should re-fetch the feed from the beginning.
    pub refresh_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            display_step: 3,
            refresh_interval: Duration::from_secs(45 * 60),
        }
    }
}

impl FeedConfig {
    #[tracing::instrument(level = "debug")]
    pub fn validate(&self) -> Result<()> {
        if self.display_step == 0 {
            return Err(Error::InvalidInput("display_step must be > 0".to_string()));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::InvalidInput(
                "refresh_interval must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = env_nonempty("GALLERY_FEED_DISPLAY_STEP") {
            cfg.display_step = v.parse::<usize>().map_err(|_| {
                Error::InvalidInput(format!("invalid GALLERY_FEED_DISPLAY_STEP: {v}"))
            })?;
        }
        if let Some(v) = env_nonempty("GALLERY_FEED_REFRESH_SECS") {
            let secs = v.parse::<u64>().map_err(|_| {
                Error::InvalidInput(format!("invalid GALLERY_FEED_REFRESH_SECS: {v}"))
            })?;
            cfg.refresh_interval = Duration::from_secs(secs);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        PaginatorConfig::default().validate().expect("paginator defaults");
        FeedConfig::default().validate().expect("feed defaults");
        assert_eq!(FeedConfig::default().display_step, 3);
        assert_eq!(
            FeedConfig::default().refresh_interval,
            Duration::from_secs(2700)
        );
    }

    #[test]
    fn rejects_zero_values() {
        let cfg = PaginatorConfig {
            max_concurrent_fetches: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidInput(_))));

        let feed = FeedConfig {
            display_step: 0,
            ..Default::default()
        };
        assert!(feed.validate().is_err());
    }
}
