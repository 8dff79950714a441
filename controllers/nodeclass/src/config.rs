//! Controller configuration from environment variables.

use crate::error::ControllerError;
use gallery_client::DEFAULT_ARM_ENDPOINT;
use imagefamily::Options;
use std::time::Duration;

/// How often a healthy node class is re-resolved
pub const DEFAULT_IMAGE_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Upper bound for every configured duration
pub const MAX_CONFIGURED_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Image resolution options
    pub options: Options,
    /// ARM endpoint for gallery lookups
    pub arm_endpoint: String,
    /// Restrict the watch to node classes matching this label selector
    pub label_selector: Option<String>,
    /// Requeue interval after a successful reconcile
    pub refresh_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                ControllerError::InvalidConfig(format!("{} environment variable is required", key))
            })
        };

        let mut options = Options::new(require("LOCATION")?, require("AZURE_SUBSCRIPTION_ID")?);

        if parse_bool("USE_SIG", get("USE_SIG"))? {
            options = options.with_sig(require("SIG_SUBSCRIPTION_ID")?);
        }
        if let Some(ttl) = parse_seconds("IMAGE_CACHE_TTL_SECONDS", get("IMAGE_CACHE_TTL_SECONDS"))? {
            options.image_cache_ttl = ttl;
        }
        if let Some(interval) = parse_seconds(
            "IMAGE_CACHE_CLEANUP_INTERVAL_SECONDS",
            get("IMAGE_CACHE_CLEANUP_INTERVAL_SECONDS"),
        )? {
            options.image_cache_cleanup_interval = interval;
        }
        if let Some(ttl) = parse_seconds(
            "KUBERNETES_VERSION_CACHE_TTL_SECONDS",
            get("KUBERNETES_VERSION_CACHE_TTL_SECONDS"),
        )? {
            options.kubernetes_version_cache_ttl = ttl;
        }

        let refresh_interval = parse_seconds("IMAGE_REFRESH_INTERVAL_SECONDS", get("IMAGE_REFRESH_INTERVAL_SECONDS"))?
            .unwrap_or(DEFAULT_IMAGE_REFRESH_INTERVAL);
        if refresh_interval.is_zero() {
            return Err(ControllerError::InvalidConfig(
                "IMAGE_REFRESH_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            options,
            arm_endpoint: get("ARM_ENDPOINT").unwrap_or_else(|| DEFAULT_ARM_ENDPOINT.to_string()),
            label_selector: get("WATCH_LABEL_SELECTOR"),
            refresh_interval,
        })
    }
}

fn parse_bool(key: &str, value: Option<String>) -> Result<bool, ControllerError> {
    match value.as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ControllerError::InvalidConfig(format!(
            "{} must be true or false, got {:?}",
            key, v
        ))),
    }
}

fn parse_seconds(key: &str, value: Option<String>) -> Result<Option<Duration>, ControllerError> {
    let Some(v) = value else {
        return Ok(None);
    };
    let duration = v.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
        ControllerError::InvalidConfig(format!("{} must be a number of seconds, got {:?}: {}", key, v, e))
    })?;
    if duration > MAX_CONFIGURED_DURATION {
        return Err(ControllerError::InvalidConfig(format!(
            "{} must be at most {} seconds, got {}",
            key,
            MAX_CONFIGURED_DURATION.as_secs(),
            duration.as_secs()
        )));
    }
    Ok(Some(duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ControllerError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&[("LOCATION", "westeurope"), ("AZURE_SUBSCRIPTION_ID", "sub-1")]).unwrap();
        assert_eq!(config.options, Options::new("westeurope", "sub-1"));
        assert_eq!(config.arm_endpoint, DEFAULT_ARM_ENDPOINT);
        assert_eq!(config.label_selector, None);
        assert_eq!(config.refresh_interval, DEFAULT_IMAGE_REFRESH_INTERVAL);
    }

    #[test]
    fn test_missing_location() {
        let err = load(&[("AZURE_SUBSCRIPTION_ID", "sub-1")]).unwrap_err();
        assert!(err.to_string().contains("LOCATION"));
    }

    #[test]
    fn test_sig_requires_subscription() {
        let err = load(&[
            ("LOCATION", "eastus"),
            ("AZURE_SUBSCRIPTION_ID", "sub-1"),
            ("USE_SIG", "true"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("SIG_SUBSCRIPTION_ID"));

        let config = load(&[
            ("LOCATION", "eastus"),
            ("AZURE_SUBSCRIPTION_ID", "sub-1"),
            ("USE_SIG", "TRUE"),
            ("SIG_SUBSCRIPTION_ID", "sig-sub"),
        ])
        .unwrap();
        assert!(config.options.use_sig);
        assert_eq!(config.options.sig_subscription_id, "sig-sub");
    }

    #[test]
    fn test_durations_and_overrides() {
        let config = load(&[
            ("LOCATION", "eastus"),
            ("AZURE_SUBSCRIPTION_ID", "sub-1"),
            ("IMAGE_CACHE_TTL_SECONDS", "600"),
            ("IMAGE_CACHE_CLEANUP_INTERVAL_SECONDS", "60"),
            ("KUBERNETES_VERSION_CACHE_TTL_SECONDS", "30"),
            ("IMAGE_REFRESH_INTERVAL_SECONDS", "120"),
            ("ARM_ENDPOINT", "https://management.usgovcloudapi.net"),
            ("WATCH_LABEL_SELECTOR", "team=platform"),
        ])
        .unwrap();
        assert_eq!(config.options.image_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.options.image_cache_cleanup_interval, Duration::from_secs(60));
        assert_eq!(config.options.kubernetes_version_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.refresh_interval, Duration::from_secs(120));
        assert_eq!(config.arm_endpoint, "https://management.usgovcloudapi.net");
        assert_eq!(config.label_selector.as_deref(), Some("team=platform"));
    }

    #[test]
    fn test_garbled_values_are_rejected() {
        let base = [("LOCATION", "eastus"), ("AZURE_SUBSCRIPTION_ID", "sub-1")];
        let with = |extra: (&'static str, &'static str)| {
            let mut vars = base.to_vec();
            vars.push(extra);
            load(&vars)
        };
        assert!(with(("USE_SIG", "maybe")).is_err());
        assert!(with(("IMAGE_CACHE_TTL_SECONDS", "3d")).is_err());
        assert!(with(("IMAGE_REFRESH_INTERVAL_SECONDS", "0")).is_err());
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        let base = [("LOCATION", "eastus"), ("AZURE_SUBSCRIPTION_ID", "sub-1")];
        let max = MAX_CONFIGURED_DURATION.as_secs().to_string();
        let over = (MAX_CONFIGURED_DURATION.as_secs() + 1).to_string();
        let huge = u64::MAX.to_string();

        for key in [
            "IMAGE_CACHE_TTL_SECONDS",
            "IMAGE_CACHE_CLEANUP_INTERVAL_SECONDS",
            "KUBERNETES_VERSION_CACHE_TTL_SECONDS",
            "IMAGE_REFRESH_INTERVAL_SECONDS",
        ] {
            for value in [&over, &huge] {
                let mut vars = base.to_vec();
                vars.push((key, value.as_str()));
                let err = load(&vars).unwrap_err();
                assert!(err.to_string().contains(key), "{}: {}", key, err);
            }

            let mut vars = base.to_vec();
            vars.push((key, max.as_str()));
            assert!(load(&vars).is_ok(), "{} accepts the upper bound", key);
        }
    }
}
