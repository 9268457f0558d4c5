// Application configuration
// Layered: built-in defaults <- sync-wizard.toml <- SYNC_WIZARD_* env vars.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::path_resolver::config_file_candidates;

const DEFAULT_BASE_URL: &str = "https://api.adflow.app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Backend REST base URL, no trailing slash required.
    pub api_base_url: String,
    /// Bearer token attached to every request.
    #[serde(default)]
    pub api_token: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration: defaults, then the first `sync-wizard.toml` found
    /// (env override, CWD, platform config dir), then `SYNC_WIZARD_*` env vars.
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)?
            .set_default("api_token", "")?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?;

        for candidate in config_file_candidates() {
            if candidate.exists() {
                builder = builder.add_source(
                    config::File::from(candidate.as_path()).format(config::FileFormat::Toml),
                );
                break;
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("SYNC_WIZARD"));

        let cfg: AppConfig = builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration values")?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid api_base_url: {}", self.api_base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("api_base_url must be http(s), got {}", parsed.scheme());
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed, ready for path concatenation.
    pub fn base_url_trimmed(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base: &str, timeout: u64) -> AppConfig {
        AppConfig {
            api_base_url: base.to_string(),
            api_token: String::new(),
            request_timeout_secs: timeout,
        }
    }

    #[test]
    fn validate_accepts_https_base_url() {
        assert!(cfg("https://api.example.com", 30).validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let err = cfg("ftp://api.example.com", 30).validate().unwrap_err();
        assert!(
            err.to_string().contains("http"),
            "error should mention scheme: {}",
            err
        );
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        assert!(cfg("https://api.example.com", 0).validate().is_err());
    }

    #[test]
    fn base_url_trimmed_strips_trailing_slash() {
        assert_eq!(
            cfg("https://api.example.com/", 30).base_url_trimmed(),
            "https://api.example.com"
        );
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sync-wizard.toml");
        std::fs::write(
            &path,
            "api_base_url = \"https://staging.example.com\"\nrequest_timeout_secs = 12\n",
        )
        .expect("write config file");

        let cfg: AppConfig = config::Config::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)
            .unwrap()
            .set_default("api_token", "")
            .unwrap()
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS as i64)
            .unwrap()
            .add_source(config::File::from(path.as_path()).format(config::FileFormat::Toml))
            .build()
            .expect("assemble config")
            .try_deserialize()
            .expect("deserialize config");

        assert_eq!(cfg.api_base_url, "https://staging.example.com");
        assert_eq!(cfg.request_timeout_secs, 12);
        assert_eq!(cfg.api_token, "", "unset token falls back to the default");
    }
}
