use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Settings for talking to the Ensembl REST service.
///
/// Every key is optional; an empty JSON object yields the public Ensembl
/// server with conservative retry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    pub server: String,
    pub species: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_millis: u64,
    pub threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: "https://rest.ensembl.org".to_string(),
            species: "homo_sapiens".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            backoff_millis: 500,
            threads: 4,
        }
    }
}

impl ServiceConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            bail!("invalid server URL: '{}'", self.server);
        }
        if self.species.is_empty() {
            bail!("species must not be empty");
        }
        if self.max_attempts == 0 {
            bail!("maxAttempts must be at least 1");
        }
        if self.threads == 0 {
            bail!("threads must be at least 1");
        }
        if self.timeout_secs == 0 {
            bail!("timeoutSecs must be at least 1");
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before the first retry; doubled for every further attempt.
    #[must_use]
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_millis)
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.server.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn valid_config_all_fields() {
        let json = r#"{
            "server": "https://grch37.rest.ensembl.org/",
            "species": "homo_sapiens",
            "timeoutSecs": 10,
            "maxAttempts": 5,
            "backoffMillis": 250,
            "threads": 8
        }"#;
        let f = write_config(json);
        let config = ServiceConfig::from_file(f.path()).unwrap();
        assert_eq!(config.base_url(), "https://grch37.rest.ensembl.org");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.threads, 8);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let f = write_config("{}");
        let config = ServiceConfig::from_file(f.path()).unwrap();
        assert_eq!(config.base_url(), "https://rest.ensembl.org");
        assert_eq!(config.species, "homo_sapiens");
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn load_without_path() {
        let config = ServiceConfig::load(None).unwrap();
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn invalid_server() {
        let f = write_config(r#"{ "server": "rest.ensembl.org" }"#);
        let err = ServiceConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("invalid server URL"));
    }

    #[test]
    fn zero_attempts_rejected() {
        let f = write_config(r#"{ "maxAttempts": 0 }"#);
        let err = ServiceConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("maxAttempts"));
    }

    #[test]
    fn unreadable_file() {
        let err = ServiceConfig::from_file(Path::new("/tmp/nonexistent_eclipkit_config.json"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
