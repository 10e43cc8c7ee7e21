use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub cloudrun: CloudRunSettings,
    #[serde(default)]
    pub reconciler: ReconcilerSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Outbound endpoint validations
        url::Url::parse(&self.registry.endpoint)
            .map_err(|e| format!("registry.endpoint is not a valid URL: {e}"))?;
        url::Url::parse(&self.cloudrun.endpoint)
            .map_err(|e| format!("cloudrun.endpoint is not a valid URL: {e}"))?;
        if self.registry.stable_image.is_empty() {
            return Err("registry.stable_image must not be empty".into());
        }
        if self.cloudrun.poll_interval_ms == 0 || self.cloudrun.poll_timeout_ms == 0 {
            return Err("cloudrun poll settings must be > 0".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Image registry settings. The defaults reproduce the reference deployment:
/// the GTM cloud image's tag listing and its canonical stable reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default = "default_registry_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_stable_image")]
    pub stable_image: String,
}

fn default_registry_endpoint() -> String {
    revsync_registry::DEFAULT_TAGS_ENDPOINT.into()
}
fn default_stable_image() -> String {
    revsync_registry::DEFAULT_STABLE_IMAGE.into()
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            endpoint: default_registry_endpoint(),
            stable_image: default_stable_image(),
        }
    }
}

/// Cloud Run Admin API settings.
///
/// `token` injects a static bearer token; when unset, tokens come from the GCE
/// metadata server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudRunSettings {
    #[serde(default = "default_cloudrun_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_cloudrun_endpoint() -> String {
    revsync_cloudrun::client::DEFAULT_API_ENDPOINT.into()
}
fn default_poll_interval_ms() -> u64 {
    2_000
}
fn default_poll_timeout_ms() -> u64 {
    300_000
}

impl CloudRunSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Default for CloudRunSettings {
    fn default() -> Self {
        Self {
            endpoint: default_cloudrun_endpoint(),
            token: None,
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

/// Reconciler behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReconcilerSettings {
    /// Order revisions by creation time before applying last-wins selection.
    /// Off by default: the historical behavior trusts raw listing order.
    #[serde(default)]
    pub sort_by_create_time: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("revsync.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., REVSYNC__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("REVSYNC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(
            cfg.registry.endpoint,
            "https://gcr.io/v2/cloud-tagging-10302018/gtm-cloud-image/tags/list"
        );
        assert_eq!(
            cfg.registry.stable_image,
            "gcr.io/cloud-tagging-10302018/gtm-cloud-image:stable"
        );
        assert!(!cfg.reconciler.sort_by_create_time);
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.registry.endpoint = "not a url".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.cloudrun.endpoint = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_poll_settings_are_rejected() {
        let mut cfg = AppConfig::default();
        cfg.cloudrun.poll_interval_ms = 0;
        assert!(cfg.validate().is_err());
    }
}
