use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            loki_enabled: lookup("LOKI_ENABLED")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            loki_url: lookup("LOKI_URL").filter(|url| !url.trim().is_empty()),
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "net-social".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err("LOKI_ENABLED is true but LOKI_URL is not set".to_string());
        }
        Ok(())
    }

    /// Loki push URL when shipping is both compiled in and switched on.
    fn loki_target(&self) -> Option<&str> {
        if cfg!(feature = "loki") && self.loki_enabled {
            self.loki_url.as_deref()
        } else {
            None
        }
    }
}

/// Installs the global subscriber: env filter and console output always,
/// plus a Loki layer when `loki_target` yields a URL.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.log_level)?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));

    #[cfg(feature = "loki")]
    let registry = registry.with(loki_layer(&config)?);

    registry.try_init()?;

    match config.loki_target() {
        Some(url) => tracing::info!("✅ Logging to console and Loki at {} ({})", url, config.environment),
        None => tracing::info!("📊 Logging to console ({})", config.environment),
    }
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig) -> Result<Option<tracing_loki::Layer>, Box<dyn std::error::Error>> {
    let Some(loki_url) = config.loki_target() else {
        return Ok(None);
    };

    let (layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url::Url::parse(loki_url)?)?;

    // Ships buffered log lines to Loki in the background
    tokio::spawn(task);
    Ok(Some(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> LoggingConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoggingConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_are_console_only() {
        let cfg = config(&[]);
        assert!(!cfg.loki_enabled);
        assert_eq!(cfg.service_name, "net-social");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.loki_target(), None);
    }

    #[test]
    fn test_validate_requires_url_when_loki_enabled() {
        assert!(config(&[("LOKI_ENABLED", "true")]).validate().is_err());
        assert!(config(&[("LOKI_ENABLED", "true"), ("LOKI_URL", "  ")]).validate().is_err());
        assert!(config(&[("LOKI_ENABLED", "TRUE"), ("LOKI_URL", "http://localhost:3100")])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_loki_target_needs_switch_and_url() {
        let off = config(&[("LOKI_URL", "http://localhost:3100")]);
        assert_eq!(off.loki_target(), None);

        let on = config(&[("LOKI_ENABLED", "true"), ("LOKI_URL", "http://localhost:3100")]);
        if cfg!(feature = "loki") {
            assert_eq!(on.loki_target(), Some("http://localhost:3100"));
        } else {
            assert_eq!(on.loki_target(), None);
        }
    }
}
