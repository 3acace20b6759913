use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for shademate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShademateConfig {
    /// Face classification endpoint settings
    pub classifier: ClassifierConfig,
    /// Product catalog settings
    pub catalog: CatalogConfig,
    /// Analysis phase timings
    pub sequence: SequenceConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// URL of the face classification endpoint
    pub endpoint: String,
    /// Bound on the classification request, in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Catalog source: a local JSON file path or an http(s) URL
    pub source: String,
    /// Result page the navigator links to, with `?id=<product>` appended
    pub result_page: String,
}

/// Wall-clock timings for the analysis sequence, in milliseconds.
///
/// Each step is shown for its `*_visible_ms` duration; between steps the
/// exit transition takes `transition_ms`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SequenceConfig {
    pub step1_visible_ms: u64,
    pub step2_visible_ms: u64,
    pub step3_visible_ms: u64,
    pub transition_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON-structured log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ShademateConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig {
                endpoint: "https://pizzzaboy-deepface.hf.space/api/is-face".to_string(),
                timeout_seconds: 20,
            },
            catalog: CatalogConfig {
                source: "data.json".to_string(),
                result_page: "result.html".to_string(),
            },
            sequence: SequenceConfig {
                step1_visible_ms: 3000,
                step2_visible_ms: 3000,
                step3_visible_ms: 700,
                transition_ms: 300,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl ShademateConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (shademate.toml, .shademate-rc)
    /// 3. Environment variables (SHADEMATE_ prefix, `__` nesting keys,
    ///    e.g. SHADEMATE_CLASSIFIER__ENDPOINT)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&ShademateConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("shademate.toml").exists() {
            builder = builder.add_source(File::with_name("shademate"));
        }

        if Path::new(".shademate-rc").exists() {
            builder = builder.add_source(File::with_name(".shademate-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SHADEMATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<ShademateConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = ShademateConfig::load_env_file();
        ShademateConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static ShademateConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_reference_timings() {
        let cfg = ShademateConfig::default();
        assert_eq!(cfg.sequence.step1_visible_ms, 3000);
        assert_eq!(cfg.sequence.step2_visible_ms, 3000);
        assert_eq!(cfg.sequence.step3_visible_ms, 700);
        assert_eq!(cfg.sequence.transition_ms, 300);
    }

    #[test]
    fn default_classifier_has_bounded_timeout() {
        let cfg = ShademateConfig::default();
        assert!(cfg.classifier.timeout_seconds > 0);
        assert!(cfg.classifier.endpoint.starts_with("https://"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = ShademateConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: ShademateConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.catalog.source, cfg.catalog.source);
        assert_eq!(back.sequence.transition_ms, cfg.sequence.transition_ms);
    }

    #[test]
    fn environment_variables_override_defaults() {
        std::env::set_var("SHADEMATE_CLASSIFIER__TIMEOUT_SECONDS", "33");
        let cfg = ShademateConfig::load().unwrap();
        std::env::remove_var("SHADEMATE_CLASSIFIER__TIMEOUT_SECONDS");

        assert_eq!(cfg.classifier.timeout_seconds, 33);
    }
}
