//! Top-level infragraph configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{EnrichmentConfig, ImpactConfig, PolicyConfig};
use crate::errors::ConfigError;

/// Project config file name looked up in the root passed to `load`.
pub const PROJECT_CONFIG_FILE: &str = "infragraph.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`INFRAGRAPH_*`)
/// 3. Project config (`infragraph.toml` in the given root)
/// 4. User config (`~/.infragraph/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InfraGraphConfig {
    pub impact: ImpactConfig,
    pub policy: PolicyConfig,
    pub enrichment: EnrichmentConfig,
}

/// Caller-supplied overrides, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub impact_max_depth: Option<u32>,
    pub policy_max_depth: Option<u32>,
    pub policy_max_resources: Option<usize>,
    pub include_networking: Option<bool>,
    pub enrich: Option<bool>,
    pub enrichment_workers: Option<usize>,
}

impl InfraGraphConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        ::tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): explicit overrides
        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &InfraGraphConfig) -> Result<(), ConfigError> {
        if config.impact.default_max_depth == Some(0) {
            return Err(invalid("impact.default_max_depth", "must be greater than 0"));
        }
        if let Some(decay) = config.impact.depth_decay {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(invalid("impact.depth_decay", "must be in (0.0, 1.0]"));
            }
        }

        let critical = config.impact.effective_critical_threshold();
        let high = config.impact.effective_high_threshold();
        let medium = config.impact.effective_medium_threshold();
        for (field, value) in [
            ("impact.critical_threshold", critical),
            ("impact.high_threshold", high),
            ("impact.medium_threshold", medium),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }
        if !(critical > high && high > medium) {
            return Err(invalid(
                "impact",
                "thresholds must be strictly descending: critical > high > medium",
            ));
        }

        if config.policy.default_max_depth == Some(0) {
            return Err(invalid("policy.default_max_depth", "must be greater than 0"));
        }
        if config.policy.max_resources == Some(0) {
            return Err(invalid("policy.max_resources", "must be greater than 0"));
        }
        if config.enrichment.workers == Some(0) {
            return Err(invalid("enrichment.workers", "must be greater than 0"));
        }
        if config.enrichment.timeout_ms == Some(0) {
            return Err(invalid("enrichment.timeout_ms", "must be greater than 0"));
        }
        Ok(())
    }

    /// Returns the user config path: `~/.infragraph/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".infragraph").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut InfraGraphConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: InfraGraphConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut InfraGraphConfig, other: &InfraGraphConfig) {
        // Impact
        merge_opt(&mut base.impact.default_max_depth, other.impact.default_max_depth);
        merge_opt(&mut base.impact.depth_decay, other.impact.depth_decay);
        merge_opt(&mut base.impact.critical_threshold, other.impact.critical_threshold);
        merge_opt(&mut base.impact.high_threshold, other.impact.high_threshold);
        merge_opt(&mut base.impact.medium_threshold, other.impact.medium_threshold);

        // Policy
        merge_opt(&mut base.policy.default_max_depth, other.policy.default_max_depth);
        merge_opt(&mut base.policy.max_resources, other.policy.max_resources);
        merge_opt(&mut base.policy.include_networking, other.policy.include_networking);
        merge_opt(
            &mut base.policy.use_baseline_fallback,
            other.policy.use_baseline_fallback,
        );
        merge_opt(&mut base.policy.merge_statements, other.policy.merge_statements);

        // Enrichment
        merge_opt(&mut base.enrichment.enabled, other.enrichment.enabled);
        merge_opt(&mut base.enrichment.workers, other.enrichment.workers);
        merge_opt(&mut base.enrichment.timeout_ms, other.enrichment.timeout_ms);
    }

    /// Apply environment variable overrides.
    /// Pattern: `INFRAGRAPH_IMPACT_MAX_DEPTH`, `INFRAGRAPH_POLICY_MAX_RESOURCES`, etc.
    fn apply_env_overrides(config: &mut InfraGraphConfig) -> Result<(), ConfigError> {
        if let Some(v) = env_parse::<u32>("INFRAGRAPH_IMPACT_MAX_DEPTH")? {
            config.impact.default_max_depth = Some(v);
        }
        if let Some(v) = env_parse::<f64>("INFRAGRAPH_IMPACT_DEPTH_DECAY")? {
            config.impact.depth_decay = Some(v);
        }
        if let Some(v) = env_parse::<u32>("INFRAGRAPH_POLICY_MAX_DEPTH")? {
            config.policy.default_max_depth = Some(v);
        }
        if let Some(v) = env_parse::<usize>("INFRAGRAPH_POLICY_MAX_RESOURCES")? {
            config.policy.max_resources = Some(v);
        }
        if let Some(v) = env_parse::<bool>("INFRAGRAPH_POLICY_INCLUDE_NETWORKING")? {
            config.policy.include_networking = Some(v);
        }
        if let Some(v) = env_parse::<bool>("INFRAGRAPH_ENRICHMENT_ENABLED")? {
            config.enrichment.enabled = Some(v);
        }
        if let Some(v) = env_parse::<usize>("INFRAGRAPH_ENRICHMENT_WORKERS")? {
            config.enrichment.workers = Some(v);
        }
        if let Some(v) = env_parse::<u64>("INFRAGRAPH_ENRICHMENT_TIMEOUT_MS")? {
            config.enrichment.timeout_ms = Some(v);
        }
        Ok(())
    }

    /// Apply explicit overrides (highest priority).
    fn apply_overrides(config: &mut InfraGraphConfig, overrides: &ConfigOverrides) {
        merge_opt(&mut config.impact.default_max_depth, overrides.impact_max_depth);
        merge_opt(&mut config.policy.default_max_depth, overrides.policy_max_depth);
        merge_opt(&mut config.policy.max_resources, overrides.policy_max_resources);
        merge_opt(&mut config.policy.include_networking, overrides.include_networking);
        merge_opt(&mut config.enrichment.enabled, overrides.enrich);
        merge_opt(&mut config.enrichment.workers, overrides.enrichment_workers);
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn merge_opt<T: Copy>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Read and parse an environment variable. Unset is `None`; unparseable is an error.
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: key.to_string(),
                message: format!("cannot parse {raw:?}"),
            }),
        Err(_) => Ok(None),
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
