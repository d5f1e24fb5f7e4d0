// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let threshold = config.retrieval.similarity_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        fail(format!(
            "retrieval.similarity_threshold must be a non-negative number, got {threshold}"
        ));
    }

    if config.retrieval.facts_top_k == 0 {
        fail("retrieval.facts_top_k must be at least 1".to_string());
    }
    if config.retrieval.memories_top_k == 0 {
        fail("retrieval.memories_top_k must be at least 1".to_string());
    }
    if config.retrieval.retrieval_timeout_secs == 0 {
        fail("retrieval.retrieval_timeout_secs must be at least 1".to_string());
    }
    if config.retrieval.model_timeout_secs == 0 {
        fail("retrieval.model_timeout_secs must be at least 1".to_string());
    }

    if config.provider.base_url.trim().is_empty() {
        fail("provider.base_url must not be empty".to_string());
    } else if !(config.provider.base_url.starts_with("http://")
        || config.provider.base_url.starts_with("https://"))
    {
        fail(format!(
            "provider.base_url `{}` must start with http:// or https://",
            config.provider.base_url
        ));
    }

    if config.gateway.enabled {
        if config.gateway.port == 0 {
            fail("gateway.port must not be 0".to_string());
        }
        let host = config.gateway.host.trim();
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &MnemoConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MnemoConfig::default()).is_ok());
    }

    #[test]
    fn negative_threshold_fails_validation() {
        let mut config = MnemoConfig::default();
        config.retrieval.similarity_threshold = -0.1;
        assert!(messages(&config)[0].contains("similarity_threshold"));
    }

    #[test]
    fn nan_threshold_fails_validation() {
        let mut config = MnemoConfig::default();
        config.retrieval.similarity_threshold = f32::NAN;
        assert!(messages(&config)[0].contains("similarity_threshold"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = MnemoConfig::default();
        config.retrieval.facts_top_k = 0;
        config.retrieval.memories_top_k = 0;
        config.storage.database_path = "  ".to_string();
        let all = messages(&config);
        assert_eq!(all.len(), 3, "{all:?}");
    }

    #[test]
    fn bad_gateway_host_is_ignored_when_disabled() {
        let mut config = MnemoConfig::default();
        config.gateway.host = "not a host!".to_string();
        assert!(validate_config(&config).is_err());

        config.gateway.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn base_url_needs_scheme() {
        let mut config = MnemoConfig::default();
        config.provider.base_url = "api.openai.com/v1".to_string();
        assert!(messages(&config)[0].contains("provider.base_url"));
    }
}
