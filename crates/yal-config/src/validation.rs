// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! Every check runs; all failures are returned together.

use yal_core::types::{ParamRange, SamplingBounds, SamplingParams};

use crate::diagnostic::ConfigError;
use crate::model::{QueueMode, YalConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Room kept below `delivery.message_limit` for the error notice wrapper.
pub const ERROR_NOTICE_HEADROOM: usize = 100;

/// Validate a deserialized configuration.
pub fn validate_config(config: &YalConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "bot.log_level",
            format!(
                "`{}` is not one of {}",
                config.bot.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.queue.mode == QueueMode::Bounded && config.queue.max_depth == 0 {
        errors.push(ConfigError::invalid(
            "queue.max_depth",
            "must be at least 1 in bounded mode",
        ));
    }

    validate_moderation(config, &mut errors);

    let generation = &config.generation;
    if generation.timeout_secs == 0 {
        errors.push(ConfigError::invalid(
            "generation.timeout_secs",
            "must be greater than 0",
        ));
    }
    if generation.max_attempts == 0 {
        errors.push(ConfigError::invalid(
            "generation.max_attempts",
            "must be at least 1",
        ));
    }
    if generation.fallback_text.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "generation.fallback_text",
            "must not be empty",
        ));
    }

    validate_sampling(
        &config.sampling.defaults,
        &config.sampling.bounds,
        &mut errors,
    );

    if config.storage.reload_window_minutes == 0 {
        errors.push(ConfigError::invalid(
            "storage.reload_window_minutes",
            "must be greater than 0",
        ));
    }
    if config.storage.data_dir.as_os_str().is_empty() {
        errors.push(ConfigError::invalid("storage.data_dir", "must not be empty"));
    }

    let base_url = config.engine.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::invalid(
            "engine.base_url",
            format!("`{base_url}` must start with http:// or https://"),
        ));
    }
    if config.engine.request_timeout_secs < generation.timeout_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.request_timeout_secs ({}) is shorter than generation.timeout_secs ({})",
                config.engine.request_timeout_secs, generation.timeout_secs
            ),
        });
    }

    let delivery = &config.delivery;
    if delivery.field_limit == 0 {
        errors.push(ConfigError::invalid(
            "delivery.field_limit",
            "must be greater than 0",
        ));
    }
    if delivery.message_limit <= ERROR_NOTICE_HEADROOM {
        errors.push(ConfigError::invalid(
            "delivery.message_limit",
            format!("must be greater than {ERROR_NOTICE_HEADROOM}"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_moderation(config: &YalConfig, errors: &mut Vec<ConfigError>) {
    let moderation = &config.moderation;
    if moderation.classifier_enabled && moderation.classifier_url.is_none() {
        errors.push(ConfigError::Validation {
            message: "moderation.classifier_enabled requires moderation.classifier_url"
                .to_string(),
        });
    }

    for (category, threshold) in &moderation.thresholds {
        if !threshold.is_finite() || !(0.0..=1.0).contains(threshold) {
            errors.push(ConfigError::invalid(
                &format!("moderation.thresholds.{category}"),
                format!("must be between 0 and 1, got {threshold}"),
            ));
        }
    }

    if let Some(path) = &moderation.wordlist_path
        && !path.is_file()
    {
        errors.push(ConfigError::invalid(
            "moderation.wordlist_path",
            format!("`{}` is not a readable file", path.display()),
        ));
    }
}

fn validate_sampling(
    defaults: &SamplingParams,
    bounds: &SamplingBounds,
    errors: &mut Vec<ConfigError>,
) {
    check_range("sampling.bounds.max_tokens", &bounds.max_tokens, errors);
    check_range("sampling.bounds.temperature", &bounds.temperature, errors);
    check_range("sampling.bounds.top_p", &bounds.top_p, errors);

    if let Err(err) = bounds.check(defaults) {
        errors.push(ConfigError::Validation {
            message: format!("sampling.defaults fall outside sampling.bounds: {err}"),
        });
    }
}

fn check_range<T: PartialOrd + Copy + std::fmt::Display>(
    key: &str,
    range: &ParamRange<T>,
    errors: &mut Vec<ConfigError>,
) {
    if range.min > range.max {
        errors.push(ConfigError::invalid(
            key,
            format!("min {} is greater than max {}", range.min, range.max),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&YalConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = YalConfig::default();
        config.bot.log_level = "loud".into();
        config.generation.max_attempts = 0;
        config.delivery.message_limit = 50;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut config = YalConfig::default();
        config.sampling.bounds.temperature = ParamRange::new(1.0, 0.5);
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.to_string().contains("sampling.bounds.temperature"))
        );
    }

    #[test]
    fn classifier_needs_url() {
        let mut config = YalConfig::default();
        config.moderation.classifier_enabled = true;
        assert!(validate_config(&config).is_err());

        config.moderation.classifier_url = Some("http://127.0.0.1:9000/classify".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn threshold_above_one_is_rejected() {
        let mut config = YalConfig::default();
        config.moderation.thresholds.insert("toxicity".into(), 1.5);
        assert!(validate_config(&config).is_err());
    }
}
