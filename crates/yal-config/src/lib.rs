// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Yal generation bot.
//!
//! TOML parsing with `deny_unknown_fields`, a `/etc` to XDG to local file
//! hierarchy, `YAL_` environment overrides, and miette diagnostics with typo
//! suggestions.
//!
//! ```no_run
//! use yal_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("queue mode: {:?}", config.queue.mode);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::YalConfig;

/// Load from the standard hierarchy and validate.
///
/// Figment errors are converted to diagnostics with source spans where the
/// offending file can be read back.
pub fn load_and_validate() -> Result<YalConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(&loader::config_search_paths()),
        )),
    }
}

/// Load an explicit file (plus environment) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<YalConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(&[path.to_path_buf()]),
        )),
    }
}

/// Load a TOML string and validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<YalConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Reads back the config files that exist, keyed the way Figment reports them.
fn collect_toml_sources(paths: &[std::path::PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(path).ok()?;
            let resolved = if path.is_relative() {
                std::env::current_dir()
                    .map(|d| d.join(path))
                    .unwrap_or_else(|_| path.clone())
            } else {
                path.clone()
            };
            Some((resolved.display().to_string(), content))
        })
        .collect()
}
