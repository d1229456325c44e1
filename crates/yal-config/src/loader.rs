// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./yal.toml` > `~/.config/yal/yal.toml` > `/etc/yal/yal.toml`,
//! with `YAL_` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::YalConfig;

/// Top-level sections addressable from the environment.
const ENV_SECTIONS: &[&str] = &[
    "bot",
    "queue",
    "moderation",
    "access",
    "generation",
    "sampling",
    "storage",
    "engine",
    "delivery",
];

/// Paths searched for `yal.toml`, lowest precedence first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/yal/yal.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("yal/yal.toml"));
    }
    paths.push(PathBuf::from("yal.toml"));
    paths
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/yal/yal.toml`
/// 3. `~/.config/yal/yal.toml`
/// 4. `./yal.toml`
/// 5. `YAL_*` environment variables
pub fn load_config() -> Result<YalConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<YalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(YalConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<YalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(YalConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    config_search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(YalConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Maps `YAL_<SECTION>_<KEY>` onto `section.key`.
///
/// Only the first underscore after the section name is turned into a dot, so
/// `YAL_GENERATION_TIMEOUT_SECS` lands on `generation.timeout_secs`. The
/// sampling defaults get one extra level: `YAL_SAMPLING_DEFAULTS_TOP_P`
/// lands on `sampling.defaults.top_p`.
fn env_provider() -> Env {
    Env::prefixed("YAL_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            if *section == "sampling"
                && let Some(field) = rest.strip_prefix("defaults_")
            {
                return format!("sampling.defaults.{field}");
            }
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("generation_timeout_secs"), "generation.timeout_secs");
        assert_eq!(map_env_key("bot_log_level"), "bot.log_level");
        assert_eq!(
            map_env_key("access_minimum_membership_hours"),
            "access.minimum_membership_hours"
        );
    }

    #[test]
    fn sampling_defaults_get_nested() {
        assert_eq!(map_env_key("sampling_defaults_top_p"), "sampling.defaults.top_p");
    }

    #[test]
    fn unknown_prefix_passes_through() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }

    #[test]
    fn search_paths_end_with_local_file() {
        let paths = config_search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/yal/yal.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("yal.toml")));
    }
}
