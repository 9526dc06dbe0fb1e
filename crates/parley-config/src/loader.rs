// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `/etc/parley/parley.toml` < `~/.config/parley/parley.toml`
//! < `./parley.toml` < `PARLEY_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ParleyConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/parley/parley.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "parley.toml";

/// Config sections that environment variables may address.
const ENV_SECTIONS: &[&str] = &["console", "remote", "policy", "media", "scope", "workflow"];

/// The user config file under the XDG config directory, if one is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("parley").join("parley.toml"))
}

/// Build the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG_PATH)).merge(env_provider())
}

/// Load configuration from the standard file hierarchy with env overrides.
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. Used by tests and tooling.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `PARLEY_MEDIA_OPERATOR_BUCKET` must become `media.operator_bucket`, so
/// only the first underscore after a known section name becomes a dot.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_").map(|key| {
        let key_str = key.as_str();
        let mapped = ENV_SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
