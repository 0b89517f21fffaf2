/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ObscuraConfig {
    /// Directory holding override files and flag files.
    pub overrides_root: String,
    /// Key file to fall back on when no key is passed on the command line.
    #[serde(default)]
    pub key_file: Option<String>,
}

impl Default for ObscuraConfig {
    fn default() -> Self {
        Self { overrides_root: "umbra".to_string(), key_file: None }
    }
}

impl ObscuraConfig {
    pub fn load() -> Self {
        let mut builder = Config::builder();
        let defaults = ObscuraConfig::default();

        builder = builder.set_default("overrides_root", defaults.overrides_root).unwrap();

        if let Some(config_dir) = dirs::config_dir().map(|p| p.join("obscura")) {
            builder =
                builder.add_source(File::from(config_dir.join("config.toml")).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("OBSCURA"));
        let cfg: ObscuraConfig =
            builder.build().and_then(|c| c.try_deserialize()).unwrap_or_default();

        cfg.save().ok();

        cfg
    }

    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::get_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            let toml_string = toml::to_string_pretty(self)?;
            fs::write(path, toml_string)?;
        }
        Ok(())
    }

    fn get_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("obscura/config.toml"))
    }
}
