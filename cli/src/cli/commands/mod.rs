/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

pub mod info;
pub mod repack;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use umbra::crypto::{PACKAGE_KEYSLOT, SoftwareCipher};

use crate::config::ObscuraConfig;

/// Key selection shared by every command that touches an encrypted package.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Package key as 32 hex digits
    #[arg(long, conflicts_with = "key_file")]
    pub key: Option<String>,
    /// File holding a `package2_key = <hex>` line
    #[arg(long)]
    pub key_file: Option<String>,
}

impl KeyArgs {
    pub fn load_cipher(&self, config: &ObscuraConfig) -> Result<SoftwareCipher> {
        let hex_key = match (&self.key, &self.key_file, &config.key_file) {
            (Some(key), _, _) => key.clone(),
            (None, Some(path), _) | (None, None, Some(path)) => key_from_file(path.as_ref())?,
            (None, None, None) => {
                return Err(anyhow!("no key given, pass --key or --key-file"));
            }
        };

        let bytes = hex::decode(hex_key.trim()).context("package key is not valid hex")?;
        let key: [u8; 16] =
            bytes.try_into().map_err(|_| anyhow!("package key must be 16 bytes"))?;

        let mut cipher = SoftwareCipher::new();
        cipher.set_key(PACKAGE_KEYSLOT, key);
        Ok(cipher)
    }
}

fn key_from_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read key file {}", path.display()))?;
    for line in text.lines() {
        if let Some((name, value)) = line.split_once('=') {
            if name.trim() == "package2_key" {
                return Ok(value.trim().to_string());
            }
        }
    }
    Err(anyhow!("no package2_key entry in {}", path.display()))
}
