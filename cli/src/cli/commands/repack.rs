/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use human_bytes::human_bytes;
use log::info;
use umbra::source::DirSource;
use umbra::{FirmwareVersion, Repackager};

use super::KeyArgs;
use crate::config::ObscuraConfig;

#[derive(Args, Debug)]
pub struct RepackArgs {
    /// Firmware package to repack
    pub package: PathBuf,
    /// Where to write the rebuilt package
    #[arg(short, long)]
    pub output: PathBuf,
    /// Firmware version of the package, e.g. 8.1.0
    #[arg(long)]
    pub firmware: FirmwareVersion,
    /// Directory holding overrides and flag files (defaults to the
    /// configured overrides root)
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Process image file to inject, may be repeated
    #[arg(long = "kip")]
    pub kips: Vec<String>,
    #[command(flatten)]
    key: KeyArgs,
}

impl RepackArgs {
    pub fn run(&self, config: &ObscuraConfig) -> Result<()> {
        let cipher = self.key.load_cipher(config)?;
        let raw = fs::read(&self.package)
            .with_context(|| format!("cannot read {}", self.package.display()))?;

        let root = self.root.clone().unwrap_or_else(|| PathBuf::from(&config.overrides_root));
        let files = DirSource::new(root);

        let mut repackager = Repackager::new(cipher, files, self.firmware);
        for kip in &self.kips {
            repackager.add_process_override(kip);
        }

        let output = repackager.run(&raw)?;
        fs::write(&self.output, &output.package)
            .with_context(|| format!("cannot write {}", self.output.display()))?;
        info!(
            "Wrote {} ({})",
            self.output.display(),
            human_bytes(output.package.len() as f64)
        );

        if let Some(parent) = self.output.parent() {
            if let Some(bytes) = &output.boot_firmware {
                let path = parent.join("warmboot.bin");
                fs::write(&path, bytes)
                    .with_context(|| format!("cannot write {}", path.display()))?;
                info!("Wrote {} ({})", path.display(), human_bytes(bytes.len() as f64));
            }
            if let Some(bytes) = &output.secure_monitor {
                let path = parent.join("secmon.bin");
                fs::write(&path, bytes)
                    .with_context(|| format!("cannot write {}", path.display()))?;
                info!("Wrote {} ({})", path.display(), human_bytes(bytes.len() as f64));
            }
        }

        Ok(())
    }
}
