/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use human_bytes::human_bytes;
use umbra::crypto::fingerprint;
use umbra::package::catalog::ProcessCatalog;
use umbra::package::codec;
use umbra::package::header::{MODERN_BASE, Section};

use super::KeyArgs;
use crate::config::ObscuraConfig;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Firmware package to inspect
    pub package: PathBuf,
    #[command(flatten)]
    key: KeyArgs,
}

impl InfoArgs {
    pub fn run(&self, config: &ObscuraConfig) -> Result<()> {
        let cipher = self.key.load_cipher(config)?;
        let raw = fs::read(&self.package)
            .with_context(|| format!("cannot read {}", self.package.display()))?;

        let package = codec::unpack(&raw, &cipher)?;
        let header = &package.header;

        println!("Package: {}", self.package.display());
        println!("  total size:     {}", human_bytes(raw.len() as f64));
        println!("  base address:   {:#010x}", header.base);
        let layout =
            if header.base == MODERN_BASE { "embedded directory" } else { "split directory" };
        println!("  layout:         {layout}");
        println!("  kernel section: {}", human_bytes(header.section_size(Section::Kernel) as f64));

        let catalog = ProcessCatalog::parse(package.directory()?)?;
        println!("  processes:      {}", catalog.len());
        for image in catalog.iter() {
            println!(
                "    {:<12} {:#018x}  {:>10}  {}",
                image.name(),
                image.tid(),
                human_bytes(image.len() as f64),
                hex::encode(fingerprint(image.bytes())),
            );
        }

        Ok(())
    }
}
