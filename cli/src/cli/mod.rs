/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::ObscuraConfig;

#[derive(Parser, Debug)]
#[command(name = "obscura", version, about = "Firmware package repacker")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect a firmware package without modifying it
    Info(commands::info::InfoArgs),
    /// Patch and rebuild a firmware package
    Repack(commands::repack::RepackArgs),
}

impl Cli {
    pub fn run(self, config: &ObscuraConfig) -> Result<()> {
        match self.command {
            Commands::Info(args) => args.run(config),
            Commands::Repack(args) => args.run(config),
        }
    }
}
