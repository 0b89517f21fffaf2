/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

mod cli;
mod config;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::config::ObscuraConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = ObscuraConfig::load();
    Cli::parse().run(&config)
}
