/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
pub mod crypto;
pub mod error;
pub mod package;
pub mod source;
pub mod utilities;

pub use error::{Error, Result};
pub use package::FirmwareVersion;
pub use package::repack::{RepackOutput, Repackager};
