/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

//! Where each kernel build keeps its own size field.
//!
//! Embedded-directory generations append the process directory right after
//! the kernel payload, so the rebuild must patch the kernel's record of its
//! own length back to the pre-directory value or the kernel cannot locate
//! its end. The offset of that field is per-version configuration data:
//! new firmware gets a new row here, never a guess in the codec.

use crate::error::{Error, Result};
use crate::package::FirmwareVersion;

/// Rows sorted ascending by minimum version; a lookup takes the newest row
/// at or below the requested version.
#[rustfmt::skip]
pub const KERNEL_SIZE_FIELDS: &[(FirmwareVersion, usize)] = &[
    (FirmwareVersion::new(8, 0, 0), 0x168),
    (FirmwareVersion::new(8, 1, 0), 0x168),
];

pub fn size_field_offset(version: FirmwareVersion) -> Result<usize> {
    KERNEL_SIZE_FIELDS
        .iter()
        .rev()
        .find(|(min, _)| version >= *min)
        .map(|(_, offset)| *offset)
        .ok_or_else(|| Error::format(format!("no kernel layout entry for firmware {}", version)))
}
