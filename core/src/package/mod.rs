/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
pub mod catalog;
pub mod codec;
pub mod header;
pub mod kernelmap;
pub mod overrides;
pub mod patch;
pub mod patches;
pub mod repack;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Firmware version of the container being repacked, carried by the caller.
/// Ordering is lexicographic over (major, minor, micro).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub micro: u16,
}

impl FirmwareVersion {
    /// At or above this version the bundled boot firmware and secure
    /// monitor are no longer trusted; external overrides are mandatory.
    pub const OVERRIDE_REQUIRED: FirmwareVersion = FirmwareVersion::new(7, 0, 0);

    /// At or above this version the container embeds the process directory
    /// inside the kernel section and moves to the low base address.
    pub const EMBEDDED_DIRECTORY: FirmwareVersion = FirmwareVersion::new(8, 0, 0);

    pub const fn new(major: u16, minor: u16, micro: u16) -> Self {
        Self { major, minor, micro }
    }

    pub fn embeds_directory(self) -> bool {
        self >= Self::EMBEDDED_DIRECTORY
    }

    pub fn requires_overrides(self) -> bool {
        self >= Self::OVERRIDE_REQUIRED
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl FromStr for FirmwareVersion {
    type Err = Error;

    /// Accepts `8`, `8.1` or `8.1.0`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::format(format!("bad firmware version `{}`", s));
        let parts: Vec<&str> = s.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(bad());
        }
        let mut fields = [0u16; 3];
        for (field, part) in fields.iter_mut().zip(&parts) {
            *field = part.parse().map_err(|_| bad())?;
        }
        Ok(FirmwareVersion::new(fields[0], fields[1], fields[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_order_lexicographically() {
        assert!(FirmwareVersion::new(8, 0, 0) > FirmwareVersion::new(7, 9, 9));
        assert!(FirmwareVersion::new(8, 0, 1) > FirmwareVersion::new(8, 0, 0));
        assert!(FirmwareVersion::new(6, 2, 0).requires_overrides() == false);
        assert!(FirmwareVersion::new(7, 0, 0).requires_overrides());
        assert!(FirmwareVersion::new(8, 1, 0).embeds_directory());
        assert!(!FirmwareVersion::new(7, 0, 1).embeds_directory());
    }

    #[test]
    fn parses_dotted_forms() {
        assert_eq!("8.1.0".parse::<FirmwareVersion>().unwrap(), FirmwareVersion::new(8, 1, 0));
        assert_eq!("6.2".parse::<FirmwareVersion>().unwrap(), FirmwareVersion::new(6, 2, 0));
        assert_eq!("5".parse::<FirmwareVersion>().unwrap(), FirmwareVersion::new(5, 0, 0));
        assert!("8.x".parse::<FirmwareVersion>().is_err());
        assert!("8.0.0.0".parse::<FirmwareVersion>().is_err());
    }
}
