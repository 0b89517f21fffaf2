/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::package::FirmwareVersion;
use crate::source::FileSource;

/// The three well-known replaceable firmware components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideRole {
    BootFirmware,
    SecureMonitor,
    Kernel,
}

impl OverrideRole {
    /// Candidate paths on the override source, probed in order. Earlier
    /// names win.
    pub fn paths(&self) -> &'static [&'static str] {
        match self {
            Self::BootFirmware => &["/umbra/warmboot.bin", "/umbra/lp0fw.bin"],
            Self::SecureMonitor => &["/umbra/secmon.bin", "/umbra/exosphere.bin"],
            Self::Kernel => &["/umbra/kernel.bin"],
        }
    }

    /// Roles the vendor package no longer carries usable builds of past
    /// the override threshold.
    pub fn mandatory_past_threshold(&self) -> bool {
        matches!(self, Self::BootFirmware | Self::SecureMonitor)
    }
}

impl fmt::Display for OverrideRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BootFirmware => "boot firmware",
            Self::SecureMonitor => "secure monitor",
            Self::Kernel => "kernel",
        };
        write!(f, "{name}")
    }
}

/// Lazily reads override files, remembering both hits and misses so each
/// path is probed at most once per run.
#[derive(Debug, Default)]
pub struct OverrideResolver {
    cache: HashMap<OverrideRole, Option<Vec<u8>>>,
    named: HashMap<String, Option<Vec<u8>>>,
}

impl OverrideResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve<F: FileSource>(
        &mut self,
        files: &mut F,
        role: OverrideRole,
    ) -> Result<&mut Option<Vec<u8>>> {
        match self.cache.entry(role) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut found = None;
                for path in role.paths() {
                    if let Some(bytes) = files.try_read_file(path)? {
                        info!("using custom {role} from {path} ({} bytes)", bytes.len());
                        found = Some(bytes);
                        break;
                    }
                    debug!("no {role} at {path}");
                }
                Ok(entry.insert(found))
            }
        }
    }

    /// Whether an override for the role exists on the source.
    pub fn is_present<F: FileSource>(&mut self, files: &mut F, role: OverrideRole) -> Result<bool> {
        Ok(self.resolve(files, role)?.is_some())
    }

    /// Fails when a role the given firmware generation cannot ship
    /// without has no override present.
    pub fn require<F: FileSource>(
        &mut self,
        files: &mut F,
        role: OverrideRole,
        version: FirmwareVersion,
    ) -> Result<()> {
        if role.mandatory_past_threshold()
            && version.requires_overrides()
            && !self.is_present(files, role)?
        {
            return Err(Error::MissingOverride { role, version });
        }
        Ok(())
    }

    /// Takes ownership of the override bytes, if any.
    pub fn take<F: FileSource>(
        &mut self,
        files: &mut F,
        role: OverrideRole,
    ) -> Result<Option<Vec<u8>>> {
        Ok(self.resolve(files, role)?.take())
    }

    /// Reads an arbitrary caller-named file once, memoized by path.
    pub fn resolve_named<F: FileSource>(
        &mut self,
        files: &mut F,
        path: &str,
    ) -> Result<Option<Vec<u8>>> {
        if !self.named.contains_key(path) {
            let bytes = files.try_read_file(path)?;
            self.named.insert(path.to_string(), bytes);
        }
        Ok(self.named[path].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MemorySource(HashMap<&'static str, Vec<u8>>);

    impl FileSource for MemorySource {
        fn try_read_file(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.0.get(path).cloned())
        }
    }

    struct CountingSource {
        inner: MemorySource,
        reads: usize,
    }

    impl FileSource for CountingSource {
        fn try_read_file(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
            self.reads += 1;
            self.inner.try_read_file(path)
        }
    }

    #[test]
    fn earlier_path_wins() {
        let mut files = MemorySource(HashMap::from([
            ("/umbra/warmboot.bin", b"primary".to_vec()),
            ("/umbra/lp0fw.bin", b"fallback".to_vec()),
        ]));
        let mut resolver = OverrideResolver::new();
        let bytes = resolver.take(&mut files, OverrideRole::BootFirmware).unwrap();
        assert_eq!(bytes.as_deref(), Some(b"primary".as_slice()));
    }

    #[test]
    fn fallback_path_is_probed() {
        let mut files = MemorySource(HashMap::from([("/umbra/lp0fw.bin", b"fallback".to_vec())]));
        let mut resolver = OverrideResolver::new();
        let bytes = resolver.take(&mut files, OverrideRole::BootFirmware).unwrap();
        assert_eq!(bytes.as_deref(), Some(b"fallback".as_slice()));
    }

    #[test]
    fn misses_are_cached() {
        let mut files = CountingSource { inner: MemorySource(HashMap::new()), reads: 0 };
        let mut resolver = OverrideResolver::new();
        assert!(!resolver.is_present(&mut files, OverrideRole::Kernel).unwrap());
        assert!(!resolver.is_present(&mut files, OverrideRole::Kernel).unwrap());
        assert_eq!(files.reads, 1);
    }

    #[test]
    fn mandatory_roles_are_enforced_past_the_threshold() {
        let mut files = MemorySource(HashMap::new());
        let mut resolver = OverrideResolver::new();
        let old = "6.2.0".parse().unwrap();
        let new = "7.0.0".parse().unwrap();

        resolver.require(&mut files, OverrideRole::SecureMonitor, old).unwrap();
        resolver.require(&mut files, OverrideRole::Kernel, new).unwrap();
        let err = resolver.require(&mut files, OverrideRole::SecureMonitor, new).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingOverride { role: OverrideRole::SecureMonitor, .. }
        ));
    }

    #[test]
    fn named_reads_are_memoized() {
        let mut files = CountingSource {
            inner: MemorySource(HashMap::from([("/umbra/kips/extra.kip", b"kip".to_vec())])),
            reads: 0,
        };
        let mut resolver = OverrideResolver::new();
        let first = resolver.resolve_named(&mut files, "/umbra/kips/extra.kip").unwrap();
        let second = resolver.resolve_named(&mut files, "/umbra/kips/extra.kip").unwrap();
        assert_eq!(first, second);
        assert_eq!(files.reads, 1);
    }
}
