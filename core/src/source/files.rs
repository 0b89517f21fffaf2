/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use std::fs;
use std::io;
use std::path::PathBuf;

use log::debug;

use crate::error::{Error, Result};

/// Read-only view of the external filesystem override content lives on.
/// An absent file is `Ok(None)`; only a real I/O failure is an error, and
/// that error aborts the boot unchanged.
pub trait FileSource {
    fn try_read_file(&mut self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// `FileSource` over a host directory. Engine paths are absolute
/// (`/umbra/...`); the leading separator is resolved against the root.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl FileSource for DirSource {
    fn try_read_file(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        let host = self.resolve(path);
        match fs::read(&host) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} not present", host.display());
                Ok(None)
            }
            Err(e) => Err(Error::source(format!("reading {}: {}", host.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_is_none_not_an_error() {
        let mut source = DirSource::new(std::env::temp_dir().join("umbra-no-such-dir"));
        assert!(source.try_read_file("/umbra/kernel.bin").unwrap().is_none());
    }

    #[test]
    fn engine_paths_resolve_under_the_root() {
        let source = DirSource::new("/tmp/root");
        assert_eq!(source.resolve("/umbra/secmon.bin"), PathBuf::from("/tmp/root/umbra/secmon.bin"));
        assert_eq!(source.resolve("plain.bin"), PathBuf::from("/tmp/root/plain.bin"));
    }
}
