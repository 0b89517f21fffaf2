/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use log::{debug, info, warn};

use super::catalog::{ProcessCatalog, ProcessImage};
use super::overrides::{OverrideResolver, OverrideRole};
use super::patch::{PatchFilter, apply_patch_set, find_patch_set};
use super::patches::PATCH_SETS;
use super::{FirmwareVersion, codec};
use crate::crypto::{CtrCipher, fingerprint};
use crate::error::Result;
use crate::source::FileSource;

/// Everything a boot chain needs after a repack: the rebuilt container and
/// the companion components that ship alongside it.
#[derive(Debug)]
pub struct RepackOutput {
    pub package: Vec<u8>,
    pub boot_firmware: Option<Vec<u8>>,
    pub secure_monitor: Option<Vec<u8>>,
}

/// Drives a full repack: decode the vendor container, patch and override
/// its processes, and rebuild it for the requested firmware generation.
pub struct Repackager<C: CtrCipher, F: FileSource> {
    cipher: C,
    files: F,
    version: FirmwareVersion,
    image_overrides: Vec<String>,
}

impl<C: CtrCipher, F: FileSource> Repackager<C, F> {
    pub fn new(cipher: C, files: F, version: FirmwareVersion) -> Self {
        Self { cipher, files, version, image_overrides: Vec::new() }
    }

    /// Registers a process image file to inject. Images sharing a tid with
    /// a vendor process replace it in place; new tids append.
    pub fn add_process_override(&mut self, path: impl Into<String>) {
        self.image_overrides.push(path.into());
    }

    pub fn run(mut self, raw: &[u8]) -> Result<RepackOutput> {
        info!("Repacking firmware {} container", self.version);
        let package = codec::unpack(raw, &self.cipher)?;

        let mut resolver = OverrideResolver::new();
        resolver.require(&mut self.files, OverrideRole::BootFirmware, self.version)?;
        resolver.require(&mut self.files, OverrideRole::SecureMonitor, self.version)?;

        // A custom secure monitor cannot derive the vendor package key, so
        // the rebuilt container has to stay cleartext for it.
        let external_monitor =
            resolver.is_present(&mut self.files, OverrideRole::SecureMonitor)?;
        if external_monitor {
            warn!("custom secure monitor present, output will not be encrypted");
        }

        let kernel_override = resolver.take(&mut self.files, OverrideRole::Kernel)?;
        let mut catalog = ProcessCatalog::parse(package.directory()?)?;

        let filter = PatchFilter::from_source(&mut self.files)?;
        for image in catalog.iter_mut() {
            let print = fingerprint(image.bytes());
            match find_patch_set(PATCH_SETS, image.name(), &print) {
                Some(set) => apply_patch_set(set, &filter, image.bytes_mut())?,
                None => {
                    debug!("no patches for process '{}' ({})", image.name(), hex::encode(print))
                }
            }
        }

        for path in std::mem::take(&mut self.image_overrides) {
            match resolver.resolve_named(&mut self.files, &path)? {
                Some(bytes) => catalog.replace_or_append(ProcessImage::decode(&bytes)?),
                None => warn!("process override {path} not found, skipping"),
            }
        }

        let kernel = match &kernel_override {
            Some(bytes) => {
                info!("using custom kernel ({} bytes)", bytes.len());
                bytes.as_slice()
            }
            None => package.kernel_payload()?,
        };

        let rebuilt =
            codec::build(kernel, &catalog, self.version, !external_monitor, &self.cipher)?;

        Ok(RepackOutput {
            package: rebuilt,
            boot_firmware: resolver.take(&mut self.files, OverrideRole::BootFirmware)?,
            secure_monitor: resolver.take(&mut self.files, OverrideRole::SecureMonitor)?,
        })
    }
}
