/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use log::{debug, info};

use crate::error::{Error, Result};
use crate::utilities::bytes::read_u32;

/// Block size the storage collaborator works in.
pub const BLOCK_SIZE: usize = 512;

/// Well-known name of the partition holding the firmware container.
pub const PACKAGE_PARTITION: &str = "BCPKG2-1-Normal-Main";

/// Byte offset of the container inside its partition.
const PACKAGE_OFFSET: u64 = 0x4000;

#[derive(Debug, Clone, Copy)]
pub struct PartitionInfo {
    /// First block of the partition on the device.
    pub block_offset: u64,
    /// Partition length in blocks.
    pub block_count: u64,
}

/// Raw block device plus partition-table lookup, implemented by the boot
/// chain's storage driver. The engine consumes the lookup; it never parses
/// the partition table itself.
pub trait BlockStorage {
    fn read_blocks(&mut self, block_offset: u64, block_count: usize) -> Result<Vec<u8>>;
    fn find_partition(&mut self, name: &str) -> Result<Option<PartitionInfo>>;
}

/// Reads the encrypted firmware container off storage.
///
/// One probe block first: the container's size is the XOR of three words of
/// the leading counter field, readable without the key. Then the
/// block-aligned payload, truncated to the real size.
pub fn read_firmware_package(storage: &mut dyn BlockStorage) -> Result<Vec<u8>> {
    let part = storage
        .find_partition(PACKAGE_PARTITION)?
        .ok_or_else(|| Error::source(format!("partition {} not found", PACKAGE_PARTITION)))?;

    let first = part.block_offset + PACKAGE_OFFSET / BLOCK_SIZE as u64;
    debug!("probing container size at block {}", first);

    let probe = storage.read_blocks(first, 1)?;
    let size = (read_u32(&probe, 0x100)? ^ read_u32(&probe, 0x108)? ^ read_u32(&probe, 0x10C)?)
        as usize;
    if size < 0x200 {
        return Err(Error::format(format!("implausible container size {:#x}", size)));
    }

    let blocks = size.div_ceil(BLOCK_SIZE);
    info!("Reading firmware container ({} bytes, {} blocks)", size, blocks);
    let mut raw = storage.read_blocks(first, blocks)?;
    if raw.len() < size {
        return Err(Error::source("storage returned a short container read"));
    }
    raw.truncate(size);
    Ok(raw)
}
