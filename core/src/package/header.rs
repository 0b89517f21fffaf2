/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use crate::error::{Error, Result};
use crate::utilities::bytes::{read_u16, read_u32};

/// "PK21"
pub const PACKAGE_MAGIC: u32 = 0x31324B50;

/// Signature area preceding the header in the raw container.
pub const SIGNATURE_LEN: usize = 0x100;
pub const HEADER_LEN: usize = 0x100;
pub const SECTION_COUNT: usize = 4;

/// Container base load address, pre- and post-threshold generation.
pub const LEGACY_BASE: u32 = 0x1000_0000;
pub const MODERN_BASE: u32 = 0x0006_0000;

/// Fixed load address of the standalone process directory section in the
/// legacy generation.
pub const LEGACY_DIRECTORY_ADDR: u32 = 0x1408_0000;

/// Offset inside the kernel section where the embedded-directory generation
/// records where the directory starts (equally: the kernel's own length).
pub const EMBEDDED_DIRECTORY_PTR: usize = 0x168;

/// Section slots inside the container. Each slot owns its counter block;
/// counters are never shared between slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Kernel = 0,
    ProcessDir = 1,
}

/// Fresh counter block for a section slot, derived from the slot index
/// alone so no two sections ever transform under the same counter.
pub fn section_counter(section: Section) -> [u8; 16] {
    let mut ctr = [0u8; 16];
    ctr[15] = section as u8 + 1;
    ctr
}

/// The 0x100-byte container header, decoded into an owned structure.
///
/// Raw layout: counter field, four per-section counter blocks, magic, base
/// address, a version word, per-section sizes and offsets, and the section
/// hash area.
#[derive(Debug, Clone, Default)]
pub struct PackageHeader {
    pub ctr: [u8; 16],
    pub sec_ctr: [[u8; 16]; SECTION_COUNT],
    pub magic: u32,
    pub base: u32,
    pub version: u16,
    pub sec_size: [u32; SECTION_COUNT],
    pub sec_off: [u32; SECTION_COUNT],
    pub sec_hash: [[u8; 0x20]; SECTION_COUNT],
}

impl PackageHeader {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::format("container header truncated"));
        }

        let mut header = PackageHeader::default();
        header.ctr.copy_from_slice(&buf[..0x10]);
        for (i, slot) in header.sec_ctr.iter_mut().enumerate() {
            slot.copy_from_slice(&buf[0x10 + i * 0x10..0x20 + i * 0x10]);
        }
        header.magic = read_u32(buf, 0x50)?;
        header.base = read_u32(buf, 0x54)?;
        header.version = read_u16(buf, 0x5C)?;
        for i in 0..SECTION_COUNT {
            header.sec_size[i] = read_u32(buf, 0x60 + i * 4)?;
            header.sec_off[i] = read_u32(buf, 0x70 + i * 4)?;
            header.sec_hash[i].copy_from_slice(&buf[0x80 + i * 0x20..0xA0 + i * 0x20]);
        }
        Ok(header)
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..0x10].copy_from_slice(&self.ctr);
        for (i, slot) in self.sec_ctr.iter().enumerate() {
            buf[0x10 + i * 0x10..0x20 + i * 0x10].copy_from_slice(slot);
        }
        buf[0x50..0x54].copy_from_slice(&self.magic.to_le_bytes());
        buf[0x54..0x58].copy_from_slice(&self.base.to_le_bytes());
        buf[0x5C..0x5E].copy_from_slice(&self.version.to_le_bytes());
        for i in 0..SECTION_COUNT {
            buf[0x60 + i * 4..0x64 + i * 4].copy_from_slice(&self.sec_size[i].to_le_bytes());
            buf[0x70 + i * 4..0x74 + i * 4].copy_from_slice(&self.sec_off[i].to_le_bytes());
            buf[0x80 + i * 0x20..0xA0 + i * 0x20].copy_from_slice(&self.sec_hash[i]);
        }
        buf
    }

    pub fn counter(&self, section: Section) -> &[u8; 16] {
        &self.sec_ctr[section as usize]
    }

    pub fn section_size(&self, section: Section) -> usize {
        self.sec_size[section as usize] as usize
    }
}
