/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use std::collections::HashMap;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::utilities::bytes::{read_u32, read_u64};

/// "INI1"
pub const DIRECTORY_MAGIC: u32 = 0x31494E49;
pub const DIRECTORY_HEADER_LEN: usize = 0x10;

/// "KIP1"
pub const IMAGE_MAGIC: u32 = 0x3150494B;
pub const IMAGE_HEADER_LEN: usize = 0x100;
pub const IMAGE_SECTIONS: usize = 6;

const IMAGE_NAME_OFF: usize = 0x4;
const IMAGE_NAME_LEN: usize = 12;
const IMAGE_TID_OFF: usize = 0x10;
const IMAGE_SECTION_TABLE_OFF: usize = 0x20;
const IMAGE_SECTION_ENTRY_LEN: usize = 0x10;
const IMAGE_SECTION_COMP_SIZE_OFF: usize = 0x8;

/// One embedded kernel-process image. The bytes are kept verbatim,
/// header included, exactly as they go back into the rebuilt directory.
#[derive(Debug, Clone)]
pub struct ProcessImage {
    tid: u64,
    name: String,
    bytes: Vec<u8>,
}

impl ProcessImage {
    /// Decodes one image record from the front of `data`. The record's
    /// total length is the fixed header plus the six declared compressed
    /// section sizes; everything is checked against the buffer before use.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if read_u32(data, 0)? != IMAGE_MAGIC {
            return Err(Error::format("process image magic invalid"));
        }
        if data.len() < IMAGE_HEADER_LEN {
            return Err(Error::format("process image header truncated"));
        }

        let tid = read_u64(data, IMAGE_TID_OFF)?;
        let raw_name = &data[IMAGE_NAME_OFF..IMAGE_NAME_OFF + IMAGE_NAME_LEN];
        let name = String::from_utf8_lossy(raw_name).trim_end_matches('\0').to_string();

        let total = Self::declared_len(data)?;
        if total > data.len() {
            return Err(Error::format(format!(
                "process image {:#018x} overruns the directory ({:#x} > {:#x})",
                tid,
                total,
                data.len()
            )));
        }

        Ok(Self { tid, name, bytes: data[..total].to_vec() })
    }

    /// Fixed header size plus the sum of the declared per-section
    /// compressed sizes.
    fn declared_len(header: &[u8]) -> Result<usize> {
        let mut total = IMAGE_HEADER_LEN;
        for i in 0..IMAGE_SECTIONS {
            let off =
                IMAGE_SECTION_TABLE_OFF + i * IMAGE_SECTION_ENTRY_LEN + IMAGE_SECTION_COMP_SIZE_OFF;
            total += read_u32(header, off)? as usize;
        }
        Ok(total)
    }

    pub fn tid(&self) -> u64 {
        self.tid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The patch engine rewrites verified ranges in place.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Ordered, tid-keyed collection of process images. Insertion order is the
/// container order and is preserved across rebuilds; tid lookups go through
/// a side index.
#[derive(Debug, Default)]
pub struct ProcessCatalog {
    images: Vec<ProcessImage>,
    index: HashMap<u64, usize>,
}

impl ProcessCatalog {
    /// Walks the decrypted directory: 0x10 header (magic, total size,
    /// entry count), then back-to-back variable-length records.
    pub fn parse(directory: &[u8]) -> Result<Self> {
        if read_u32(directory, 0)? != DIRECTORY_MAGIC {
            return Err(Error::format("process directory magic invalid"));
        }
        let declared = read_u32(directory, 4)? as usize;
        let count = read_u32(directory, 8)? as usize;
        if declared < DIRECTORY_HEADER_LEN || declared > directory.len() {
            return Err(Error::format(format!(
                "process directory declares {:#x} bytes but holds {:#x}",
                declared,
                directory.len()
            )));
        }

        let mut catalog = ProcessCatalog::default();
        let mut cursor = DIRECTORY_HEADER_LEN;
        for _ in 0..count {
            let rest = directory.get(cursor..declared).ok_or_else(|| {
                Error::format("process directory ends before its declared entry count")
            })?;
            let image = ProcessImage::decode(rest)?;
            cursor += image.len();
            debug!("found process '{}' ({:#018x}, {} bytes)", image.name, image.tid, image.len());
            catalog.push(image)?;
        }

        info!("Process directory holds {} images", catalog.len());
        Ok(catalog)
    }

    fn push(&mut self, image: ProcessImage) -> Result<()> {
        if self.index.contains_key(&image.tid) {
            return Err(Error::format(format!("duplicate process identity {:#018x}", image.tid)));
        }
        self.index.insert(image.tid, self.images.len());
        self.images.push(image);
        Ok(())
    }

    /// Replaces the entry sharing the image's tid in place, or appends.
    /// Either way, unrelated images keep their relative order.
    pub fn replace_or_append(&mut self, image: ProcessImage) {
        match self.index.get(&image.tid) {
            Some(&pos) => {
                info!("replacing process '{}' ({:#018x})", image.name, image.tid);
                self.images[pos] = image;
            }
            None => {
                info!("adding process '{}' ({:#018x})", image.name, image.tid);
                self.index.insert(image.tid, self.images.len());
                self.images.push(image);
            }
        }
    }

    pub fn get(&self, tid: u64) -> Option<&ProcessImage> {
        self.index.get(&tid).map(|&pos| &self.images[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessImage> {
        self.images.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProcessImage> {
        self.images.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Serializes the directory: header, then every image in catalog order.
    pub fn serialize(&self) -> Vec<u8> {
        let total = DIRECTORY_HEADER_LEN + self.images.iter().map(ProcessImage::len).sum::<usize>();

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&DIRECTORY_MAGIC.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(self.images.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for image in &self.images {
            debug!("adding process '{}' ({} bytes)", image.name, image.len());
            out.extend_from_slice(&image.bytes);
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Builds a minimal valid image record: header plus one compressed
    /// section holding `payload`.
    pub fn make_image(tid: u64, name: &str, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; IMAGE_HEADER_LEN];
        bytes[..4].copy_from_slice(&IMAGE_MAGIC.to_le_bytes());
        bytes[IMAGE_NAME_OFF..IMAGE_NAME_OFF + name.len()].copy_from_slice(name.as_bytes());
        bytes[IMAGE_TID_OFF..IMAGE_TID_OFF + 8].copy_from_slice(&tid.to_le_bytes());
        let size_off = IMAGE_SECTION_TABLE_OFF + IMAGE_SECTION_COMP_SIZE_OFF;
        bytes[size_off..size_off + 4].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    /// A directory blob around already-encoded image records.
    pub fn make_directory(records: &[Vec<u8>]) -> Vec<u8> {
        let total = DIRECTORY_HEADER_LEN + records.iter().map(Vec::len).sum::<usize>();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&DIRECTORY_MAGIC.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(records.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for record in records {
            out.extend_from_slice(record);
        }
        out
    }
}
