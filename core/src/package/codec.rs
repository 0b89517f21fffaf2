/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use log::{debug, info, warn};

use super::catalog::ProcessCatalog;
use super::header::{
    EMBEDDED_DIRECTORY_PTR, HEADER_LEN, LEGACY_BASE, LEGACY_DIRECTORY_ADDR, MODERN_BASE,
    PACKAGE_MAGIC, PackageHeader, SECTION_COUNT, SIGNATURE_LEN, Section, section_counter,
};
use super::{FirmwareVersion, kernelmap};
use crate::crypto::{CtrCipher, PACKAGE_KEYSLOT};
use crate::error::{Error, Result};
use crate::utilities::bytes::{read_u32, write_u32};

/// A decoded firmware container: the parsed header and every section in
/// plaintext.
#[derive(Debug)]
pub struct Package {
    pub header: PackageHeader,
    sections: [Vec<u8>; SECTION_COUNT],
}

impl Package {
    pub fn section(&self, section: Section) -> &[u8] {
        &self.sections[section as usize]
    }

    /// The kernel proper, without any process directory embedded behind
    /// it. Modern containers keep the directory offset inside the kernel
    /// image itself.
    pub fn kernel_payload(&self) -> Result<&[u8]> {
        let kernel = self.section(Section::Kernel);
        if self.header.section_size(Section::ProcessDir) != 0 {
            return Ok(kernel);
        }
        let end = read_u32(kernel, EMBEDDED_DIRECTORY_PTR)? as usize;
        kernel
            .get(..end)
            .ok_or_else(|| Error::format("embedded directory offset exceeds the kernel section"))
    }

    /// The raw process directory bytes, wherever the container keeps them.
    pub fn directory(&self) -> Result<&[u8]> {
        if self.header.section_size(Section::ProcessDir) != 0 {
            return Ok(self.section(Section::ProcessDir));
        }
        let kernel = self.section(Section::Kernel);
        let start = read_u32(kernel, EMBEDDED_DIRECTORY_PTR)? as usize;
        kernel
            .get(start..)
            .ok_or_else(|| Error::format("embedded directory offset exceeds the kernel section"))
    }
}

/// Decodes a raw container. The header transforms under its own leading
/// counter field; each section then transforms under the counter block its
/// header slot carries.
///
/// Containers rebuilt without encryption (secure-monitor override runs)
/// are recognized by their cleartext magic at +0x50 and read as-is, so a
/// rebuilt container can be inspected without a key. An encrypted header
/// whose ciphertext collides with the magic at that word would be
/// misread; at 2^-32 per container that is accepted.
pub fn unpack<C: CtrCipher>(raw: &[u8], cipher: &C) -> Result<Package> {
    let body_start = SIGNATURE_LEN + HEADER_LEN;
    if raw.len() < body_start {
        return Err(Error::format(format!(
            "container of {:#x} bytes is too small to hold a header",
            raw.len()
        )));
    }

    let mut header_buf = raw[SIGNATURE_LEN..body_start].to_vec();
    let mut encrypted = true;
    if read_u32(&header_buf, 0x50)? == PACKAGE_MAGIC {
        debug!("container magic is cleartext, skipping decryption");
        encrypted = false;
    } else {
        let mut iv = [0u8; 16];
        iv.copy_from_slice(&header_buf[..16]);
        cipher.crypt_ctr(PACKAGE_KEYSLOT, &iv, &mut header_buf)?;
        header_buf[..16].copy_from_slice(&iv);
    }

    let header = PackageHeader::parse(&header_buf)?;
    if header.magic != PACKAGE_MAGIC {
        return Err(Error::format(format!(
            "container magic invalid ({:#010x}), wrong key or not a firmware package",
            header.magic
        )));
    }
    info!("Unpacking container (base {:#010x})", header.base);

    let mut sections: [Vec<u8>; SECTION_COUNT] = Default::default();
    let mut cursor = body_start;
    for (i, slot) in sections.iter_mut().enumerate() {
        let size = header.sec_size[i] as usize;
        if size == 0 {
            continue;
        }
        let raw_section = raw
            .get(cursor..cursor + size)
            .ok_or_else(|| Error::format(format!("section {i} extends past the container end")))?;
        let mut bytes = raw_section.to_vec();
        if encrypted {
            cipher.crypt_ctr(PACKAGE_KEYSLOT, &header.sec_ctr[i], &mut bytes)?;
        }
        debug!("section {i}: {size:#x} bytes at {:#010x}", header.sec_off[i]);
        *slot = bytes;
        cursor += size;
    }

    Ok(Package { header, sections })
}

/// Assembles a bootable container from a kernel image and a process
/// catalog. Generations that embed the directory get it appended to the
/// kernel section with the kernel's own size field rewritten to the
/// boundary; older generations carry it as a section of its own.
pub fn build<C: CtrCipher>(
    kernel: &[u8],
    catalog: &ProcessCatalog,
    version: FirmwareVersion,
    encrypt: bool,
    cipher: &C,
) -> Result<Vec<u8>> {
    let embedded = version.embeds_directory();
    let directory = catalog.serialize();

    let mut header = PackageHeader {
        magic: PACKAGE_MAGIC,
        base: if embedded { MODERN_BASE } else { LEGACY_BASE },
        ..Default::default()
    };

    let mut kernel_section = kernel.to_vec();
    let mut dir_section = Vec::new();
    if embedded {
        let size_field = kernelmap::size_field_offset(version)?;
        write_u32(&mut kernel_section, size_field, kernel.len() as u32)?;
        kernel_section.extend_from_slice(&directory);
        info!("embedding {} bytes of process directory in the kernel section", directory.len());
    } else {
        dir_section = directory;
        header.sec_off[Section::ProcessDir as usize] = LEGACY_DIRECTORY_ADDR;
        header.sec_size[Section::ProcessDir as usize] = dir_section.len() as u32;
    }

    header.sec_off[Section::Kernel as usize] = header.base;
    header.sec_size[Section::Kernel as usize] = kernel_section.len() as u32;
    header.sec_ctr[Section::Kernel as usize] = section_counter(Section::Kernel);
    header.sec_ctr[Section::ProcessDir as usize] = section_counter(Section::ProcessDir);

    let total = SIGNATURE_LEN + HEADER_LEN + kernel_section.len() + dir_section.len();
    header.ctr[..4].copy_from_slice(&(total as u32).to_le_bytes());

    if encrypt {
        cipher.crypt_ctr(PACKAGE_KEYSLOT, header.counter(Section::Kernel), &mut kernel_section)?;
        if !dir_section.is_empty() {
            cipher.crypt_ctr(
                PACKAGE_KEYSLOT,
                header.counter(Section::ProcessDir),
                &mut dir_section,
            )?;
        }
    } else {
        warn!("building cleartext container");
    }

    let mut header_buf = header.encode();
    if encrypt {
        let iv = header.ctr;
        cipher.crypt_ctr(PACKAGE_KEYSLOT, &iv, &mut header_buf)?;
        // The counter field stays cleartext so readers can recover the IV.
        header_buf[..16].copy_from_slice(&iv);
    }

    let mut out = Vec::with_capacity(total);
    out.resize(SIGNATURE_LEN, 0);
    out.extend_from_slice(&header_buf);
    out.extend_from_slice(&kernel_section);
    out.extend_from_slice(&dir_section);
    info!("Built {total:#x} byte container");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SoftwareCipher;
    use crate::package::catalog::testutil::{make_directory, make_image};
    use crate::package::catalog::{DIRECTORY_MAGIC, ProcessCatalog};

    fn cipher() -> SoftwareCipher {
        let mut cipher = SoftwareCipher::new();
        cipher.set_key(PACKAGE_KEYSLOT, [0x42; 16]);
        cipher
    }

    fn catalog() -> ProcessCatalog {
        let directory = make_directory(&[
            make_image(0xA, "alpha", b"aa"),
            make_image(0xB, "beta", b"bbbb"),
        ]);
        ProcessCatalog::parse(&directory).unwrap()
    }

    #[test]
    fn legacy_container_round_trips() {
        let cipher = cipher();
        let kernel = vec![0x5A; 0x400];
        let version = "6.2.0".parse().unwrap();

        let raw = build(&kernel, &catalog(), version, true, &cipher).unwrap();
        let package = unpack(&raw, &cipher).unwrap();

        assert_eq!(package.header.base, LEGACY_BASE);
        assert_eq!(package.kernel_payload().unwrap(), kernel.as_slice());
        assert_eq!(package.directory().unwrap(), catalog().serialize());
    }

    #[test]
    fn modern_container_embeds_the_directory() {
        let cipher = cipher();
        let kernel = vec![0xC3; 0x400];
        let version = "8.0.0".parse().unwrap();

        let raw = build(&kernel, &catalog(), version, true, &cipher).unwrap();
        let package = unpack(&raw, &cipher).unwrap();

        assert_eq!(package.header.base, MODERN_BASE);
        assert_eq!(package.header.section_size(Section::ProcessDir), 0);

        // Size field points at the original kernel end, directory follows.
        let section = package.section(Section::Kernel);
        assert_eq!(read_u32(section, EMBEDDED_DIRECTORY_PTR).unwrap(), kernel.len() as u32);
        let payload = package.kernel_payload().unwrap();
        assert_eq!(payload.len(), kernel.len());
        assert_eq!(&payload[..EMBEDDED_DIRECTORY_PTR], &kernel[..EMBEDDED_DIRECTORY_PTR]);
        assert_eq!(read_u32(package.directory().unwrap(), 0).unwrap(), DIRECTORY_MAGIC);
    }

    #[test]
    fn cleartext_container_is_read_without_a_key() {
        let keyless = SoftwareCipher::new();
        let kernel = vec![0x11; 0x400];
        let version = "8.1.0".parse().unwrap();

        let raw = build(&kernel, &catalog(), version, false, &keyless).unwrap();
        let package = unpack(&raw, &keyless).unwrap();
        assert_eq!(package.directory().unwrap(), catalog().serialize());
    }

    #[test]
    fn counter_field_carries_the_total_size() {
        let cipher = cipher();
        let raw = build(&[0u8; 0x400], &catalog(), "6.2.0".parse().unwrap(), true, &cipher).unwrap();

        let size = read_u32(&raw, SIGNATURE_LEN).unwrap();
        assert_eq!(size as usize, raw.len());
    }

    #[test]
    fn wrong_key_is_a_format_error() {
        let raw = build(&[0u8; 0x400], &catalog(), "6.2.0".parse().unwrap(), true, &cipher()).unwrap();

        let mut other = SoftwareCipher::new();
        other.set_key(PACKAGE_KEYSLOT, [0x99; 16]);
        assert!(matches!(unpack(&raw, &other), Err(Error::Format(_))));
    }

    #[test]
    fn truncated_container_is_a_format_error() {
        let cipher = cipher();
        let raw = build(&[0u8; 0x400], &catalog(), "6.2.0".parse().unwrap(), true, &cipher).unwrap();

        assert!(matches!(unpack(&raw[..0x100], &cipher), Err(Error::Format(_))));
        assert!(matches!(unpack(&raw[..raw.len() - 1], &cipher), Err(Error::Format(_))));
    }
}
