/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/

//! Bounds-checked little-endian accessors over flat buffers. Every offset
//! computed while decoding a container is validated here before it is read.

use crate::error::{Error, Result};

fn out_of_range(what: &str, offset: usize, len: usize) -> Error {
    Error::format(format!("{} read at {:#x} past end of buffer ({:#x})", what, offset, len))
}

pub fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes(b.try_into().unwrap()))
        .ok_or_else(|| out_of_range("u16", offset, data.len()))
}

pub fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
        .ok_or_else(|| out_of_range("u32", offset, data.len()))
}

pub fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    data.get(offset..offset + 8)
        .map(|b| u64::from_le_bytes(b.try_into().unwrap()))
        .ok_or_else(|| out_of_range("u64", offset, data.len()))
}

pub fn write_u32(data: &mut [u8], offset: usize, value: u32) -> Result<()> {
    let len = data.len();
    data.get_mut(offset..offset + 4)
        .map(|b| b.copy_from_slice(&value.to_le_bytes()))
        .ok_or_else(|| out_of_range("u32", offset, len))
}
