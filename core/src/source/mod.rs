/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
pub mod files;
pub mod storage;

pub use files::{DirSource, FileSource};
pub use storage::{BLOCK_SIZE, BlockStorage, PartitionInfo, read_firmware_package};
