/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
mod ctr;
mod hash;

pub use ctr::{CtrCipher, PACKAGE_KEYSLOT, SoftwareCipher};
pub use hash::{FINGERPRINT_LEN, Fingerprint, fingerprint};
