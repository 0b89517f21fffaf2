/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use sha2::{Digest, Sha256};

pub const FINGERPRINT_LEN: usize = 16;

/// First 16 bytes of the SHA-256 of an image. The patch table is keyed by
/// this prefix; the truncation is a known, accepted limitation.
pub type Fingerprint = [u8; FINGERPRINT_LEN];

pub fn fingerprint(data: &[u8]) -> Fingerprint {
    let digest = Sha256::digest(data);
    let mut fp = [0u8; FINGERPRINT_LEN];
    fp.copy_from_slice(&digest[..FINGERPRINT_LEN]);
    fp
}
