/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use std::collections::HashMap;

use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit};

use crate::error::{Error, Result};

/// Keyslot the firmware container is keyed under.
pub const PACKAGE_KEYSLOT: u32 = 8;

/// Counter-mode stream cipher, normally backed by the hardware security
/// engine. CTR is involutive: calling again with the same counter block
/// undoes the previous call, so one entry point serves decrypt and
/// re-encrypt alike.
///
/// Counter blocks are per logical section and must never be shared between
/// two transforms of different content; reuse corrupts the ciphertext with
/// no detectable error.
pub trait CtrCipher {
    /// Transforms `buf` in place under `keyslot`, starting from `ctr`.
    fn crypt_ctr(&self, keyslot: u32, ctr: &[u8; 16], buf: &mut [u8]) -> Result<()>;
}

/// AES-128-CTR over a software keyslot table, for hosts (and tests) without
/// the hardware engine.
#[derive(Default)]
pub struct SoftwareCipher {
    keys: HashMap<u32, [u8; 16]>,
}

impl SoftwareCipher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, keyslot: u32, key: [u8; 16]) {
        self.keys.insert(keyslot, key);
    }
}

impl CtrCipher for SoftwareCipher {
    fn crypt_ctr(&self, keyslot: u32, ctr: &[u8; 16], buf: &mut [u8]) -> Result<()> {
        let key = self
            .keys
            .get(&keyslot)
            .ok_or_else(|| Error::cipher(format!("no key loaded for keyslot {}", keyslot)))?;

        let cipher = Aes128::new(key.into());
        let mut counter = *ctr;
        let mut keystream = aes::Block::default();

        for chunk in buf.chunks_mut(16) {
            keystream.copy_from_slice(&counter);
            cipher.encrypt_block(&mut keystream);
            for (byte, k) in chunk.iter_mut().zip(keystream.iter()) {
                *byte ^= k;
            }
            increment_counter(&mut counter);
        }

        Ok(())
    }
}

fn increment_counter(counter: &mut [u8; 16]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> SoftwareCipher {
        let mut cipher = SoftwareCipher::new();
        cipher.set_key(PACKAGE_KEYSLOT, [0x42; 16]);
        cipher
    }

    #[test]
    fn transform_is_involutive() {
        let cipher = cipher();
        let ctr = [7u8; 16];
        let original: Vec<u8> = (0u8..=255).collect();

        let mut buf = original.clone();
        cipher.crypt_ctr(PACKAGE_KEYSLOT, &ctr, &mut buf).unwrap();
        assert_ne!(buf, original);
        cipher.crypt_ctr(PACKAGE_KEYSLOT, &ctr, &mut buf).unwrap();
        assert_eq!(buf, original);
    }

    #[test]
    fn distinct_counters_give_distinct_ciphertext() {
        let cipher = cipher();
        let mut a = vec![0u8; 64];
        let mut b = vec![0u8; 64];

        let mut ctr_b = [0u8; 16];
        ctr_b[15] = 1;

        cipher.crypt_ctr(PACKAGE_KEYSLOT, &[0u8; 16], &mut a).unwrap();
        cipher.crypt_ctr(PACKAGE_KEYSLOT, &ctr_b, &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn counter_carries_across_bytes() {
        let mut counter = [0xFFu8; 16];
        increment_counter(&mut counter);
        assert_eq!(counter, [0u8; 16]);

        let mut counter = [0u8; 16];
        counter[15] = 0xFF;
        increment_counter(&mut counter);
        assert_eq!(counter[14], 1);
        assert_eq!(counter[15], 0);
    }

    #[test]
    fn missing_keyslot_is_an_error() {
        let cipher = SoftwareCipher::new();
        let mut buf = [0u8; 16];
        assert!(cipher.crypt_ctr(3, &[0u8; 16], &mut buf).is_err());
    }
}
