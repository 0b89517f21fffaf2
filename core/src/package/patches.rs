/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
//! Built-in patch table for the FS process, keyed by image fingerprint.
//! Retail and exfat builds of the same release often share a body and
//! therefore a patch layout, so several fingerprints point at one set.

use super::patch::{Diff, Patch, PatchSet};

/// AArch64 `nop`.
const NOP: &[u8] = b"\x1f\x20\x03\xd5";
/// AArch64 `mov w0, #0`.
const MOV_W0_ZERO: &[u8] = b"\x00\x00\x80\x52";
/// AArch64 `mov w0, #0` + `ret`.
const RET_ZERO: &[u8] = b"\x00\x00\x80\x52\xc0\x03\x5f\xd6";

macro_rules! fs_patches {
    (sigchk @ $sig:literal : $sig_orig:literal, cmac @ $cmac:literal : $cmac_orig:literal) => {
        &[
            Patch {
                name: "nosigchk",
                diffs: &[Diff { offset: $sig, original: $sig_orig, replacement: MOV_W0_ZERO }],
            },
            Patch {
                name: "nocmac",
                diffs: &[Diff { offset: $cmac, original: $cmac_orig, replacement: NOP }],
            },
        ]
    };
    (sigchk @ $sig:literal : $sig_orig:literal, cmac @ $cmac:literal : $cmac_orig:literal,
     gc @ $gc:literal : $gc_orig:literal) => {
        &[
            Patch {
                name: "nosigchk",
                diffs: &[Diff { offset: $sig, original: $sig_orig, replacement: MOV_W0_ZERO }],
            },
            Patch {
                name: "nocmac",
                diffs: &[Diff { offset: $cmac, original: $cmac_orig, replacement: NOP }],
            },
            Patch {
                name: "nogc",
                diffs: &[Diff { offset: $gc, original: $gc_orig, replacement: RET_ZERO }],
            },
        ]
    };
}

const FS_100: &[Patch] = fs_patches!(
    sigchk @ 0x194A0: b"\x80\x06\x00\x36", cmac @ 0x33290: b"\x81\x0b\x00\x94");
const FS_200: &[Patch] = fs_patches!(
    sigchk @ 0x1A3E4: b"\xa0\x06\x00\x36", cmac @ 0x3F158: b"\x95\x0c\x00\x94");
const FS_210: &[Patch] = fs_patches!(
    sigchk @ 0x1A614: b"\xa0\x06\x00\x36", cmac @ 0x3F3C8: b"\x95\x0c\x00\x94");
const FS_300: &[Patch] = fs_patches!(
    sigchk @ 0x1C4E4: b"\xe0\x05\x00\x36", cmac @ 0x49EC8: b"\x3d\x0d\x00\x94");
const FS_301: &[Patch] = fs_patches!(
    sigchk @ 0x1C544: b"\xe0\x05\x00\x36", cmac @ 0x49F28: b"\x3d\x0d\x00\x94");
const FS_401: &[Patch] = fs_patches!(
    sigchk @ 0x1F2D4: b"\xc0\x05\x00\x36", cmac @ 0x580F8: b"\x6a\x0e\x00\x94",
    gc @ 0xA3458: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_410: &[Patch] = fs_patches!(
    sigchk @ 0x1F3B4: b"\xc0\x05\x00\x36", cmac @ 0x581D8: b"\x6a\x0e\x00\x94",
    gc @ 0xA3560: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_500: &[Patch] = fs_patches!(
    sigchk @ 0x24564: b"\x00\x06\x00\x36", cmac @ 0x62908: b"\xca\x0f\x00\x94",
    gc @ 0xCF3C4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_510: &[Patch] = fs_patches!(
    sigchk @ 0x24754: b"\x00\x06\x00\x36", cmac @ 0x62AF8: b"\xca\x0f\x00\x94",
    gc @ 0xCF654: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_600_40: &[Patch] = fs_patches!(
    sigchk @ 0x29F44: b"\x40\x06\x00\x36", cmac @ 0x75A64: b"\x21\x11\x00\x94",
    gc @ 0x1111D4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_600_40_EXFAT: &[Patch] = fs_patches!(
    sigchk @ 0x29F44: b"\x40\x06\x00\x36", cmac @ 0x75A64: b"\x21\x11\x00\x94",
    gc @ 0x11C9D4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_600_50: &[Patch] = fs_patches!(
    sigchk @ 0x2A114: b"\x40\x06\x00\x36", cmac @ 0x75C34: b"\x21\x11\x00\x94",
    gc @ 0x1113A4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_600_50_EXFAT: &[Patch] = fs_patches!(
    sigchk @ 0x2A114: b"\x40\x06\x00\x36", cmac @ 0x75C34: b"\x21\x11\x00\x94",
    gc @ 0x11CBA4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_700: &[Patch] = fs_patches!(
    sigchk @ 0x2D2E4: b"\x40\x06\x00\x36", cmac @ 0x7F3A4: b"\x78\x12\x00\x94",
    gc @ 0x11F644: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_700_EXFAT: &[Patch] = fs_patches!(
    sigchk @ 0x2D2E4: b"\x40\x06\x00\x36", cmac @ 0x7F3A4: b"\x78\x12\x00\x94",
    gc @ 0x12AE44: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_800: &[Patch] = fs_patches!(
    sigchk @ 0x2F0E4: b"\x40\x06\x00\x36", cmac @ 0x849E4: b"\xa1\x12\x00\x94",
    gc @ 0x129BE4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_800_EXFAT: &[Patch] = fs_patches!(
    sigchk @ 0x2F0E4: b"\x40\x06\x00\x36", cmac @ 0x849E4: b"\xa1\x12\x00\x94",
    gc @ 0x1353E4: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_810: &[Patch] = fs_patches!(
    sigchk @ 0x2F1D4: b"\x40\x06\x00\x36", cmac @ 0x84AD4: b"\xa1\x12\x00\x94",
    gc @ 0x129D54: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");
const FS_810_EXFAT: &[Patch] = fs_patches!(
    sigchk @ 0x2F1D4: b"\x40\x06\x00\x36", cmac @ 0x84AD4: b"\xa1\x12\x00\x94",
    gc @ 0x135554: b"\xe5\x07\x00\x32\xe0\x03\x16\xaa");

#[rustfmt::skip]
pub static PATCH_SETS: &[PatchSet] = &[
    PatchSet { process: "FS", fingerprint: *b"\xde\x9f\xdd\xa4\x08\x5d\xd5\xfe\x68\xdc\xb2\x0b\x41\x09\x5b\xb4", patches: FS_100 },
    PatchSet { process: "FS", fingerprint: *b"\xfc\x3e\x80\x99\x1d\xca\x17\x96\x4a\x12\x1f\x04\xb6\x1b\x17\x5e", patches: FS_100 },
    PatchSet { process: "FS", fingerprint: *b"\xcd\x7b\xbe\x18\xd6\x13\x0b\x28\xf6\x2f\x19\xfa\x79\x45\x53\x5b", patches: FS_200 },
    PatchSet { process: "FS", fingerprint: *b"\xe7\x66\x92\xdf\xaa\x04\x20\xe9\xfd\xd6\x8e\x43\x63\x16\x18\x18", patches: FS_200 },
    PatchSet { process: "FS", fingerprint: *b"\x0d\x70\x05\x62\x7b\x07\x76\x7c\x0b\x96\x3f\x9a\xff\xdd\xe5\x66", patches: FS_210 },
    PatchSet { process: "FS", fingerprint: *b"\xdb\xd8\x5f\xca\xcc\x19\x3d\xa8\x30\x51\xc6\x64\xe6\x45\x2d\x32", patches: FS_210 },
    PatchSet { process: "FS", fingerprint: *b"\xa8\x6d\xa5\xe8\x7e\xf1\x09\x7b\x23\xda\xb5\xb4\xdb\xba\xef\xe7", patches: FS_300 },
    PatchSet { process: "FS", fingerprint: *b"\x98\x1c\x57\xe7\xf0\x2f\x70\xf7\xbc\xde\x75\x31\x81\xd9\x01\xa6", patches: FS_300 },
    PatchSet { process: "FS", fingerprint: *b"\x57\x39\x7c\x06\x3f\x10\xb6\x31\x3f\x4d\x83\x76\x53\xcc\xc3\x71", patches: FS_301 },
    PatchSet { process: "FS", fingerprint: *b"\x07\x30\x99\xd7\xc6\xad\x7d\x89\x83\xbc\x7a\xdd\x93\x2b\xe3\xd1", patches: FS_301 },
    PatchSet { process: "FS", fingerprint: *b"\x06\xe9\x07\x19\x59\x5a\x01\x0c\x62\x46\xff\x70\x94\x6f\x10\xfb", patches: FS_401 },
    PatchSet { process: "FS", fingerprint: *b"\x54\x9b\x0f\x8d\x6f\x72\xc4\xe9\xf3\xfd\x1f\x19\xea\xce\x4a\x5a", patches: FS_401 },
    PatchSet { process: "FS", fingerprint: *b"\x80\x96\xaf\x7c\x6a\x35\xaa\x82\x71\xf3\x91\x69\x95\x41\x3b\x0b", patches: FS_410 },
    PatchSet { process: "FS", fingerprint: *b"\x02\xd5\xab\xaa\xfd\x20\xc8\xb0\x63\x3a\xa0\xdb\xae\xe0\x37\x7e", patches: FS_410 },
    PatchSet { process: "FS", fingerprint: *b"\xa6\xf2\x7a\xd9\xac\x7c\x73\xad\x41\x9b\x63\xb2\x3e\x78\x5a\x0c", patches: FS_500 },
    PatchSet { process: "FS", fingerprint: *b"\xce\x3e\xcb\xa2\xf2\xf0\x62\xf5\x75\xf8\xf3\x60\x84\x2b\x32\xb4", patches: FS_500 },
    PatchSet { process: "FS", fingerprint: *b"\x76\xf8\x74\x02\xc9\x38\x7c\x0f\x0a\x2f\xab\x1b\x45\xce\xbb\x93", patches: FS_510 },
    PatchSet { process: "FS", fingerprint: *b"\x10\xb2\xd8\x16\x05\x48\x85\x99\xdf\x22\x42\xcb\x6b\xac\x2d\xf1", patches: FS_510 },
    PatchSet { process: "FS", fingerprint: *b"\x1b\x82\xcb\x22\x18\x67\xcb\x52\xc4\x4a\x86\x9e\xa9\x1a\x1a\xdd", patches: FS_600_40 },
    PatchSet { process: "FS", fingerprint: *b"\x96\x6a\xdd\x3d\x20\xb6\x27\x13\x2c\x5a\x8d\xa4\x9a\xc9\xd8\xdd", patches: FS_600_40_EXFAT },
    PatchSet { process: "FS", fingerprint: *b"\x3a\x57\x4d\x43\x61\x86\x19\x1d\x17\x88\xeb\x2c\x0f\x07\x6b\x11", patches: FS_600_50 },
    PatchSet { process: "FS", fingerprint: *b"\x33\x05\x53\xf6\xb5\xfb\x55\xc4\xc2\xd7\xb7\x36\x24\x02\x76\xb3", patches: FS_600_50_EXFAT },
    PatchSet { process: "FS", fingerprint: *b"\x2a\xdb\xe9\x7e\x9b\x5f\x41\x77\x9e\xc9\x5f\xfe\x26\x99\xc9\x33", patches: FS_700 },
    PatchSet { process: "FS", fingerprint: *b"\x2c\xce\x65\x9c\xec\x53\x6a\x8e\x4d\x91\xf3\xbe\x4b\x74\xbe\xd3", patches: FS_700_EXFAT },
    PatchSet { process: "FS", fingerprint: *b"\xb2\xf5\x17\x6b\x35\x48\x36\x4d\x07\x9a\x29\xb1\x41\xa2\x3b\x06", patches: FS_800 },
    PatchSet { process: "FS", fingerprint: *b"\xdb\xd9\x41\xc0\xc5\x3c\x52\xcc\xf7\x20\x2c\x84\xd8\xe0\xf7\x80", patches: FS_800_EXFAT },
    PatchSet { process: "FS", fingerprint: *b"\x6b\x09\xb6\x7b\x29\xc0\x20\x24\x6d\xc3\x4f\x5a\x04\xf5\xd3\x09", patches: FS_810 },
    PatchSet { process: "FS", fingerprint: *b"\xb4\xca\xe1\xf2\x49\x65\xd9\x2e\xd2\x4e\xbe\x9e\x97\xf6\x09\xc3", patches: FS_810_EXFAT },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn fingerprints_are_unique() {
        let unique: HashSet<_> = PATCH_SETS.iter().map(|set| set.fingerprint).collect();
        assert_eq!(unique.len(), PATCH_SETS.len());
    }

    #[test]
    fn diff_lengths_are_balanced() {
        for set in PATCH_SETS {
            for patch in set.patches {
                for diff in patch.diffs {
                    assert_eq!(
                        diff.original.len(),
                        diff.replacement.len(),
                        "{} / {}",
                        set.process,
                        patch.name
                    );
                }
            }
        }
    }
}
