/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use std::collections::BTreeSet;

use log::{debug, info, warn};

use crate::crypto::Fingerprint;
use crate::error::{Error, Result};
use crate::source::FileSource;

/// Flag file whose presence keeps gamecard enforcement intact.
pub const GAMECARD_FLAG_PATH: &str = "/umbra/gc";
const GAMECARD_PATCH: &str = "nogc";

/// One byte-range rewrite. The original bytes are carried so a drifted
/// image is detected instead of blindly overwritten.
#[derive(Debug)]
pub struct Diff {
    pub offset: usize,
    pub original: &'static [u8],
    pub replacement: &'static [u8],
}

/// A named group of diffs applied as a unit.
#[derive(Debug)]
pub struct Patch {
    pub name: &'static str,
    pub diffs: &'static [Diff],
}

/// Everything known about one process build: which process it is, the
/// fingerprint identifying the exact build, and the patches for it.
#[derive(Debug)]
pub struct PatchSet {
    pub process: &'static str,
    pub fingerprint: Fingerprint,
    pub patches: &'static [Patch],
}

/// Finds the patch set for a given process build, keyed on both the
/// process name and the image fingerprint. An unknown build yields
/// nothing; the image then passes through untouched.
pub fn find_patch_set<'a>(
    table: &'a [PatchSet],
    process: &str,
    fingerprint: &Fingerprint,
) -> Option<&'a PatchSet> {
    table.iter().find(|set| set.process == process && set.fingerprint == *fingerprint)
}

/// Applies one patch to an image. Each diff is verified against the bytes
/// it expects to replace; a mismatch skips that diff, while a diff whose
/// range falls outside the image is fatal.
pub fn apply_patch(patch: &Patch, image: &mut [u8]) -> Result<()> {
    for (i, diff) in patch.diffs.iter().enumerate() {
        debug_assert_eq!(diff.original.len(), diff.replacement.len());
        let end = diff
            .offset
            .checked_add(diff.original.len())
            .filter(|&end| end <= image.len())
            .ok_or(Error::DiffOutOfRange {
                patch: patch.name.to_string(),
                ordinal: i + 1,
                offset: diff.offset as u64,
                len: diff.original.len(),
                image_len: image.len(),
            })?;

        let target = &mut image[diff.offset..end];
        if target != diff.original {
            debug!("patch '{}' diff #{} does not match, skipping", patch.name, i + 1);
            continue;
        }
        target.copy_from_slice(diff.replacement);
    }
    Ok(())
}

/// Applies every patch in the set except those the filter excludes.
pub fn apply_patch_set(set: &PatchSet, filter: &PatchFilter, image: &mut [u8]) -> Result<()> {
    for patch in set.patches {
        if filter.is_excluded(patch.name) {
            info!("skipping patch '{}' for '{}'", patch.name, set.process);
            continue;
        }
        info!("applying patch '{}' to '{}'", patch.name, set.process);
        apply_patch(patch, image)?;
    }
    Ok(())
}

/// Names of patches the user opted out of, derived from flag files on the
/// override source. All known patches apply by default.
#[derive(Debug, Default)]
pub struct PatchFilter {
    excluded: BTreeSet<&'static str>,
}

impl PatchFilter {
    pub fn from_source<F: FileSource>(files: &mut F) -> Result<Self> {
        let mut filter = Self::default();
        if files.try_read_file(GAMECARD_FLAG_PATH)?.is_some() {
            warn!("{} present, keeping gamecard enforcement", GAMECARD_FLAG_PATH);
            filter.excluded.insert(GAMECARD_PATCH);
        }
        Ok(filter)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MemorySource(HashMap<&'static str, Vec<u8>>);

    impl FileSource for MemorySource {
        fn try_read_file(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.0.get(path).cloned())
        }
    }

    static TEST_PATCH: Patch = Patch {
        name: "test",
        diffs: &[
            Diff { offset: 2, original: b"\x01\x02", replacement: b"\xAA\xBB" },
            Diff { offset: 6, original: b"\x03", replacement: b"\xCC" },
        ],
    };

    #[test]
    fn matching_diffs_are_applied() {
        let mut image = vec![0x00, 0x00, 0x01, 0x02, 0x00, 0x00, 0x03, 0x00];
        apply_patch(&TEST_PATCH, &mut image).unwrap();
        assert_eq!(image, [0x00, 0x00, 0xAA, 0xBB, 0x00, 0x00, 0xCC, 0x00]);
    }

    #[test]
    fn mismatched_diff_is_skipped_not_fatal() {
        // Second diff matches, first does not.
        let mut image = vec![0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x03, 0x00];
        apply_patch(&TEST_PATCH, &mut image).unwrap();
        assert_eq!(image, [0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0xCC, 0x00]);
    }

    #[test]
    fn out_of_range_diff_is_fatal_with_ordinal() {
        let mut image = vec![0x00; 4];
        let err = apply_patch(&TEST_PATCH, &mut image).unwrap_err();
        match err {
            Error::DiffOutOfRange { patch, ordinal, .. } => {
                assert_eq!(patch, "test");
                assert_eq!(ordinal, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn diffs_before_an_out_of_range_one_stay_applied() {
        // Application is per diff, not all-or-nothing: an abort partway
        // through leaves earlier replacements in place.
        static PARTIAL: Patch = Patch {
            name: "partial",
            diffs: &[
                Diff { offset: 0, original: b"\x01", replacement: b"\xAA" },
                Diff { offset: 100, original: b"\x02", replacement: b"\xBB" },
            ],
        };

        let mut image = vec![0x01, 0x02];
        let err = apply_patch(&PARTIAL, &mut image).unwrap_err();
        assert!(matches!(err, Error::DiffOutOfRange { ordinal: 2, .. }));
        assert_eq!(image, [0xAA, 0x02]);
    }

    #[test]
    fn find_patch_set_requires_both_name_and_fingerprint() {
        static SETS: &[PatchSet] =
            &[PatchSet { process: "FS", fingerprint: [0x11; 16], patches: &[] }];

        assert!(find_patch_set(SETS, "FS", &[0x11; 16]).is_some());
        assert!(find_patch_set(SETS, "FS", &[0x22; 16]).is_none());
        assert!(find_patch_set(SETS, "Loader", &[0x11; 16]).is_none());
    }

    #[test]
    fn gamecard_flag_excludes_the_gamecard_patch() {
        let mut empty = MemorySource(HashMap::new());
        let filter = PatchFilter::from_source(&mut empty).unwrap();
        assert!(!filter.is_excluded("nogc"));

        let mut flagged = MemorySource(HashMap::from([(GAMECARD_FLAG_PATH, Vec::new())]));
        let filter = PatchFilter::from_source(&mut flagged).unwrap();
        assert!(filter.is_excluded("nogc"));
        assert!(!filter.is_excluded("nosigchk"));
    }
}
