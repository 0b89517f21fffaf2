/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2026 Shomy
*/
use thiserror::Error;

use crate::package::FirmwareVersion;
use crate::package::overrides::OverrideRole;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The container, directory or an image record does not decode.
    /// Always fatal: a corrupt container must never reach execution.
    #[error("Format error: {0}")]
    Format(String),
    /// A diff reaches past the end of its target image. This is a format
    /// error in the patch table or the image, never a skippable mismatch.
    #[error(
        "patch `{patch}`: diff #{ordinal} out of range \
         ({offset:#x} + {len:#x} exceeds image of {image_len:#x})"
    )]
    DiffOutOfRange { patch: String, ordinal: usize, offset: u64, len: usize, image_len: usize },
    /// The bundled copy of this component is not trusted on this firmware
    /// and no override was supplied.
    #[error("{role} override is required on firmware {version} but none was found")]
    MissingOverride { role: OverrideRole, version: FirmwareVersion },
    /// Storage or filesystem collaborator failure, propagated unchanged.
    #[error("Source error: {0}")]
    Source(String),
    /// Unusable keyslot or cipher failure.
    #[error("Cipher error: {0}")]
    Cipher(String),
}

impl Error {
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    pub fn source<S: Into<String>>(msg: S) -> Self {
        Error::Source(msg.into())
    }

    pub fn cipher<S: Into<String>>(msg: S) -> Self {
        Error::Cipher(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::source(value.to_string())
    }
}
