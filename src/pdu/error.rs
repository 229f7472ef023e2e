//! Error types emitted by the PDU decoding layer.
//!
//! A decode failure only ever affects the one segment that produced it; the
//! pipeline logs the error and keeps processing the rest of the batch.

use thiserror::Error;

use super::FormatHint;

/// Errors produced while decoding a raw PDU.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte structure is truncated or internally inconsistent.
    #[error("malformed PDU: {reason}")]
    MalformedPdu { reason: &'static str },
    /// The format hint names an encoding this decoder cannot handle.
    #[error("unsupported PDU format {hint}")]
    UnsupportedFormat { hint: FormatHint },
    /// The data coding scheme selects an alphabet this decoder cannot handle.
    #[error("unsupported data coding scheme {dcs:#04x}")]
    UnsupportedAlphabet { dcs: u8 },
}

impl DecodeError {
    pub(crate) const fn malformed(reason: &'static str) -> Self { Self::MalformedPdu { reason } }
}
