//! PDU decoding for platform-delivered SMS segments.
//!
//! The telephony stack hands the pipeline raw protocol data units, one per
//! physical segment, together with an optional encoding-format tag. This
//! module turns each PDU into a [`DecodedSegment`]: originating address,
//! decoded text, and the concatenation metadata needed to stitch multi-part
//! messages back together. Each sub-module focuses on a single concept to
//! keep the code small and easy to audit.

mod alphabet;
pub mod decoder;
pub mod error;
pub mod segment;
mod udh;

pub use decoder::PduDecoder;
pub use error::DecodeError;
pub use segment::{ConcatHeader, DecodedSegment, FormatHint, RawSegment};

#[cfg(test)]
pub(crate) mod test_helpers;
