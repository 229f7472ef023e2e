//! Segment types exchanged between the platform boundary and the decoder.

use derive_more::Display;

/// Encoding-format tag attached to a raw PDU by newer platform versions.
///
/// Older platform builds deliver PDUs without a tag; the decoder then falls
/// back to its legacy path, which assumes GSM 03.40.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum FormatHint {
    /// GSM (3GPP TS 23.040) PDU encoding.
    #[display("3gpp")]
    Gsm,
    /// CDMA (3GPP2 C.S0015) PDU encoding.
    #[display("3gpp2")]
    Cdma,
}

impl FormatHint {
    /// Parse the platform's format tag string.
    ///
    /// Returns `None` for unrecognised tags so callers can fall back to the
    /// legacy decode path rather than rejecting the segment outright.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "3gpp" => Some(Self::Gsm),
            "3gpp2" => Some(Self::Cdma),
            _ => None,
        }
    }
}

/// One raw protocol data unit as delivered by the platform broadcast.
///
/// Produced once per physical segment; the sender address and concatenation
/// metadata are carried inside the PDU bytes and surface only after decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSegment {
    /// Raw PDU bytes.
    pub pdu: Vec<u8>,
    /// Optional encoding-format hint supplied alongside the PDU.
    pub format: Option<FormatHint>,
}

impl RawSegment {
    /// Wrap PDU bytes with an optional format hint.
    #[must_use]
    pub fn new(pdu: Vec<u8>, format: Option<FormatHint>) -> Self { Self { pdu, format } }
}

/// Concatenation metadata extracted from a PDU's User Data Header.
///
/// The reference id is 8 or 16 bits on the wire and widened to `u16` here.
/// Sequence indices are 1-based, as transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConcatHeader {
    /// Reference shared by all segments of one logical message.
    pub reference: u16,
    /// 1-based position of this segment within the message.
    pub sequence: u8,
    /// Declared number of segments in the message.
    pub total: u8,
}

/// Fully decoded segment ready for reassembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSegment {
    /// Originating address, when the PDU carries one.
    pub sender: Option<String>,
    /// Decoded segment text.
    pub text: String,
    /// Concatenation metadata; `None` means the message is single-part.
    pub concat: Option<ConcatHeader>,
}
