//! User Data Header parsing.
//!
//! The UDH is a sequence of `(IEI, length, data)` information elements at the
//! front of the user data. Only the two concatenation elements are
//! interpreted; every other element is skipped.

use tracing::trace;

use super::{error::DecodeError, segment::ConcatHeader};

const IEI_CONCAT_8BIT: u8 = 0x00;
const IEI_CONCAT_16BIT: u8 = 0x08;

/// Extract the concatenation element from UDH information-element bytes.
///
/// `elements` excludes the leading UDH-length octet. Returns `Ok(None)` when
/// no concatenation element is present (the segment is single-part).
///
/// # Errors
///
/// Returns [`DecodeError::MalformedPdu`] when an element overruns the header
/// or a concatenation element carries an out-of-range sequence or total.
pub(crate) fn concat_header(elements: &[u8]) -> Result<Option<ConcatHeader>, DecodeError> {
    let mut rest = elements;

    while let [iei, len, tail @ ..] = rest {
        let len = usize::from(*len);
        if tail.len() < len {
            return Err(DecodeError::malformed("information element overruns header"));
        }
        let (data, remainder) = tail.split_at(len);
        rest = remainder;

        let header = match (*iei, data) {
            (IEI_CONCAT_8BIT, [reference, total, sequence]) => ConcatHeader {
                reference: u16::from(*reference),
                sequence: *sequence,
                total: *total,
            },
            (IEI_CONCAT_16BIT, [hi, lo, total, sequence]) => ConcatHeader {
                reference: u16::from_be_bytes([*hi, *lo]),
                sequence: *sequence,
                total: *total,
            },
            (IEI_CONCAT_8BIT | IEI_CONCAT_16BIT, _) => {
                return Err(DecodeError::malformed("concatenation element has bad length"));
            }
            _ => {
                trace!(iei, "skipping unrecognised information element");
                continue;
            }
        };

        if header.total == 0 || header.sequence == 0 || header.sequence > header.total {
            return Err(DecodeError::malformed("concatenation element out of range"));
        }
        return Ok(Some(header));
    }

    if rest.is_empty() {
        Ok(None)
    } else {
        Err(DecodeError::malformed("truncated information element"))
    }
}
