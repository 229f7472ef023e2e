//! Character-set handling for GSM 03.38 user data.
//!
//! Covers the 7-bit default alphabet (with the common extension-table
//! escapes) and UCS-2. Septet packing places the first septet in the least
//! significant bits of the first octet, so unpacking walks the byte stream
//! with a rolling carry.

use super::error::DecodeError;

/// Alphabet selected by a PDU's data coding scheme octet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Alphabet {
    Gsm7,
    Ucs2,
}

/// Resolve the alphabet from the data coding scheme.
///
/// Only the general-data-coding alphabet bits are interpreted; 8-bit data and
/// reserved values are rejected so binary payloads never masquerade as text.
pub(crate) fn from_dcs(dcs: u8) -> Result<Alphabet, DecodeError> {
    match dcs & 0x0C {
        0x00 => Ok(Alphabet::Gsm7),
        0x08 => Ok(Alphabet::Ucs2),
        _ => Err(DecodeError::UnsupportedAlphabet { dcs }),
    }
}

const ESCAPE: u8 = 0x1B;

/// GSM 03.38 default alphabet, indexed by septet value.
const BASIC: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1b}', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// Extension table reached through the escape septet.
fn extension(septet: u8) -> Option<char> {
    match septet {
        0x0A => Some('\u{0C}'),
        0x14 => Some('^'),
        0x28 => Some('{'),
        0x29 => Some('}'),
        0x2F => Some('\\'),
        0x3C => Some('['),
        0x3D => Some('~'),
        0x3E => Some(']'),
        0x40 => Some('|'),
        0x65 => Some('€'),
        _ => None,
    }
}

/// Number of septets that fit in `octets` bytes.
pub(crate) const fn septet_capacity(octets: usize) -> usize { octets * 8 / 7 }

/// Unpack the first `count` septets from a packed byte stream.
///
/// Callers must ensure `count <= septet_capacity(bytes.len())`; the unpacker
/// stops once `count` septets have been produced, discarding fill bits.
pub(crate) fn unpack_septets(bytes: &[u8], count: usize) -> Vec<u8> {
    let mut septets = Vec::with_capacity(count);
    let mut carry = 0_u16;
    let mut shift = 0_u16;

    for &byte in bytes {
        if septets.len() == count {
            break;
        }
        let septet = ((u16::from(byte) << shift) | carry) & 0x7F;
        septets.push(septet as u8);
        carry = u16::from(byte) >> (7 - shift);
        shift += 1;
        if shift == 7 {
            if septets.len() < count {
                septets.push((carry & 0x7F) as u8);
            }
            carry = 0;
            shift = 0;
        }
    }

    septets
}

/// Translate septet values into text, resolving escape sequences.
///
/// An unknown escape falls back to the basic-table character for the second
/// septet; a trailing escape is dropped.
pub(crate) fn septets_to_string(septets: &[u8]) -> String {
    let mut text = String::with_capacity(septets.len());
    let mut iter = septets.iter().copied();

    while let Some(septet) = iter.next() {
        if septet == ESCAPE {
            if let Some(next) = iter.next() {
                text.push(extension(next).unwrap_or(BASIC[usize::from(next & 0x7F)]));
            }
        } else {
            text.push(BASIC[usize::from(septet & 0x7F)]);
        }
    }

    text
}

/// Decode big-endian UCS-2 user data.
pub(crate) fn decode_ucs2(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::malformed("UCS-2 user data has odd length"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| DecodeError::malformed("invalid UCS-2 user data"))
}

/// Look up a character's septet value in the basic table.
#[cfg(test)]
pub(crate) fn septet_for(ch: char) -> Option<u8> {
    BASIC
        .iter()
        .position(|&candidate| candidate == ch)
        .and_then(|index| u8::try_from(index).ok())
}
