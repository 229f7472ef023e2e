//! SMS-DELIVER TPDU decoding.
//!
//! [`PduDecoder`] walks the 3GPP TS 23.040 deliver layout: service-centre
//! information, first octet, originating address, protocol identifier, data
//! coding scheme, timestamp, then user data. Platforms that supply a format
//! tag get the hint-aware path; untagged PDUs take the legacy path, which
//! assumes GSM encoding.

use super::{
    alphabet::{self, Alphabet},
    error::DecodeError,
    segment::{ConcatHeader, DecodedSegment, FormatHint, RawSegment},
    udh,
};

/// First-octet flag signalling that the user data starts with a header.
const UDHI: u8 = 0x40;
/// Longest originating address, in semi-octets.
const MAX_ADDRESS_DIGITS: usize = 22;
/// Type-of-number values carried in the type-of-address octet.
const TON_INTERNATIONAL: u8 = 1;
const TON_ALPHANUMERIC: u8 = 5;

/// Checked cursor over PDU bytes.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self { Self { buf } }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.buf.len() < len {
            return Err(DecodeError::MalformedPdu { reason: field });
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    fn octet(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(1, field)?[0])
    }

    const fn rest(&self) -> &'a [u8] { self.buf }
}

/// Decoder for raw platform PDUs.
///
/// # Examples
///
/// ```
/// use smsgate::pdu::{PduDecoder, RawSegment};
///
/// // SMS-DELIVER carrying "hellohello" from 27838890001.
/// let pdu = [
///     0x07, 0x91, 0x72, 0x83, 0x01, 0x00, 0x10, 0xF5, 0x04, 0x0B, 0xC8, 0x72, 0x38, 0x88,
///     0x09, 0x00, 0xF1, 0x00, 0x00, 0x99, 0x30, 0x92, 0x51, 0x61, 0x95, 0x80, 0x0A, 0xE8,
///     0x32, 0x9B, 0xFD, 0x46, 0x97, 0xD9, 0xEC, 0x37,
/// ];
/// let segment = PduDecoder::new()
///     .decode(&RawSegment::new(pdu.to_vec(), None))
///     .expect("well-formed deliver PDU");
/// assert_eq!(segment.text, "hellohello");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PduDecoder;

impl PduDecoder {
    /// Create a decoder.
    #[must_use]
    pub const fn new() -> Self { Self }

    /// Decode one raw segment into sender, text, and concatenation metadata.
    ///
    /// Segments carrying a format hint use the hint-aware path; segments
    /// without one fall back to the legacy GSM path, matching platform
    /// builds that predate tagged delivery.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnsupportedFormat`] for CDMA-tagged segments,
    /// [`DecodeError::UnsupportedAlphabet`] for data coding schemes outside
    /// GSM 7-bit and UCS-2, and [`DecodeError::MalformedPdu`] for truncated
    /// or inconsistent byte structures.
    pub fn decode(&self, raw: &RawSegment) -> Result<DecodedSegment, DecodeError> {
        match raw.format {
            Some(hint) => Self::decode_with_hint(hint, &raw.pdu),
            None => Self::decode_legacy(&raw.pdu),
        }
    }

    fn decode_with_hint(hint: FormatHint, pdu: &[u8]) -> Result<DecodedSegment, DecodeError> {
        match hint {
            FormatHint::Gsm => Self::decode_gsm(pdu),
            FormatHint::Cdma => Err(DecodeError::UnsupportedFormat { hint }),
        }
    }

    fn decode_legacy(pdu: &[u8]) -> Result<DecodedSegment, DecodeError> { Self::decode_gsm(pdu) }

    fn decode_gsm(pdu: &[u8]) -> Result<DecodedSegment, DecodeError> {
        let mut reader = Reader::new(pdu);

        let smsc_len = usize::from(reader.octet("service centre length")?);
        reader.take(smsc_len, "service centre information")?;

        let first_octet = reader.octet("first octet")?;
        let has_udh = first_octet & UDHI != 0;

        let sender = decode_address(&mut reader)?;

        let _pid = reader.octet("protocol identifier")?;
        let dcs = reader.octet("data coding scheme")?;
        reader.take(7, "service centre timestamp")?;

        let udl = usize::from(reader.octet("user data length")?);
        let user_data = reader.rest();

        let (concat, text) = decode_user_data(has_udh, dcs, udl, user_data)?;
        Ok(DecodedSegment {
            sender,
            text,
            concat,
        })
    }
}

fn decode_address(reader: &mut Reader<'_>) -> Result<Option<String>, DecodeError> {
    let digits = usize::from(reader.octet("address length")?);
    if digits > MAX_ADDRESS_DIGITS {
        return Err(DecodeError::malformed("originating address too long"));
    }
    let toa = reader.octet("type of address")?;
    let bytes = reader.take(digits.div_ceil(2), "originating address")?;
    if digits == 0 {
        return Ok(None);
    }

    let ton = (toa >> 4) & 0x07;
    if ton == TON_ALPHANUMERIC {
        let septets = alphabet::unpack_septets(bytes, digits * 4 / 7);
        return Ok(Some(alphabet::septets_to_string(&septets)));
    }

    let mut address = String::with_capacity(digits + 1);
    if ton == TON_INTERNATIONAL {
        address.push('+');
    }
    for nibble in semi_octets(bytes).take(digits) {
        match nibble {
            0x0..=0x9 => address.push(char::from(b'0' + nibble)),
            0xA => address.push('*'),
            0xB => address.push('#'),
            0xC => address.push('a'),
            0xD => address.push('b'),
            0xE => address.push('c'),
            _ => break, // 0xF filler
        }
    }
    Ok(Some(address))
}

/// Iterate BCD semi-octets in transmission order (low nibble first).
fn semi_octets(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    bytes.iter().flat_map(|&byte| [byte & 0x0F, byte >> 4])
}

fn decode_user_data(
    has_udh: bool,
    dcs: u8,
    udl: usize,
    user_data: &[u8],
) -> Result<(Option<ConcatHeader>, String), DecodeError> {
    let encoding = alphabet::from_dcs(dcs)?;

    let (concat, header_octets) = if has_udh {
        let Some((&udhl, elements)) = user_data.split_first() else {
            return Err(DecodeError::malformed("missing user data header"));
        };
        let udhl = usize::from(udhl);
        if elements.len() < udhl {
            return Err(DecodeError::malformed("user data header overruns payload"));
        }
        (udh::concat_header(&elements[..udhl])?, udhl + 1)
    } else {
        (None, 0)
    };

    let text = match encoding {
        Alphabet::Gsm7 => {
            // The UDH is padded to a septet boundary, so the header occupies
            // a whole number of septets out of the declared user data length.
            let header_septets = (header_octets * 8).div_ceil(7);
            if udl < header_septets || udl > alphabet::septet_capacity(user_data.len()) {
                return Err(DecodeError::malformed("user data length inconsistent"));
            }
            let septets = alphabet::unpack_septets(user_data, udl);
            alphabet::septets_to_string(&septets[header_septets..])
        }
        Alphabet::Ucs2 => {
            if udl < header_octets || udl > user_data.len() {
                return Err(DecodeError::malformed("user data length inconsistent"));
            }
            alphabet::decode_ucs2(&user_data[header_octets..udl])?
        }
    };

    Ok((concat, text))
}
