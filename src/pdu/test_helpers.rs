//! Shared test helper for constructing SMS-DELIVER PDUs.
//!
//! The builder produces the same byte layout the decoder consumes so tests
//! can exercise arbitrary sender, alphabet, and concatenation combinations
//! without hand-assembling bit-packed user data.

use super::alphabet;

#[derive(Clone, Copy)]
struct ConcatParams {
    reference: u16,
    sequence: u8,
    total: u8,
}

/// Builder for a GSM SMS-DELIVER PDU.
pub(crate) struct DeliverPdu {
    sender: Option<String>,
    text: String,
    concat: Option<ConcatParams>,
    wide_reference: bool,
    ucs2: bool,
}

impl DeliverPdu {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self {
            sender: Some("+919876543210".to_owned()),
            text: text.into(),
            concat: None,
            wide_reference: false,
            ucs2: false,
        }
    }

    pub(crate) fn sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.to_owned());
        self
    }

    pub(crate) fn no_sender(mut self) -> Self {
        self.sender = None;
        self
    }

    pub(crate) fn concat(mut self, reference: u16, sequence: u8, total: u8) -> Self {
        self.concat = Some(ConcatParams {
            reference,
            sequence,
            total,
        });
        self
    }

    pub(crate) fn wide_reference(mut self) -> Self {
        self.wide_reference = true;
        self
    }

    pub(crate) fn ucs2(mut self) -> Self {
        self.ucs2 = true;
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut pdu = vec![0x00]; // no service centre information

        let header = self.header_bytes();
        let mut first_octet = 0x04; // SMS-DELIVER, no more messages
        if !header.is_empty() {
            first_octet |= 0x40;
        }
        pdu.push(first_octet);

        match &self.sender {
            Some(sender) => push_address(&mut pdu, sender),
            None => {
                pdu.push(0x00);
                pdu.push(0x81);
            }
        }

        pdu.push(0x00); // protocol identifier
        pdu.push(if self.ucs2 { 0x08 } else { 0x00 });
        pdu.extend_from_slice(&[0; 7]); // service centre timestamp

        if self.ucs2 {
            let mut user_data = header;
            for unit in self.text.encode_utf16() {
                user_data.extend_from_slice(&unit.to_be_bytes());
            }
            pdu.push(u8::try_from(user_data.len()).expect("user data fits in one octet"));
            pdu.extend_from_slice(&user_data);
        } else {
            let septets: Vec<u8> = self
                .text
                .chars()
                .map(|ch| alphabet::septet_for(ch).expect("text restricted to the basic alphabet"))
                .collect();
            let (user_data, udl) = pack_user_data(&header, &septets);
            pdu.push(udl);
            pdu.extend_from_slice(&user_data);
        }

        pdu
    }

    /// UDH bytes including the length octet, or empty when not concatenated.
    fn header_bytes(&self) -> Vec<u8> {
        let Some(params) = self.concat else {
            return Vec::new();
        };
        if self.wide_reference {
            let [hi, lo] = params.reference.to_be_bytes();
            vec![0x06, 0x08, 0x04, hi, lo, params.total, params.sequence]
        } else {
            let reference = u8::try_from(params.reference).expect("8-bit reference");
            vec![0x05, 0x00, 0x03, reference, params.total, params.sequence]
        }
    }
}

fn push_address(pdu: &mut Vec<u8>, sender: &str) {
    let (toa, digits) = match sender.strip_prefix('+') {
        Some(rest) => (0x91, rest),
        None => (0x81, sender),
    };
    pdu.push(u8::try_from(digits.len()).expect("address fits in one octet"));
    pdu.push(toa);
    let nibbles: Vec<u8> = digits
        .bytes()
        .map(|digit| {
            assert!(digit.is_ascii_digit(), "sender restricted to digits");
            digit - b'0'
        })
        .collect();
    for pair in nibbles.chunks(2) {
        let hi = pair.get(1).copied().unwrap_or(0x0F);
        pdu.push((hi << 4) | pair[0]);
    }
}

/// Pack a UDH and text septets into user data octets, returning the declared
/// user data length in septets.
fn pack_user_data(header: &[u8], septets: &[u8]) -> (Vec<u8>, u8) {
    let mut writer = BitWriter::default();
    for &byte in header {
        writer.push(u32::from(byte), 8);
    }
    let header_bits = header.len() * 8;
    let fill = (7 - header_bits % 7) % 7;
    writer.push(0, u32::try_from(fill).expect("fill below 7"));
    for &septet in septets {
        writer.push(u32::from(septet), 7);
    }
    let udl = header_bits.div_ceil(7) + septets.len();
    (
        writer.finish(),
        u8::try_from(udl).expect("user data fits in one octet"),
    )
}

#[derive(Default)]
struct BitWriter {
    acc: u32,
    bits: u32,
    out: Vec<u8>,
}

impl BitWriter {
    fn push(&mut self, value: u32, bits: u32) {
        self.acc |= value << self.bits;
        self.bits += bits;
        while self.bits >= 8 {
            self.out.push((self.acc & 0xFF) as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push((self.acc & 0xFF) as u8);
        }
        self.out
    }
}

/// Build a minimal alphanumeric-sender PDU around the given GSM 7-bit text.
pub(crate) fn alphanumeric_sender_pdu(sender_septets: &[u8], text: &str) -> Vec<u8> {
    let mut pdu = vec![0x00, 0x04];
    let (packed, _) = pack_user_data(&[], sender_septets);
    // Address length counts the semi-octets occupied by the packed name.
    let digits = (sender_septets.len() * 7).div_ceil(4);
    pdu.push(u8::try_from(digits).expect("address fits in one octet"));
    pdu.push(0xD0);
    pdu.extend_from_slice(&packed);
    pdu.push(0x00);
    pdu.push(0x00);
    pdu.extend_from_slice(&[0; 7]);
    let septets: Vec<u8> = text
        .chars()
        .map(|ch| alphabet::septet_for(ch).expect("text restricted to the basic alphabet"))
        .collect();
    let (user_data, udl) = pack_user_data(&[], &septets);
    pdu.push(udl);
    pdu.extend_from_slice(&user_data);
    pdu
}
