//! End-to-end tests driving the pipeline with hand-built deliver PDUs.

use std::{
    sync::{Arc, Mutex},
    thread,
};

use smsgate::{
    ClassifiedMessage, DeliveryError, EventConsumer, PipelineConfig, RawSegment, SmsPipeline,
};

/// Build a minimal GSM SMS-DELIVER PDU around ASCII text.
///
/// Restricted to characters whose GSM 7-bit septet value coincides with
/// their ASCII value, which covers the transaction-alert fixtures used here.
fn deliver_pdu(sender: &str, text: &str, concat: Option<(u8, u8, u8)>) -> Vec<u8> {
    let mut pdu = vec![0x00]; // no service centre information
    pdu.push(if concat.is_some() { 0x44 } else { 0x04 });

    let digits = sender.strip_prefix('+').expect("international sender");
    pdu.push(u8::try_from(digits.len()).expect("short address"));
    pdu.push(0x91);
    let nibbles: Vec<u8> = digits.bytes().map(|digit| digit - b'0').collect();
    for pair in nibbles.chunks(2) {
        let hi = pair.get(1).copied().unwrap_or(0x0F);
        pdu.push((hi << 4) | pair[0]);
    }

    pdu.push(0x00); // protocol identifier
    pdu.push(0x00); // GSM 7-bit default alphabet
    pdu.extend_from_slice(&[0; 7]); // service centre timestamp

    let header: Vec<u8> = match concat {
        Some((reference, sequence, total)) => vec![0x05, 0x00, 0x03, reference, total, sequence],
        None => Vec::new(),
    };
    let septets: Vec<u8> = text
        .bytes()
        .map(|byte| {
            assert!(
                matches!(byte, b' '..=b'?' | b'A'..=b'Z' | b'a'..=b'z'),
                "text restricted to the ASCII-coincident GSM subset"
            );
            byte
        })
        .collect();

    fn push_bits(value: u32, count: u32, out: &mut Vec<u8>, acc: &mut u32, bits: &mut u32) {
        *acc |= value << *bits;
        *bits += count;
        while *bits >= 8 {
            out.push((*acc & 0xFF) as u8);
            *acc >>= 8;
            *bits -= 8;
        }
    }

    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut user_data = Vec::new();
    for &byte in &header {
        push_bits(u32::from(byte), 8, &mut user_data, &mut acc, &mut bits);
    }
    let header_bits = header.len() * 8;
    let fill = (7 - header_bits % 7) % 7;
    push_bits(0, u32::try_from(fill).expect("fill below 7"), &mut user_data, &mut acc, &mut bits);
    for &septet in &septets {
        push_bits(u32::from(septet), 7, &mut user_data, &mut acc, &mut bits);
    }
    if bits > 0 {
        user_data.push((acc & 0xFF) as u8);
    }

    let udl = header_bits.div_ceil(7) + septets.len();
    pdu.push(u8::try_from(udl).expect("short user data"));
    pdu.extend_from_slice(&user_data);
    pdu
}

fn segment(sender: &str, text: &str, concat: Option<(u8, u8, u8)>) -> RawSegment {
    RawSegment::new(deliver_pdu(sender, text, concat), None)
}

#[derive(Clone, Default)]
struct RecordingConsumer {
    seen: Arc<Mutex<Vec<(Option<String>, String)>>>,
}

impl RecordingConsumer {
    fn events(&self) -> Vec<(Option<String>, String)> {
        self.seen.lock().expect("test mutex").clone()
    }
}

impl EventConsumer for RecordingConsumer {
    fn deliver(&self, event: &ClassifiedMessage) -> Result<(), DeliveryError> {
        self.seen
            .lock()
            .expect("test mutex")
            .push((event.sender.clone(), event.text.clone()));
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn transaction_alert_reaches_the_consumer() {
    init_tracing();
    let pipeline = SmsPipeline::new(PipelineConfig::default());
    let consumer = RecordingConsumer::default();
    pipeline.bridge().attach(consumer.clone());

    let published =
        pipeline.handle_batch([segment("+919876543210", "Rs.500 debited from AB1234", None)]);

    assert_eq!(published, 1);
    assert_eq!(
        consumer.events(),
        [(
            Some("+919876543210".to_owned()),
            "Rs.500 debited from AB1234".to_owned()
        )]
    );
}

#[test]
fn marker_split_across_segments_still_classifies() {
    init_tracing();
    let pipeline = SmsPipeline::new(PipelineConfig::default());
    let consumer = RecordingConsumer::default();
    pipeline.bridge().attach(consumer.clone());

    // "debited" only exists once the two segments are joined; the second
    // part arrives first.
    let published = pipeline.handle_batch([
        segment("+919876543210", "ted by 500 on date", Some((0x21, 2, 2))),
        segment("+919876543210", "Dear user your account debi", Some((0x21, 1, 2))),
    ]);

    assert_eq!(published, 1);
    assert_eq!(
        consumer.events()[0].1,
        "Dear user your account debited by 500 on date"
    );
}

#[test]
fn malformed_sibling_does_not_affect_the_batch() {
    init_tracing();
    let pipeline = SmsPipeline::new(PipelineConfig::default());
    let consumer = RecordingConsumer::default();
    pipeline.bridge().attach(consumer.clone());

    let published = pipeline.handle_batch([
        RawSegment::new(vec![0x07, 0x91], None),
        segment("+919876543210", "UPI payment of Rs.42 received", None),
    ]);

    assert_eq!(published, 1);
    assert_eq!(consumer.events().len(), 1);
}

#[test]
fn ordinary_chatter_is_not_published() {
    init_tracing();
    let pipeline = SmsPipeline::new(PipelineConfig::default());

    let published = pipeline.handle_batch([segment("+919876543210", "Hello how are you?", None)]);

    assert_eq!(published, 0);
    assert_eq!(pipeline.bridge().queued_len(), 0);
}

#[test]
fn events_buffer_until_a_consumer_attaches() {
    init_tracing();
    let pipeline = SmsPipeline::new(PipelineConfig::default());

    pipeline.handle_batch([segment("+919876543210", "Rs.1 debited first", None)]);
    pipeline.handle_batch([segment("+919876543210", "Rs.2 debited second", None)]);
    assert_eq!(pipeline.bridge().queued_len(), 2);

    let consumer = RecordingConsumer::default();
    pipeline.bridge().attach(consumer.clone());

    let texts: Vec<String> = consumer.events().into_iter().map(|(_, text)| text).collect();
    assert_eq!(texts, ["Rs.1 debited first", "Rs.2 debited second"]);
    assert_eq!(pipeline.bridge().queued_len(), 0);
}

#[test]
fn racing_duplicate_deliveries_emit_once() {
    init_tracing();
    let pipeline = Arc::new(SmsPipeline::new(PipelineConfig::default()));
    let consumer = RecordingConsumer::default();
    pipeline.bridge().attach(consumer.clone());

    // Two listeners registered for the same broadcast hand the pipeline the
    // same physical message concurrently.
    let batch = || vec![segment("+919876543210", "Rs.75 debited from AB9", None)];
    let total: usize = thread::scope(|scope| {
        let first = scope.spawn({
            let pipeline = Arc::clone(&pipeline);
            move || pipeline.handle_batch(batch())
        });
        let second = scope.spawn({
            let pipeline = Arc::clone(&pipeline);
            move || pipeline.handle_batch(batch())
        });
        first.join().expect("first listener") + second.join().expect("second listener")
    });

    assert_eq!(total, 1);
    assert_eq!(consumer.events().len(), 1);
}
