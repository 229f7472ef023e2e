//! Inbound helper that stitches message segments back into complete bodies.
//!
//! [`SegmentReassembler`] collects segment texts keyed by [`AssemblyKey`]
//! (sender plus concatenation reference), tolerates duplicate and out-of-order
//! arrival, and purges stale partial messages after a fixed timeout. The
//! helper is platform-agnostic so the pipeline and behavioural tests can
//! drive it with an explicit clock.

use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::pdu::DecodedSegment;

/// Identifies one in-flight multi-part message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssemblyKey {
    /// Originating address the segments arrived from.
    pub sender: Option<String>,
    /// Concatenation reference shared by the segments.
    pub reference: u16,
}

/// A fully reassembled logical message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompleteMessage {
    /// Originating address, when the PDU carried one.
    pub sender: Option<String>,
    /// Full message body in sequence order.
    pub text: String,
}

#[derive(Debug)]
struct PendingMessage {
    parts: BTreeMap<u8, String>,
    total: u8,
    started_at: Instant,
}

impl PendingMessage {
    fn new(total: u8, started_at: Instant) -> Self {
        Self {
            parts: BTreeMap::new(),
            total,
            started_at,
        }
    }

    /// Record a segment, keeping the first text seen for a sequence index.
    fn insert(&mut self, sequence: u8, text: String) {
        self.parts.entry(sequence).or_insert(text);
    }

    fn is_complete(&self) -> bool { self.parts.len() == usize::from(self.total) }

    /// Concatenate the collected parts in ascending sequence order.
    fn into_text(self) -> String { self.parts.into_values().collect() }
}

/// Stateful segment re-assembler with timeout-based eviction.
#[derive(Debug)]
pub struct SegmentReassembler {
    timeout: Duration,
    pending: HashMap<AssemblyKey, PendingMessage>,
}

impl SegmentReassembler {
    /// Create a re-assembler that evicts partial messages after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: HashMap::new(),
        }
    }

    /// Process a decoded segment using an explicit clock reading.
    ///
    /// Single-part segments pass straight through. Concatenated segments are
    /// buffered until every declared part has arrived; the completed body is
    /// returned with its parts joined in sequence order, not arrival order.
    /// Re-delivery of an already-buffered sequence index leaves the first
    /// copy untouched. Expired partial messages are purged opportunistically
    /// before the segment is considered.
    pub fn ingest(&mut self, segment: DecodedSegment, now: Instant) -> Option<CompleteMessage> {
        self.purge_expired_at(now);

        let Some(header) = segment.concat else {
            return Some(CompleteMessage {
                sender: segment.sender,
                text: segment.text,
            });
        };

        if header.sequence == 0 || header.sequence > header.total {
            debug!(
                reference = header.reference,
                sequence = header.sequence,
                total = header.total,
                "ignoring segment with out-of-range sequence"
            );
            return None;
        }

        let key = AssemblyKey {
            sender: segment.sender,
            reference: header.reference,
        };

        match self.pending.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().insert(header.sequence, segment.text);
                if occupied.get().is_complete() {
                    let (key, pending) = occupied.remove_entry();
                    debug!(reference = key.reference, "multi-part message complete");
                    return Some(CompleteMessage {
                        sender: key.sender,
                        text: pending.into_text(),
                    });
                }
                None
            }
            Entry::Vacant(vacant) => {
                if header.total == 1 {
                    return Some(CompleteMessage {
                        sender: vacant.into_key().sender,
                        text: segment.text,
                    });
                }
                let mut pending = PendingMessage::new(header.total, now);
                pending.insert(header.sequence, segment.text);
                vacant.insert(pending);
                None
            }
        }
    }

    /// Remove partial messages that exceeded the assembly timeout.
    ///
    /// Called opportunistically from [`ingest`](Self::ingest) and available
    /// to hosts that prefer a periodic sweep. Returns the evicted keys; the
    /// buffered partial text is discarded without emitting anything.
    pub fn purge_expired_at(&mut self, now: Instant) -> Vec<AssemblyKey> {
        let timeout = self.timeout;
        let mut evicted = Vec::new();

        self.pending.retain(|key, partial| {
            let expired = now.saturating_duration_since(partial.started_at) >= timeout;
            if expired {
                evicted.push(key.clone());
            }
            !expired
        });

        for key in &evicted {
            warn!(
                sender = key.sender.as_deref().unwrap_or("<none>"),
                reference = key.reference,
                "incomplete multi-part message timed out"
            );
        }

        evicted
    }

    /// Number of partial messages currently buffered.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending.len() }
}
