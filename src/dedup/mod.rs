//! Duplicate-delivery suppression.
//!
//! The platform can hand the same physical message to more than one
//! registered listener, and occasionally redelivers a broadcast outright.
//! [`DeliveryDeduplicator`] recognises repeats by fingerprinting the sender,
//! the normalized body, and a coarse arrival-time bucket; the bucket absorbs
//! the small clock skew between two deliveries of the same message. Entries
//! expire after a retention window so the recent-set stays bounded.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::message::ClassifiedMessage;

/// Bounded recent-set of delivered message fingerprints.
///
/// Safe to share across racing delivery threads without an external lock;
/// the backing map serialises each shard internally.
#[derive(Debug)]
pub struct DeliveryDeduplicator {
    retention: Duration,
    bucket_width: Duration,
    epoch: Instant,
    seen: DashMap<u64, Instant>,
}

impl DeliveryDeduplicator {
    /// Create a deduplicator with the given retention window and time-bucket
    /// width.
    #[must_use]
    pub fn new(retention: Duration, bucket_width: Duration) -> Self {
        Self {
            retention,
            bucket_width,
            epoch: Instant::now(),
            seen: DashMap::new(),
        }
    }

    /// Decide whether a classified message should be emitted.
    ///
    /// Returns `false` without side effects when the message's fingerprint
    /// was already recorded within the retention window; otherwise records
    /// the fingerprint and returns `true`. The current and immediately
    /// preceding time bucket are both consulted so two deliveries that
    /// straddle a bucket boundary still count as one message. Expired
    /// entries are pruned on every call.
    pub fn should_emit(&self, message: &ClassifiedMessage, now: Instant) -> bool {
        self.prune(now);

        let bucket = self.bucket_index(now);
        let previous = bucket
            .checked_sub(1)
            .map(|earlier| fingerprint(message, earlier));
        if previous.is_some_and(|key| self.seen.contains_key(&key)) {
            debug!("suppressing duplicate delivery from previous bucket");
            return false;
        }

        // The entry keeps check-and-insert atomic across racing deliveries.
        match self.seen.entry(fingerprint(message, bucket)) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                debug!("suppressing duplicate delivery");
                false
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
        }
    }

    /// Number of fingerprints currently retained.
    #[must_use]
    pub fn tracked_len(&self) -> usize { self.seen.len() }

    fn prune(&self, now: Instant) {
        let retention = self.retention;
        self.seen
            .retain(|_, first_seen| now.saturating_duration_since(*first_seen) < retention);
    }

    fn bucket_index(&self, now: Instant) -> u64 {
        let width = self.bucket_width.as_millis().max(1);
        let elapsed = now.saturating_duration_since(self.epoch).as_millis();
        u64::try_from(elapsed / width).unwrap_or(u64::MAX)
    }
}

/// Stable 64-bit fingerprint of (sender, normalized text, time bucket).
fn fingerprint(message: &ClassifiedMessage, bucket: u64) -> u64 {
    let mut hasher = blake3::Hasher::new();
    if let Some(sender) = &message.sender {
        hasher.update(sender.as_bytes());
    }
    hasher.update(&[0x00]);
    hasher.update(normalize(&message.text).as_bytes());
    hasher.update(&bucket.to_le_bytes());

    let digest = hasher.finalize();
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

/// Collapse whitespace runs so re-encoded deliveries fingerprint identically.
fn normalize(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }
