//! End-to-end ingestion pipeline.
//!
//! [`SmsPipeline`] owns every stage and runs the full control flow for one
//! platform delivery: decode each raw PDU, reassemble multi-part messages,
//! classify the complete body, suppress duplicates, and hand surviving
//! events to the bridge. Calls complete in bounded time and are safe from
//! multiple racing delivery threads; each shared structure synchronises
//! independently, so one stalled stage cannot deadlock another.

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use tracing::{debug, warn};

use crate::{
    bridge::EventBridge,
    classify::TransactionClassifier,
    config::PipelineConfig,
    dedup::DeliveryDeduplicator,
    message::ClassifiedMessage,
    pdu::{PduDecoder, RawSegment},
    reassembly::SegmentReassembler,
};

/// The assembled ingestion pipeline.
///
/// # Examples
///
/// ```
/// use smsgate::{PipelineConfig, SmsPipeline};
///
/// let pipeline = SmsPipeline::new(PipelineConfig::default());
/// assert_eq!(pipeline.handle_batch(Vec::new()), 0);
/// ```
#[derive(Debug)]
pub struct SmsPipeline {
    decoder: PduDecoder,
    reassembler: Mutex<SegmentReassembler>,
    classifier: TransactionClassifier,
    dedup: DeliveryDeduplicator,
    bridge: EventBridge,
}

impl SmsPipeline {
    /// Build a pipeline from configuration.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            decoder: PduDecoder::new(),
            reassembler: Mutex::new(SegmentReassembler::new(config.assembly_timeout)),
            classifier: TransactionClassifier::new(config.markers),
            dedup: DeliveryDeduplicator::new(config.dedup_retention, config.dedup_bucket),
            bridge: EventBridge::new(config.queue_capacity),
        }
    }

    /// The bridge the host application attaches its consumer to.
    #[must_use]
    pub fn bridge(&self) -> &EventBridge { &self.bridge }

    /// Process one platform delivery batch.
    ///
    /// Each segment is isolated: a segment that fails to decode is logged
    /// and skipped without affecting its siblings. Returns the number of
    /// classified events that reached the bridge.
    pub fn handle_batch(&self, batch: impl IntoIterator<Item = RawSegment>) -> usize {
        let mut published = 0;

        for raw in batch {
            let segment = match self.decoder.decode(&raw) {
                Ok(segment) => segment,
                Err(error) => {
                    warn!(%error, "dropping undecodable segment");
                    continue;
                }
            };

            let now = Instant::now();
            let complete = self.lock_reassembler().ingest(segment, now);
            let Some(complete) = complete else {
                continue;
            };

            let verdict = self.classifier.classify(&complete.text);
            if !verdict.is_transaction() {
                debug!(
                    sender = complete.sender.as_deref().unwrap_or("<none>"),
                    "message is not a transaction alert"
                );
                continue;
            }

            let message = ClassifiedMessage {
                sender: complete.sender,
                text: complete.text,
                verdict,
                received_at: now,
            };
            if !self.dedup.should_emit(&message, now) {
                continue;
            }

            self.bridge.publish(message);
            published += 1;
        }

        published
    }

    /// Lock the reassembler, absorbing poisoning so one panicked delivery
    /// thread cannot wedge every later delivery.
    fn lock_reassembler(&self) -> MutexGuard<'_, SegmentReassembler> {
        self.reassembler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
