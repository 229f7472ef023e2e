//! The classified message record exchanged between pipeline stages.

use std::time::Instant;

use crate::classify::ClassificationVerdict;

/// A reassembled message together with its classification.
///
/// Immutable once produced; the deduplicator fingerprints it and the bridge
/// hands it to the attached consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedMessage {
    /// Originating address, when the PDU carried one.
    pub sender: Option<String>,
    /// Full reassembled message body.
    pub text: String,
    /// Marker-match verdict for the body.
    pub verdict: ClassificationVerdict,
    /// When the completing segment arrived.
    pub received_at: Instant,
}
