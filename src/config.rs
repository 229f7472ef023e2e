//! Runtime configuration for the ingestion pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_MARKERS;

/// How long a partial multi-part message may wait for its missing segments.
pub const DEFAULT_ASSEMBLY_TIMEOUT: Duration = Duration::from_secs(300);
/// How long a delivered fingerprint suppresses repeats.
pub const DEFAULT_DEDUP_RETENTION: Duration = Duration::from_secs(120);
/// Width of the dedup arrival-time bucket.
pub const DEFAULT_DEDUP_BUCKET: Duration = Duration::from_secs(2);
/// Undelivered events kept while no consumer is attached.
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// Tuning knobs for [`SmsPipeline`](crate::pipeline::SmsPipeline).
///
/// Deployments load this from their own configuration source; every field
/// has a default so partial documents deserialize cleanly.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Case-sensitive substring markers identifying transaction alerts.
    pub markers: Vec<String>,
    /// Eviction timeout for incomplete multi-part messages.
    pub assembly_timeout: Duration,
    /// Retention window for duplicate suppression.
    pub dedup_retention: Duration,
    /// Arrival-time bucket width used in the dedup fingerprint.
    pub dedup_bucket: Duration,
    /// Capacity of the bridge's undelivered-event queue.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.map(str::to_owned).to_vec(),
            assembly_timeout: DEFAULT_ASSEMBLY_TIMEOUT,
            dedup_retention: DEFAULT_DEDUP_RETENTION,
            dedup_bucket: DEFAULT_DEDUP_BUCKET,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
