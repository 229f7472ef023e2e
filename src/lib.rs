//! Public API for the `smsgate` library.
//!
//! This crate provides the ingestion pipeline for SMS transaction alerts:
//! decoding raw telephony PDUs, reassembling multi-part messages, classifying
//! transaction notifications, suppressing duplicate deliveries, and bridging
//! classified events to an application-layer consumer.

pub mod bridge;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod message;
pub mod pdu;
pub mod pipeline;
pub mod reassembly;

pub use bridge::{DeliveryError, EventBridge, EventConsumer, PublishOutcome};
pub use classify::{ClassificationVerdict, TransactionClassifier};
pub use config::PipelineConfig;
pub use dedup::DeliveryDeduplicator;
pub use message::ClassifiedMessage;
pub use pdu::{ConcatHeader, DecodeError, DecodedSegment, FormatHint, PduDecoder, RawSegment};
pub use pipeline::SmsPipeline;
pub use reassembly::{AssemblyKey, CompleteMessage, SegmentReassembler};
