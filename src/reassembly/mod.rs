//! Multi-part message reassembly.
//!
//! The platform delivers each segment of a concatenated SMS as its own PDU,
//! with no ordering or completeness guarantee. [`SegmentReassembler`] buffers
//! decoded segments keyed by sender and concatenation reference, releases the
//! full body once every declared segment has arrived, and purges partial
//! messages that outlive the assembly timeout so lost segments cannot leak
//! memory.

pub mod reassembler;

pub use reassembler::{AssemblyKey, CompleteMessage, SegmentReassembler};
