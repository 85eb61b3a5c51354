// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for log decoding.
//!
//! The taxonomy separates failures that make the whole log untrustworthy
//! ([`DecodeError`], returned from [`EventLog::parse`]) from anomalies
//! local to a single record ([`MalformedEventPayload`], stored on the
//! affected [`EventRecord`] while decoding continues).
//!
//! [`EventLog::parse`]: crate::EventLog::parse
//! [`EventRecord`]: crate::EventRecord

use crate::event::EventType;
use thiserror::Error;

/// Fatal decode failure. The log cannot be trusted at all, so no partial
/// record sequence is returned.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// A declared length or count exceeds the bytes remaining in the
    /// buffer. This is the dominant failure mode for truncated or
    /// hand-corrupted capture files.
    #[error(
        "event log truncated at offset {offset}: \
         {needed} bytes required, {remaining} remain"
    )]
    TruncatedLog {
        /// Read offset at which the over-long read was attempted.
        offset: usize,
        /// Number of bytes the structure declared.
        needed: usize,
        /// Number of bytes actually left in the buffer.
        remaining: usize,
    },

    /// The first record matches neither the legacy SHA-1 header shape nor
    /// the crypto-agile one.
    #[error("buffer matches neither the legacy SHA-1 nor the crypto-agile log format")]
    UnrecognizedFormat,

    /// A record digest references an algorithm id that the log's Spec ID
    /// header never declared. Without a declared digest size the record
    /// boundary is undecidable, so decoding cannot continue.
    #[error(
        "digest at offset {offset} references algorithm {algorithm:#06x}, \
         which the log header does not declare"
    )]
    UnknownAlgorithm {
        /// The undeclared TCG algorithm id.
        algorithm: u16,
        /// Read offset of the digest entry.
        offset: usize,
    },
}

/// A known event type's payload does not fit the structure that type
/// demands. Non-fatal: the record keeps its raw bytes as an opaque
/// payload, carries this error as a flag, and decoding continues. One
/// bad vendor extension must not blind the verifier to the rest of the
/// boot chain.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{event_type:?} payload malformed at payload offset {offset}: {reason}")]
pub struct MalformedEventPayload {
    /// The event type whose structure the payload failed to satisfy.
    pub event_type: EventType,
    /// Offset within the event payload where decoding failed.
    pub offset: usize,
    /// What the structure demanded at that offset.
    pub reason: &'static str,
}
