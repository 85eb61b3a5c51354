// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoder and PCR replay engine for TCG TPM event logs.
//!
//! Measured boot firmware extends a digest of every component it loads
//! into the TPM's Platform Configuration Registers and appends a matching
//! record to an event log. A verifier checks the log by replaying it:
//! recompute each PCR from the logged digests and compare against quoted
//! values. Match means the log is a faithful transcript of the boot.
//!
//! This crate decodes both on-disk log encodings and replays them:
//!
//! - the legacy TCG 1.2 format, one SHA-1 digest per record;
//! - the crypto-agile TCG 2.0 format, whose `Spec ID Event03` header
//!   declares the active algorithms and whose records carry one digest
//!   per algorithm.
//!
//! The format is detected from the log bytes themselves; callers never
//! state it. Decoded records borrow the input buffer.
//!
//! # Example
//!
//! ```no_run
//! use tcg_eventlog::{AlgorithmId, EventLog, PcrIndex};
//!
//! fn check(bytes: &[u8]) -> Result<(), tcg_eventlog::DecodeError> {
//!     let log = EventLog::parse(bytes)?;
//!     let pcrs = tcg_eventlog::replay(&log);
//!     if let Some(value) = pcrs.hex_value(PcrIndex(0), AlgorithmId::SHA256) {
//!         println!("PCR 0: {value}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Structural failures that leave record boundaries undecidable are
//! fatal ([`DecodeError`]); anomalies local to one record are flagged on
//! that record and decoding continues. The dividing line matters for
//! attestation: a verifier must see every record or none.

#![warn(missing_docs, unused)]
#![deny(clippy::all)]

#[macro_use]
mod macros;

mod algorithm;
mod device_path;
mod error;
mod event;
mod eventlog;
mod payload;
mod reader;
mod replay;

pub use crate::algorithm::{Algorithm, AlgorithmId, AlgorithmRegistry, HashAlgorithmSet};
pub use crate::device_path::{DevicePath, DevicePathNode, DeviceSubType, DeviceType};
pub use crate::error::{DecodeError, MalformedEventPayload};
pub use crate::event::{EventDigest, EventRecord, EventType, PcrIndex};
pub use crate::eventlog::{AlgorithmSize, EventLog, LogFormat, SpecIdEvent};
pub use crate::payload::{EventPayload, ImageLoadEvent};
pub use crate::reader::ByteReader;
pub use crate::replay::{replay, PcrReplay, PcrTable, PCR_COUNT};
