// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event log decoding and format detection.
//!
//! Two incompatible encodings exist. The legacy format (TCG 1.2) gives
//! every record a single fixed 20-byte SHA-1 digest. The crypto-agile
//! format (TCG 2.0) opens with a `Spec ID Event03` header declaring the
//! active algorithms and their digest sizes, and every following record
//! carries one digest per active algorithm. The two share no common
//! fixed-size prefix beyond the PCR index and event type, so the format
//! is detected by decoding the first record with the legacy shape and
//! checking it for the crypto-agile signature.

use crate::algorithm::{AlgorithmId, AlgorithmRegistry, HashAlgorithmSet};
use crate::error::DecodeError;
use crate::event::{EventDigest, EventRecord, EventType, PcrIndex};
use crate::payload::EventPayload;
use crate::reader::ByteReader;
use log::debug;

/// Signature identifying the crypto-agile format, stored at the start of
/// the first record's payload. The C name is `TCG_EfiSpecIDEventStruct`.
const SPEC_ID_SIGNATURE: &[u8; 16] = b"Spec ID Event03\0";

/// Digest size of SHA-1, the only algorithm the legacy format carries.
const SHA1_DIGEST_SIZE: usize = 20;

/// On-disk encoding of an event log.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    /// Legacy TCG 1.2 encoding: one fixed SHA-1 digest per record.
    Sha1,
    /// TCG 2.0 crypto-agile encoding: one digest per active algorithm.
    CryptoAgile,
}

/// An algorithm/digest-size pair declared active by a log.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlgorithmSize {
    /// TCG algorithm identifier.
    pub algorithm: AlgorithmId,
    /// Digest size in bytes, as declared by the log header.
    pub digest_size: u16,
}

/// Decoded content of the `TCG_EfiSpecIDEventStruct` header event that
/// opens a crypto-agile log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpecIdEvent<'a> {
    /// Platform class (client or server).
    pub platform_class: u32,
    /// Specification version as (major, minor, errata).
    pub spec_version: (u8, u8, u8),
    /// Size of the firmware's UINTN type: 1 for u32, 2 for u64.
    pub uintn_size: u8,
    /// Active algorithms and their digest sizes, in declaration order.
    pub algorithms: Vec<AlgorithmSize>,
    /// Vendor-specific trailing bytes.
    pub vendor_info: &'a [u8],
}

impl<'a> SpecIdEvent<'a> {
    /// Decode the Spec ID structure from the first record's payload.
    /// The signature has already been checked by the caller.
    fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(data);
        reader.read(SPEC_ID_SIGNATURE.len())?;

        let platform_class = reader.read_u32_le()?;
        let version_minor = reader.read_u8()?;
        let version_major = reader.read_u8()?;
        let version_errata = reader.read_u8()?;
        let uintn_size = reader.read_u8()?;

        let number_of_algorithms = reader.read_u32_le()?;
        let mut algorithms = Vec::new();
        for _ in 0..number_of_algorithms {
            let algorithm = AlgorithmId(reader.read_u16_le()?);
            let digest_size = reader.read_u16_le()?;
            algorithms.push(AlgorithmSize {
                algorithm,
                digest_size,
            });
        }

        let vendor_info_size = usize::from(reader.read_u8()?);
        let vendor_info = reader.read(vendor_info_size)?;

        Ok(Self {
            platform_class,
            spec_version: (version_major, version_minor, version_errata),
            uintn_size,
            algorithms,
            vendor_info,
        })
    }

    /// Digest size declared for `algorithm`, if it is active.
    #[must_use]
    pub fn digest_size(&self, algorithm: AlgorithmId) -> Option<u16> {
        self.algorithms
            .iter()
            .find(|a| a.algorithm == algorithm)
            .map(|a| a.digest_size)
    }
}

/// A fully decoded event log: the ordered record sequence plus the
/// format metadata needed to interpret it.
///
/// Records borrow the input buffer; the log is a pure function of those
/// bytes and holds no other state.
#[derive(Debug)]
pub struct EventLog<'a> {
    format: LogFormat,
    spec_id: Option<SpecIdEvent<'a>>,
    algorithms: Vec<AlgorithmSize>,
    events: Vec<EventRecord<'a>>,
}

impl<'a> EventLog<'a> {
    /// Decode a complete event log from `bytes`.
    ///
    /// Structural failures (a declared length or count exceeding the
    /// remaining buffer, or an unrecognizable first record) are fatal
    /// and return an error. Anomalies local to one record (unknown event
    /// types, malformed payloads of known types, corrupt device paths)
    /// are contained: the record is retained, flagged where applicable,
    /// and decoding continues.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);

        // Single-record lookahead: the first record of *both* formats is
        // legacy-shaped. If it is the no-action spec-id marker the rest
        // of the stream is crypto-agile.
        let first = decode_sha1_record(&mut reader).map_err(|_| DecodeError::UnrecognizedFormat)?;

        if first.pcr_index == PcrIndex(0)
            && first.event_type == EventType::NO_ACTION
            && first.data.len() >= SPEC_ID_SIGNATURE.len()
            && &first.data[..SPEC_ID_SIGNATURE.len()] == SPEC_ID_SIGNATURE
        {
            let spec_id = SpecIdEvent::parse(first.data)?;
            debug!(
                "crypto-agile log: spec {:?}, {} algorithms",
                spec_id.spec_version,
                spec_id.algorithms.len()
            );

            let mut events = vec![first];
            while !reader.is_empty() {
                events.push(decode_agile_record(&mut reader, &spec_id)?);
            }

            let algorithms = spec_id.algorithms.clone();
            Ok(Self {
                format: LogFormat::CryptoAgile,
                spec_id: Some(spec_id),
                algorithms,
                events,
            })
        } else {
            debug!("legacy SHA-1 log");
            let mut events = vec![first];
            while !reader.is_empty() {
                events.push(decode_sha1_record(&mut reader)?);
            }

            Ok(Self {
                format: LogFormat::Sha1,
                spec_id: None,
                algorithms: vec![AlgorithmSize {
                    algorithm: AlgorithmId::SHA1,
                    digest_size: SHA1_DIGEST_SIZE as u16,
                }],
                events,
            })
        }
    }

    /// The detected on-disk encoding.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// The decoded records, in log order. For crypto-agile logs this
    /// includes the format-signaling no-action header record.
    #[must_use]
    pub fn events(&self) -> &[EventRecord<'a>] {
        &self.events
    }

    /// The algorithms active in this log with their digest sizes. Legacy
    /// logs report a single SHA-1/20 entry.
    #[must_use]
    pub fn algorithms(&self) -> &[AlgorithmSize] {
        &self.algorithms
    }

    /// Bitmap summary of the active well-known algorithms.
    #[must_use]
    pub fn active_algorithms(&self) -> HashAlgorithmSet {
        self.algorithms
            .iter()
            .filter_map(|a| HashAlgorithmSet::from_algorithm(a.algorithm))
            .collect()
    }

    /// The log's primary hash algorithm: SHA-256 when active, then
    /// SHA-1, then the first declared algorithm. Verifiers report PCR
    /// values under this algorithm by default.
    #[must_use]
    pub fn primary_algorithm(&self) -> AlgorithmId {
        let declared = |id| self.algorithms.iter().any(|a| a.algorithm == id);
        if declared(AlgorithmId::SHA256) {
            AlgorithmId::SHA256
        } else if declared(AlgorithmId::SHA1) {
            AlgorithmId::SHA1
        } else {
            // A crypto-agile log must declare at least one algorithm to
            // have decoded a single record; fall back defensively anyway.
            self.algorithms
                .first()
                .map_or(AlgorithmId::SHA1, |a| a.algorithm)
        }
    }

    /// Short registry name of the primary algorithm, e.g. `"SHA256"`,
    /// or `None` for logs whose primary algorithm is outside the
    /// registry.
    #[must_use]
    pub fn primary_algorithm_name(&self) -> Option<&'static str> {
        AlgorithmRegistry::well_known()
            .lookup(self.primary_algorithm())
            .map(|alg| alg.name)
    }

    /// The crypto-agile header content, `None` for legacy logs.
    #[must_use]
    pub const fn spec_id(&self) -> Option<&SpecIdEvent<'a>> {
        self.spec_id.as_ref()
    }
}

/// Decode one record with the legacy shape: PCR index, event type, one
/// fixed 20-byte SHA-1 digest, then the size-prefixed payload.
fn decode_sha1_record<'a>(reader: &mut ByteReader<'a>) -> Result<EventRecord<'a>, DecodeError> {
    let pcr_index = PcrIndex(reader.read_u32_le()?);
    let event_type = EventType(reader.read_u32_le()?);
    let digest = reader.read(SHA1_DIGEST_SIZE)?;

    let event_data_size = reader.read_u32_le()?;
    let data = reader.read(event_data_size as usize)?;
    let (payload, payload_error) = EventPayload::parse(event_type, data);

    Ok(EventRecord {
        pcr_index,
        event_type,
        digests: vec![EventDigest {
            algorithm: AlgorithmId::SHA1,
            digest,
        }],
        data,
        payload,
        payload_error,
    })
}

/// Decode one record with the crypto-agile shape: PCR index, event type,
/// digest count, that many (algorithm id, digest) pairs sized from the
/// Spec ID header, then the size-prefixed payload.
fn decode_agile_record<'a>(
    reader: &mut ByteReader<'a>,
    spec_id: &SpecIdEvent<'_>,
) -> Result<EventRecord<'a>, DecodeError> {
    let pcr_index = PcrIndex(reader.read_u32_le()?);
    let event_type = EventType(reader.read_u32_le()?);

    let digest_count = reader.read_u32_le()?;
    let mut digests = Vec::with_capacity(digest_count.min(8) as usize);
    for _ in 0..digest_count {
        let digest_offset = reader.offset();
        let algorithm = AlgorithmId(reader.read_u16_le()?);

        // Digest sizes come from the log's own header. An algorithm the
        // header never declared leaves the record boundary undecidable.
        let digest_size = spec_id.digest_size(algorithm).ok_or({
            DecodeError::UnknownAlgorithm {
                algorithm: algorithm.0,
                offset: digest_offset,
            }
        })?;

        let digest = reader.read(usize::from(digest_size))?;
        digests.push(EventDigest { algorithm, digest });
    }

    let event_data_size = reader.read_u32_le()?;
    let data = reader.read(event_data_size as usize)?;
    let (payload, payload_error) = EventPayload::parse(event_type, data);

    Ok(EventRecord {
        pcr_index,
        event_type,
        digests,
        data,
        payload,
        payload_error,
    })
}
