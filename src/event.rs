// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoded measurement records.

use crate::algorithm::AlgorithmId;
use crate::error::MalformedEventPayload;
use crate::payload::EventPayload;

/// Platform Configuration Register index.
///
/// A TPM exposes 24 PCRs; valid indices are 0–23. The newtype is `u32`
/// because that is the on-disk width, and firmware has been seen to log
/// out-of-range values that still need to be representable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PcrIndex(pub u32);

newtype_enum! {
    /// Event types stored in the TPM event log. The event type defines
    /// which structure the event data carries.
    ///
    /// For details of each variant, see the Events table in the Event
    /// Logging chapter of the [TCG PC Client Platform Firmware Profile
    /// Specification][spec].
    ///
    /// [spec]: https://trustedcomputinggroup.org/resource/pc-client-specific-platform-firmware-profile-specification/
    pub enum EventType: u32 => #[allow(missing_docs)] {
        PREBOOT_CERT = 0x0000_0000,
        POST_CODE = 0x0000_0001,
        UNUSED = 0x0000_0002,
        NO_ACTION = 0x0000_0003,
        SEPARATOR = 0x0000_0004,
        ACTION = 0x0000_0005,
        EVENT_TAG = 0x0000_0006,
        CRTM_CONTENTS = 0x0000_0007,
        CRTM_VERSION = 0x0000_0008,
        CPU_MICROCODE = 0x0000_0009,
        PLATFORM_CONFIG_FLAGS = 0x0000_000a,
        TABLE_OF_DEVICES = 0x0000_000b,
        COMPACT_HASH = 0x0000_000c,
        IPL = 0x0000_000d,
        IPL_PARTITION_DATA = 0x0000_000e,
        NONHOST_CODE = 0x0000_000f,
        NONHOST_CONFIG = 0x0000_0010,
        NONHOST_INFO = 0x0000_0011,
        OMIT_BOOT_DEVICE_EVENTS = 0x0000_0012,
        EFI_EVENT_BASE = 0x8000_0000,
        EFI_VARIABLE_DRIVER_CONFIG = 0x8000_0001,
        EFI_VARIABLE_BOOT = 0x8000_0002,
        EFI_BOOT_SERVICES_APPLICATION = 0x8000_0003,
        EFI_BOOT_SERVICES_DRIVER = 0x8000_0004,
        EFI_RUNTIME_SERVICES_DRIVER = 0x8000_0005,
        EFI_GPT_EVENT = 0x8000_0006,
        EFI_ACTION = 0x8000_0007,
        EFI_PLATFORM_FIRMWARE_BLOB = 0x8000_0008,
        EFI_HANDOFF_TABLES = 0x8000_0009,
        EFI_PLATFORM_FIRMWARE_BLOB2 = 0x8000_000a,
        EFI_HANDOFF_TABLES2 = 0x8000_000b,
        EFI_VARIABLE_BOOT2 = 0x8000_000c,
        EFI_HCRTM_EVENT = 0x8000_0010,
        EFI_VARIABLE_AUTHORITY = 0x8000_00e0,
        EFI_SPDM_FIRMWARE_BLOB = 0x8000_00e1,
        EFI_SPDM_FIRMWARE_CONFIG = 0x8000_00e2,
    }
}

/// One digest recorded for an event.
///
/// Legacy logs carry exactly one SHA-1 digest per event; crypto-agile
/// logs carry one digest per active algorithm. The digest bytes borrow
/// the log buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EventDigest<'a> {
    /// Algorithm the digest was computed with.
    pub algorithm: AlgorithmId,
    /// Raw digest bytes, of that algorithm's declared size.
    pub digest: &'a [u8],
}

/// One measurement entry decoded from the log.
///
/// Immutable after decoding. Digest and payload bytes are borrowed views
/// of the log buffer; callers can read but never mutate them.
///
/// Naming note: the "event data" payload and the data hashed into the
/// digests are independent. The payload _can_ be what was hashed, but
/// for most event types it is descriptive metadata instead.
#[derive(Clone, Debug)]
pub struct EventRecord<'a> {
    pub(crate) pcr_index: PcrIndex,
    pub(crate) event_type: EventType,
    pub(crate) digests: Vec<EventDigest<'a>>,
    pub(crate) data: &'a [u8],
    pub(crate) payload: EventPayload<'a>,
    pub(crate) payload_error: Option<MalformedEventPayload>,
}

impl<'a> EventRecord<'a> {
    /// PCR index the event was measured into.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        self.pcr_index
    }

    /// Type of event, indicating how [`data`] is structured.
    ///
    /// [`data`]: Self::data
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The digests recorded for this event, one per active algorithm.
    #[must_use]
    pub fn digests(&self) -> &[EventDigest<'a>] {
        &self.digests
    }

    /// The digest recorded under `algorithm`, if the event carries one.
    #[must_use]
    pub fn digest(&self, algorithm: AlgorithmId) -> Option<&'a [u8]> {
        self.digests
            .iter()
            .find(|d| d.algorithm == algorithm)
            .map(|d| d.digest)
    }

    /// Raw event payload bytes, always retained verbatim.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Decoded payload variant; [`EventPayload::Opaque`] for event types
    /// this crate does not structurally understand.
    #[must_use]
    pub const fn payload(&self) -> &EventPayload<'a> {
        &self.payload
    }

    /// Set when a known event type's payload failed structural decoding.
    /// The record is still usable: [`data`] holds the raw bytes and the
    /// digests still participate in PCR replay.
    ///
    /// [`data`]: Self::data
    #[must_use]
    pub const fn payload_error(&self) -> Option<&MalformedEventPayload> {
        self.payload_error.as_ref()
    }
}
