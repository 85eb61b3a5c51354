// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event-type payload decoding.
//!
//! Firmware vendors add event types faster than any consumer can track,
//! so dispatch is deliberately forward-compatible: event types without a
//! structural decoder are preserved verbatim as [`EventPayload::Opaque`]
//! rather than rejected, and a known type whose payload does not fit its
//! structure degrades to an opaque payload flagged with
//! [`MalformedEventPayload`] instead of aborting the decode.

use crate::device_path::DevicePath;
use crate::error::{DecodeError, MalformedEventPayload};
use crate::event::EventType;
use crate::reader::ByteReader;
use log::warn;

/// Decoded payload of one event record.
#[derive(Clone, Debug)]
pub enum EventPayload<'a> {
    /// A `UEFI_IMAGE_LOAD_EVENT` structure, recorded when firmware loads
    /// a boot application or driver.
    ImageLoad(ImageLoadEvent<'a>),

    /// Raw payload bytes of an event type with no structural decoder.
    Opaque(&'a [u8]),
}

impl<'a> EventPayload<'a> {
    /// Dispatch on `event_type` to the type-specific decoder.
    ///
    /// Returns the decoded variant plus, for known types whose payload
    /// fails structurally, the contained error to flag on the record.
    pub(crate) fn parse(
        event_type: EventType,
        data: &'a [u8],
    ) -> (Self, Option<MalformedEventPayload>) {
        match event_type {
            // These three share the UEFI_IMAGE_LOAD_EVENT layout.
            EventType::EFI_BOOT_SERVICES_APPLICATION
            | EventType::EFI_BOOT_SERVICES_DRIVER
            | EventType::EFI_RUNTIME_SERVICES_DRIVER => {
                match ImageLoadEvent::parse(event_type, data) {
                    Ok(image_load) => (Self::ImageLoad(image_load), None),
                    Err(err) => {
                        warn!("retaining payload as opaque bytes: {err}");
                        (Self::Opaque(data), Some(err))
                    }
                }
            }
            _ => (Self::Opaque(data), None),
        }
    }
}

/// A `UEFI_IMAGE_LOAD_EVENT` structure.
///
/// Layout, per the PC Client firmware profile:
///
/// ```text
/// UEFI_PHYSICAL_ADDRESS ImageLocationInMemory;
/// UINT64                ImageLengthInMemory;
/// UINT64                ImageLinkTimeAddress;
/// UINT64                LengthOfDevicePath;
/// UEFI_DEVICE_PATH      DevicePath[LengthOfDevicePath];
/// ```
#[derive(Clone, Debug)]
pub struct ImageLoadEvent<'a> {
    image_location_in_memory: u64,
    image_length_in_memory: u64,
    image_link_time_address: u64,
    device_path: Option<DevicePath<'a>>,
}

impl<'a> ImageLoadEvent<'a> {
    fn parse(event_type: EventType, data: &'a [u8]) -> Result<Self, MalformedEventPayload> {
        let mut reader = ByteReader::new(data);
        let malformed = |reader: &ByteReader<'_>, reason| MalformedEventPayload {
            event_type,
            offset: reader.offset(),
            reason,
        };

        let image_location_in_memory = reader
            .read_u64_le()
            .map_err(|_| malformed(&reader, "8-byte image physical address"))?;
        let image_length_in_memory = reader
            .read_u64_le()
            .map_err(|_| malformed(&reader, "8-byte image length"))?;
        let image_link_time_address = reader
            .read_u64_le()
            .map_err(|_| malformed(&reader, "8-byte image link time address"))?;
        let device_path_length = reader
            .read_u64_le()
            .map_err(|_| malformed(&reader, "8-byte device path length"))?;

        // The device path is present only when a non-zero length is
        // declared. A length the payload cannot satisfy is a structural
        // defect of the fixed fields; corruption *inside* the path bytes
        // is handled more leniently by the device path decoder.
        let device_path = if device_path_length == 0 {
            None
        } else {
            let device_path_length = usize::try_from(device_path_length)
                .map_err(|_| malformed(&reader, "device path length exceeds address space"))?;
            let path_bytes = reader.read(device_path_length).map_err(|err| {
                if let DecodeError::TruncatedLog { offset, .. } = err {
                    MalformedEventPayload {
                        event_type,
                        offset,
                        reason: "device path length exceeds payload size",
                    }
                } else {
                    malformed(&reader, "device path bytes")
                }
            })?;
            Some(DevicePath::parse(path_bytes))
        };

        Ok(Self {
            image_location_in_memory,
            image_length_in_memory,
            image_link_time_address,
            device_path,
        })
    }

    /// Physical address the image was loaded at.
    #[must_use]
    pub const fn image_location_in_memory(&self) -> u64 {
        self.image_location_in_memory
    }

    /// Length in bytes of the loaded image.
    #[must_use]
    pub const fn image_length_in_memory(&self) -> u64 {
        self.image_length_in_memory
    }

    /// Link-time base address of the image.
    #[must_use]
    pub const fn image_link_time_address(&self) -> u64 {
        self.image_link_time_address
    }

    /// Device path of the image source, when one was recorded.
    #[must_use]
    pub const fn device_path(&self) -> Option<&DevicePath<'a>> {
        self.device_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_path::{DeviceSubType, DeviceType};

    fn image_load_prefix(device_path_length: u64) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend(0x7654_3210_u64.to_le_bytes()); // location
        data.extend(0x1000_u64.to_le_bytes()); // length
        data.extend(0x0040_0000_u64.to_le_bytes()); // link time address
        data.extend(device_path_length.to_le_bytes());
        data
    }

    #[test]
    fn test_image_load_with_device_path() {
        // A one-node path plus the end-entire terminator: 4 + 4 bytes.
        let mut path = vec![0x04, 0x04, 0x08, 0x00, b'a', b'b', b'c', b'd'];
        path.extend([DeviceType::END.0, DeviceSubType::END_ENTIRE.0, 0x04, 0x00]);

        let mut data = image_load_prefix(path.len() as u64);
        data.extend(&path);

        let (payload, err) = EventPayload::parse(EventType::EFI_BOOT_SERVICES_APPLICATION, &data);
        assert!(err.is_none());

        let EventPayload::ImageLoad(image_load) = payload else {
            panic!("expected an image load payload");
        };
        assert_eq!(image_load.image_location_in_memory(), 0x7654_3210);
        assert_eq!(image_load.image_length_in_memory(), 0x1000);
        assert_eq!(image_load.image_link_time_address(), 0x0040_0000);

        let device_path = image_load.device_path().unwrap();
        assert!(device_path.is_complete());
        assert_eq!(device_path.nodes().len(), 1);
        assert_eq!(device_path.nodes()[0].data(), b"abcd");
    }

    #[test]
    fn test_image_load_without_device_path() {
        let data = image_load_prefix(0);
        let (payload, err) = EventPayload::parse(EventType::EFI_BOOT_SERVICES_APPLICATION, &data);

        assert!(err.is_none());
        let EventPayload::ImageLoad(image_load) = payload else {
            panic!("expected an image load payload");
        };
        assert!(image_load.device_path().is_none());
    }

    #[test]
    fn test_image_load_too_short() {
        // Only two of the four fixed u64 fields.
        let data = vec![0u8; 16];
        let (payload, err) = EventPayload::parse(EventType::EFI_BOOT_SERVICES_DRIVER, &data);

        let err = err.unwrap();
        assert_eq!(err.event_type, EventType::EFI_BOOT_SERVICES_DRIVER);
        assert_eq!(err.offset, 16);
        assert!(matches!(payload, EventPayload::Opaque(bytes) if bytes == data.as_slice()));
    }

    #[test]
    fn test_image_load_device_path_length_overruns_payload() {
        // Declares 64 path bytes but supplies none.
        let data = image_load_prefix(64);
        let (payload, err) = EventPayload::parse(EventType::EFI_BOOT_SERVICES_APPLICATION, &data);

        let err = err.unwrap();
        assert_eq!(err.reason, "device path length exceeds payload size");
        assert!(matches!(payload, EventPayload::Opaque(_)));
    }

    #[test]
    fn test_image_load_corrupt_path_is_contained() {
        // Path bytes present but the node inside overruns them: the
        // payload decodes, only the path is flagged.
        let path = [0x04u8, 0x01, 0xff, 0x00, 0xaa, 0xbb];
        let mut data = image_load_prefix(path.len() as u64);
        data.extend(path);

        let (payload, err) = EventPayload::parse(EventType::EFI_BOOT_SERVICES_APPLICATION, &data);
        assert!(err.is_none());

        let EventPayload::ImageLoad(image_load) = payload else {
            panic!("expected an image load payload");
        };
        assert!(!image_load.device_path().unwrap().is_complete());
    }

    #[test]
    fn test_unknown_event_type_is_opaque() {
        let data = [1, 2, 3];
        let (payload, err) = EventPayload::parse(EventType(0x4242_4242), &data);
        assert!(err.is_none());
        assert!(matches!(payload, EventPayload::Opaque([1, 2, 3])));
    }
}
