// SPDX-License-Identifier: MIT OR Apache-2.0

//! UEFI device paths as recorded in image-load event payloads.
//!
//! A device path is a packed list of variable-length nodes. Each node
//! starts with a 4-byte header (type, subtype, 16-bit little-endian
//! length, where the length includes the header itself) and is followed
//! by `length - 4` bytes of type-specific data. The list is terminated by
//! an [`END`]/[`END_ENTIRE`] node.
//!
//! Device paths inside event logs are untrusted vendor data, and what
//! attestation actually verifies is the digest of the path bytes, not
//! their decoded content. A corrupt path therefore never fails the
//! enclosing event: decoding stops and the path-so-far is returned with
//! [`DevicePath::is_complete`] false.
//!
//! [`END`]: DeviceType::END
//! [`END_ENTIRE`]: DeviceSubType::END_ENTIRE

use core::fmt::{self, Display, Formatter};
use log::warn;

newtype_enum! {
    /// Type identifier of a device path node.
    pub enum DeviceType: u8 => {
        /// Hardware device path (PCI, memory-mapped, ...).
        HARDWARE = 0x01,
        /// ACPI device path.
        ACPI = 0x02,
        /// Messaging device path (SCSI, USB, network, ...).
        MESSAGING = 0x03,
        /// Media device path (hard drive partition, file path, ...).
        MEDIA = 0x04,
        /// BIOS Boot Specification device path.
        BIOS_BOOT_SPEC = 0x05,
        /// End of the device path.
        END = 0x7f,
    }
}

newtype_enum! {
    /// Sub-type identifier of a device path node. Only meaningful in
    /// combination with the node's [`DeviceType`].
    pub enum DeviceSubType: u8 => {
        /// End this instance of a device path and start a new one.
        END_INSTANCE = 0x01,
        /// End the entire device path.
        END_ENTIRE = 0xff,
    }
}

/// Size of the type/subtype/length node header.
const NODE_HEADER_SIZE: usize = 4;

/// A single node within a [`DevicePath`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DevicePathNode<'a> {
    device_type: DeviceType,
    sub_type: DeviceSubType,
    data: &'a [u8],
}

impl<'a> DevicePathNode<'a> {
    /// Type of device.
    #[must_use]
    pub const fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Sub type of device.
    #[must_use]
    pub const fn sub_type(&self) -> DeviceSubType {
        self.sub_type
    }

    /// Tuple of the node's type and subtype.
    #[must_use]
    pub const fn full_type(&self) -> (DeviceType, DeviceSubType) {
        (self.device_type, self.sub_type)
    }

    /// Node body after the 4-byte header.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Size (in bytes) of the full node, including the header.
    #[must_use]
    pub fn length(&self) -> u16 {
        // OK to unwrap: the body came from a u16-sized read.
        u16::try_from(NODE_HEADER_SIZE + self.data.len()).unwrap()
    }

    /// True if this node ends an entire [`DevicePath`].
    #[must_use]
    pub fn is_end_entire(&self) -> bool {
        self.full_type() == (DeviceType::END, DeviceSubType::END_ENTIRE)
    }
}

impl Display for DevicePathNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?} ({} bytes)",
            self.device_type,
            self.sub_type,
            self.data.len()
        )
    }
}

/// An ordered sequence of [`DevicePathNode`]s decoded from an event
/// payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DevicePath<'a> {
    nodes: Vec<DevicePathNode<'a>>,
    complete: bool,
}

impl<'a> DevicePath<'a> {
    /// Decode a device path from `bytes`.
    ///
    /// Reads nodes until the end-entire node or until the input is
    /// exhausted. A node whose declared length is shorter than its own
    /// header or would read past the end of `bytes` stops decoding; the
    /// path read so far is returned with [`is_complete`] false rather
    /// than failing the enclosing event. The end node itself is not
    /// included in the node list.
    ///
    /// [`is_complete`]: Self::is_complete
    #[must_use]
    pub fn parse(bytes: &'a [u8]) -> Self {
        let mut nodes = Vec::new();
        let mut rest = bytes;

        loop {
            if rest.is_empty() {
                // Ran out of input without seeing the terminator.
                warn!("device path missing its end-entire node");
                return Self {
                    nodes,
                    complete: false,
                };
            }
            if rest.len() < NODE_HEADER_SIZE {
                warn!("device path node header overruns the path bytes");
                return Self {
                    nodes,
                    complete: false,
                };
            }

            let device_type = DeviceType(rest[0]);
            let sub_type = DeviceSubType(rest[1]);
            let length = usize::from(u16::from_le_bytes([rest[2], rest[3]]));

            if length < NODE_HEADER_SIZE || length > rest.len() {
                warn!(
                    "device path node {:?}/{:?} declares length {}, {} bytes remain",
                    device_type,
                    sub_type,
                    length,
                    rest.len()
                );
                return Self {
                    nodes,
                    complete: false,
                };
            }

            let node = DevicePathNode {
                device_type,
                sub_type,
                data: &rest[NODE_HEADER_SIZE..length],
            };
            if node.is_end_entire() {
                return Self {
                    nodes,
                    complete: true,
                };
            }

            nodes.push(node);
            rest = &rest[length..];
        }
    }

    /// The decoded nodes, in path order, excluding the end node.
    #[must_use]
    pub fn nodes(&self) -> &[DevicePathNode<'a>] {
        &self.nodes
    }

    /// False if the path was corrupt: a node overran the supplied bytes
    /// or the end-entire terminator was never reached.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Append a node to `path` from raw data.
    fn add_node(path: &mut Vec<u8>, device_type: u8, sub_type: u8, node_data: &[u8]) {
        path.push(device_type);
        path.push(sub_type);
        path.extend(
            u16::try_from(NODE_HEADER_SIZE + node_data.len())
                .unwrap()
                .to_le_bytes(),
        );
        path.extend(node_data);
    }

    fn create_raw_device_path() -> Vec<u8> {
        let mut raw_data = Vec::new();
        add_node(&mut raw_data, 0x02, 0x01, &[10, 11]);
        add_node(&mut raw_data, 0x04, 0x04, &[20, 21, 22, 23]);
        add_node(
            &mut raw_data,
            DeviceType::END.0,
            DeviceSubType::END_ENTIRE.0,
            &[],
        );
        raw_data
    }

    /// Check that `node` has the expected content.
    fn check_node(node: &DevicePathNode, device_type: u8, sub_type: u8, node_data: &[u8]) {
        assert_eq!(node.device_type().0, device_type);
        assert_eq!(node.sub_type().0, sub_type);
        assert_eq!(node.data(), node_data);
        assert_eq!(
            node.length(),
            u16::try_from(NODE_HEADER_SIZE + node_data.len()).unwrap()
        );
    }

    #[test]
    fn test_well_formed_path() {
        let raw_data = create_raw_device_path();
        let path = DevicePath::parse(&raw_data);

        assert!(path.is_complete());
        let nodes = path.nodes();
        assert_eq!(nodes.len(), 2);
        check_node(&nodes[0], 0x02, 0x01, &[10, 11]);
        check_node(&nodes[1], 0x04, 0x04, &[20, 21, 22, 23]);
    }

    #[test]
    fn test_missing_terminator() {
        let mut raw_data = Vec::new();
        add_node(&mut raw_data, 0x02, 0x01, &[10, 11]);
        add_node(&mut raw_data, 0x04, 0x04, &[20, 21]);

        let path = DevicePath::parse(&raw_data);
        assert!(!path.is_complete());
        assert_eq!(path.nodes().len(), 2);
        check_node(&path.nodes()[1], 0x04, 0x04, &[20, 21]);
    }

    #[test]
    fn test_node_length_overruns_input() {
        let mut raw_data = Vec::new();
        add_node(&mut raw_data, 0x02, 0x01, &[10, 11]);
        // Node claiming 32 bytes with only its header present.
        raw_data.extend([0x04, 0x04, 32, 0]);

        let path = DevicePath::parse(&raw_data);
        assert!(!path.is_complete());
        // The nodes before the corrupt one are preserved.
        assert_eq!(path.nodes().len(), 1);
        check_node(&path.nodes()[0], 0x02, 0x01, &[10, 11]);
    }

    #[test]
    fn test_node_length_shorter_than_header() {
        // Declared length of 2 cannot even cover the node header.
        let raw_data = [0x01, 0x01, 0x02, 0x00, 0xff, 0xff];
        let path = DevicePath::parse(&raw_data);
        assert!(!path.is_complete());
        assert!(path.nodes().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let path = DevicePath::parse(&[]);
        assert!(!path.is_complete());
        assert!(path.nodes().is_empty());
    }
}
