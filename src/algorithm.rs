// SPDX-License-Identifier: MIT OR Apache-2.0

//! Digest algorithm identifiers and the process-wide algorithm table.

use bitflags::bitflags;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

newtype_enum! {
    /// TCG algorithm identifier.
    ///
    /// These values are defined in the [TCG Algorithm Registry].
    ///
    /// [TCG Algorithm Registry]: https://trustedcomputinggroup.org/resource/tcg-algorithm-registry/
    pub enum AlgorithmId: u16 => {
        /// SHA-1, the only algorithm legacy logs can carry.
        SHA1 = 0x0004,
        /// SHA-256.
        SHA256 = 0x000b,
        /// SHA-384.
        SHA384 = 0x000c,
        /// SHA-512.
        SHA512 = 0x000d,
        /// SM3-256.
        SM3_256 = 0x0012,
    }
}

bitflags! {
    /// Bitmap of well-known hash algorithms, used to summarize which
    /// algorithms a log declares active.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct HashAlgorithmSet: u32 {
        /// SHA-1 hash.
        const SHA1 = 0x0000_0001;

        /// SHA-256 hash.
        const SHA256 = 0x0000_0002;

        /// SHA-384 hash.
        const SHA384 = 0x0000_0004;

        /// SHA-512 hash.
        const SHA512 = 0x0000_0008;

        /// SM3-256 hash.
        const SM3_256 = 0x0000_0010;
    }
}

impl HashAlgorithmSet {
    /// The flag for a single algorithm id, or `None` for ids outside the
    /// well-known set.
    #[must_use]
    pub fn from_algorithm(id: AlgorithmId) -> Option<Self> {
        match id {
            AlgorithmId::SHA1 => Some(Self::SHA1),
            AlgorithmId::SHA256 => Some(Self::SHA256),
            AlgorithmId::SHA384 => Some(Self::SHA384),
            AlgorithmId::SHA512 => Some(Self::SHA512),
            AlgorithmId::SM3_256 => Some(Self::SM3_256),
            _ => None,
        }
    }
}

/// Descriptor for one supported digest algorithm.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Algorithm {
    /// TCG algorithm identifier.
    pub id: AlgorithmId,
    /// Short registry name, e.g. `"SHA256"`.
    pub name: &'static str,
    /// Digest length in bytes.
    pub digest_size: usize,
}

const WELL_KNOWN: &[Algorithm] = &[
    Algorithm {
        id: AlgorithmId::SHA1,
        name: "SHA1",
        digest_size: 20,
    },
    Algorithm {
        id: AlgorithmId::SHA256,
        name: "SHA256",
        digest_size: 32,
    },
    Algorithm {
        id: AlgorithmId::SHA384,
        name: "SHA384",
        digest_size: 48,
    },
    Algorithm {
        id: AlgorithmId::SHA512,
        name: "SHA512",
        digest_size: 64,
    },
    Algorithm {
        id: AlgorithmId::SM3_256,
        name: "SM3_256",
        digest_size: 32,
    },
];

/// Immutable registry mapping algorithm ids to their descriptors and
/// one-shot hash functions.
///
/// The registry is constructed once and never mutated, so it is safe to
/// share freely between independent decode or replay operations.
#[derive(Clone, Copy, Debug)]
pub struct AlgorithmRegistry {
    entries: &'static [Algorithm],
}

impl AlgorithmRegistry {
    /// Registry of the algorithms this crate understands.
    #[must_use]
    pub const fn well_known() -> Self {
        Self {
            entries: WELL_KNOWN,
        }
    }

    /// Look up the descriptor for `id`, or `None` if the algorithm is
    /// not in the registry.
    #[must_use]
    pub fn lookup(&self, id: AlgorithmId) -> Option<&'static Algorithm> {
        self.entries.iter().find(|alg| alg.id == id)
    }

    /// Compute the one-shot digest of `data` under `id`.
    ///
    /// Returns `None` when no hash backend exists for the algorithm
    /// (SM3-256 is in the registry for sizing but has no backend in this
    /// stack, and unknown vendor algorithms cannot be computed at all).
    /// Only the replay engine calls this; the decoder copies digests out
    /// of the log, it never recomputes them.
    #[must_use]
    pub fn hash(&self, id: AlgorithmId, data: &[u8]) -> Option<Vec<u8>> {
        match id {
            AlgorithmId::SHA1 => Some(Sha1::digest(data).to_vec()),
            AlgorithmId::SHA256 => Some(Sha256::digest(data).to_vec()),
            AlgorithmId::SHA384 => Some(Sha384::digest(data).to_vec()),
            AlgorithmId::SHA512 => Some(Sha512::digest(data).to_vec()),
            _ => None,
        }
    }

    /// True if [`hash`] can compute digests for `id`.
    ///
    /// [`hash`]: Self::hash
    #[must_use]
    pub fn can_hash(&self, id: AlgorithmId) -> bool {
        matches!(
            id,
            AlgorithmId::SHA1 | AlgorithmId::SHA256 | AlgorithmId::SHA384 | AlgorithmId::SHA512
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = AlgorithmRegistry::well_known();

        let sha1 = registry.lookup(AlgorithmId::SHA1).unwrap();
        assert_eq!(sha1.name, "SHA1");
        assert_eq!(sha1.digest_size, 20);

        let sha256 = registry.lookup(AlgorithmId::SHA256).unwrap();
        assert_eq!(sha256.digest_size, 32);

        assert!(registry.lookup(AlgorithmId(0x1234)).is_none());
    }

    #[test]
    fn test_hash_backends() {
        let registry = AlgorithmRegistry::well_known();

        // Empty-input digests from FIPS 180 reference values.
        assert_eq!(
            registry.hash(AlgorithmId::SHA1, b"").unwrap(),
            hex::decode("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap()
        );
        assert_eq!(
            registry.hash(AlgorithmId::SHA256, b"").unwrap(),
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap()
        );

        // Sized but not computable.
        assert!(registry.can_hash(AlgorithmId::SHA384));
        assert!(!registry.can_hash(AlgorithmId::SM3_256));
        assert!(registry.hash(AlgorithmId::SM3_256, b"").is_none());
        assert!(registry.hash(AlgorithmId(0x99), b"").is_none());
    }

    #[test]
    fn test_algorithm_set() {
        assert_eq!(
            HashAlgorithmSet::from_algorithm(AlgorithmId::SHA256),
            Some(HashAlgorithmSet::SHA256)
        );
        assert_eq!(HashAlgorithmSet::from_algorithm(AlgorithmId(0xbeef)), None);
    }

    #[test]
    fn test_debug_names() {
        assert_eq!(format!("{:?}", AlgorithmId::SHA256), "AlgorithmId::SHA256");
        assert_eq!(format!("{:?}", AlgorithmId(0x77)), "AlgorithmId(0x77)");
    }
}
