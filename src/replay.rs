// SPDX-License-Identifier: MIT OR Apache-2.0

//! PCR replay: recomputing the register values a TPM would hold after
//! the logged boot sequence.
//!
//! A PCR can only be mutated through the extend operation,
//! `pcr_new = Hash(pcr_old || digest)`, which is non-commutative: the
//! digests must be applied in exact log order. Replay starts every
//! register at the all-zero digest of its algorithm's size, folds each
//! record's digests in, and freezes the table once the record sequence
//! is consumed.
//!
//! The two phases are expressed as two types: [`PcrReplay`] accumulates
//! and cannot be queried, [`PcrTable`] is frozen and can only be
//! queried.

use crate::algorithm::{AlgorithmId, AlgorithmRegistry};
use crate::event::{EventRecord, EventType, PcrIndex};
use crate::eventlog::EventLog;
use log::warn;
use std::collections::BTreeMap;

/// Number of PCRs a TPM exposes.
pub const PCR_COUNT: usize = 24;

/// One bank: the 24 running digests kept under a single algorithm.
type Bank = [Vec<u8>; PCR_COUNT];

/// Decode-and-replay convenience: replay every record of `log` and
/// return the finalized table.
#[must_use]
pub fn replay(log: &EventLog<'_>) -> PcrTable {
    let mut engine = PcrReplay::new(log);
    for event in log.events() {
        engine.extend_record(event);
    }
    engine.finish()
}

/// Accumulating phase of the replay engine.
#[derive(Debug)]
pub struct PcrReplay {
    registry: AlgorithmRegistry,
    banks: BTreeMap<AlgorithmId, Bank>,
}

impl PcrReplay {
    /// Set up zeroed banks for every algorithm the log declares and the
    /// registry can hash.
    ///
    /// Declared algorithms without a hash backend get no bank; their
    /// chains cannot be recomputed and all queries on them report
    /// `None`.
    #[must_use]
    pub fn new(log: &EventLog<'_>) -> Self {
        let registry = AlgorithmRegistry::well_known();
        let mut banks = BTreeMap::new();

        for algorithm_size in log.algorithms() {
            let algorithm = algorithm_size.algorithm;
            if !registry.can_hash(algorithm) {
                warn!(
                    "no hash backend for {:?}; its PCR bank will not be computed",
                    algorithm
                );
                continue;
            }
            let digest_size = usize::from(algorithm_size.digest_size);
            banks.insert(
                algorithm,
                core::array::from_fn(|_| vec![0u8; digest_size]),
            );
        }

        Self { registry, banks }
    }

    /// Apply one record's digests to the table, in log order.
    ///
    /// No-action records exist only to carry metadata (the crypto-agile
    /// format marker among them) and are never extended. Out-of-range
    /// PCR indices are skipped: some firmware logs debug entries against
    /// indices no TPM has.
    pub fn extend_record(&mut self, event: &EventRecord<'_>) {
        if event.event_type() == EventType::NO_ACTION {
            return;
        }

        let PcrIndex(index) = event.pcr_index();
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        if index >= PCR_COUNT {
            warn!(
                "skipping extension of out-of-range PCR {} ({:?})",
                index,
                event.event_type()
            );
            return;
        }

        for event_digest in event.digests() {
            let Some(bank) = self.banks.get_mut(&event_digest.algorithm) else {
                continue;
            };

            let mut preimage = Vec::with_capacity(bank[index].len() + event_digest.digest.len());
            preimage.extend_from_slice(&bank[index]);
            preimage.extend_from_slice(event_digest.digest);

            if let Some(extended) = self.registry.hash(event_digest.algorithm, &preimage) {
                bank[index] = extended;
            }
        }
    }

    /// Freeze the table. No further mutation is possible afterward.
    #[must_use]
    pub fn finish(self) -> PcrTable {
        PcrTable { banks: self.banks }
    }
}

/// Finalized PCR table: the expected register values after replaying the
/// full log. Read-only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PcrTable {
    banks: BTreeMap<AlgorithmId, Bank>,
}

impl PcrTable {
    /// The computed digest for one register, or `None` when the chain
    /// was not computed: the algorithm is not in the log, has no hash
    /// backend, or the index is out of range.
    #[must_use]
    pub fn value(&self, index: PcrIndex, algorithm: AlgorithmId) -> Option<&[u8]> {
        let bank = self.banks.get(&algorithm)?;
        let index = usize::try_from(index.0).ok()?;
        bank.get(index).map(Vec::as_slice)
    }

    /// All 24 registers of one algorithm's bank, in index order.
    #[must_use]
    pub fn bank(&self, algorithm: AlgorithmId) -> Option<&[Vec<u8>; PCR_COUNT]> {
        self.banks.get(&algorithm)
    }

    /// Hex-encoded (lowercase) value of one register.
    #[must_use]
    pub fn hex_value(&self, index: PcrIndex, algorithm: AlgorithmId) -> Option<String> {
        self.value(index, algorithm).map(hex::encode)
    }

    /// Hex-encoded values of all 24 registers of one bank, in index
    /// order.
    #[must_use]
    pub fn hex_bank(&self, algorithm: AlgorithmId) -> Option<[String; PCR_COUNT]> {
        let bank = self.bank(algorithm)?;
        Some(core::array::from_fn(|i| hex::encode(&bank[i])))
    }

    /// The algorithms with computed banks, in ascending id order.
    pub fn algorithms(&self) -> impl Iterator<Item = AlgorithmId> + '_ {
        self.banks.keys().copied()
    }
}
