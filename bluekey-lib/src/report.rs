//! Finding aggregation and the terminal report.
//!
//! The aggregator is an explicit value the driver folds packet findings
//! into, in packet order. The two candidate buckets are value-keyed sets (a
//! candidate pool, not a timeline); envelope messages keep packet order
//! because their position in the stream is diagnostically meaningful; and
//! `raw_extractions` is the append-only audit trail every bucket value
//! traces back to.

use crate::envelope::Envelope;
use crate::error::ExtractError;
use crate::scanner::{Candidate, CandidateKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// One envelope-derived guess, tagged with its origin packet and kind
/// (`packet_{n}_key` / `packet_{n}_token`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMessage {
    pub id: String,
    pub value: String,
}

/// The terminal artifact of a run. All values are lowercase hex; raw payload
/// buffers are never retained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique 32-hex-char candidates from the generic sweep.
    pub possible_keys_32: BTreeSet<String>,
    /// Unique 64-hex-char candidates from the generic sweep.
    pub possible_tokens_64: BTreeSet<String>,
    /// Envelope guesses in packet order.
    pub envelope_messages: Vec<EnvelopeMessage>,
    /// Every finding as produced, synthetic id -> hex value. Append-only,
    /// never pruned; preserved for audit even when collapsed in the buckets.
    pub raw_extractions: BTreeMap<String, String>,
}

impl Report {
    /// A run with zero findings is a success, not an error; this is the
    /// "no candidates extracted" outcome the driver reports distinctly.
    pub fn is_empty(&self) -> bool {
        self.possible_keys_32.is_empty()
            && self.possible_tokens_64.is_empty()
            && self.envelope_messages.is_empty()
            && self.raw_extractions.is_empty()
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ExtractError> {
        serde_json::to_string_pretty(self).map_err(|e| ExtractError::Report(e.to_string()))
    }

    /// Write the report to disk for the downstream key-verification tool.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExtractError> {
        let file = File::create(path.as_ref())
            .map_err(|e| ExtractError::Report(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_json::to_writer_pretty(file, self).map_err(|e| ExtractError::Report(e.to_string()))?;
        info!(path = %path.as_ref().display(), "report written");
        Ok(())
    }
}

/// Accumulates per-packet findings across one capture.
#[derive(Debug, Default)]
pub struct Aggregator {
    keys: BTreeSet<String>,
    tokens: BTreeSet<String>,
    envelope_messages: Vec<EnvelopeMessage>,
    raw: BTreeMap<String, String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an envelope finding. Each guess yields one ordered message entry
    /// and one raw-index entry; a short envelope (no guesses) contributes
    /// nothing to the report.
    pub fn add_envelope(&mut self, envelope: &Envelope) {
        if let Some(key) = &envelope.key_guess {
            self.push_envelope_entry(format!("packet_{}_key", envelope.packet_index), key.clone());
        }
        if let Some(token) = &envelope.token_guess {
            self.push_envelope_entry(
                format!("packet_{}_token", envelope.packet_index),
                token.clone(),
            );
        }
    }

    fn push_envelope_entry(&mut self, id: String, value: String) {
        self.raw.insert(id.clone(), value.clone());
        self.envelope_messages.push(EnvelopeMessage { id, value });
    }

    /// Fold a scanner candidate. Candidates are keyed by exact value, so
    /// overlapping windows and repeats across packets collapse to one entry.
    pub fn add_candidate(&mut self, candidate: &Candidate) {
        let id = format!("{}_{}", candidate.kind.id_prefix(), candidate.value);
        if self.raw.contains_key(&id) {
            return;
        }
        self.raw.insert(id, candidate.value.clone());
        match candidate.kind {
            CandidateKind::Key32 => {
                self.keys.insert(candidate.value.clone());
            }
            CandidateKind::Token64 => {
                self.tokens.insert(candidate.value.clone());
            }
        }
    }

    /// Number of raw findings folded so far.
    pub fn finding_count(&self) -> usize {
        self.raw.len()
    }

    pub fn finish(self) -> Report {
        Report {
            possible_keys_32: self.keys,
            possible_tokens_64: self.tokens,
            envelope_messages: self.envelope_messages,
            raw_extractions: self.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::detect_in_hex;

    fn key_candidate(value: &str, packet: usize) -> Candidate {
        Candidate {
            kind: CandidateKind::Key32,
            value: value.to_string(),
            source_packet_index: packet,
            diversity: 16,
        }
    }

    #[test]
    fn candidates_collapse_by_value_across_packets() {
        let value = "000102030405060708090a0b0c0d0e0f";
        let mut agg = Aggregator::new();
        agg.add_candidate(&key_candidate(value, 1));
        agg.add_candidate(&key_candidate(value, 9));
        let report = agg.finish();
        assert_eq!(report.possible_keys_32.len(), 1);
        assert_eq!(report.raw_extractions.len(), 1);
    }

    #[test]
    fn envelope_guesses_keep_packet_order_and_audit_entries() {
        let body: String = (0u8..40).map(|b| format!("{:02x}", b)).collect();
        let hex = format!("2a2a0102{}", body);
        let mut agg = Aggregator::new();
        agg.add_envelope(&detect_in_hex(2, &hex).unwrap());
        agg.add_envelope(&detect_in_hex(5, &hex).unwrap());
        let report = agg.finish();

        let ids: Vec<&str> = report.envelope_messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["packet_2_key", "packet_2_token", "packet_5_key", "packet_5_token"]
        );
        // Same value from different packets stays duplicated in the audit trail.
        assert_eq!(report.raw_extractions.len(), 4);
        for message in &report.envelope_messages {
            assert_eq!(report.raw_extractions.get(&message.id), Some(&message.value));
        }
    }

    #[test]
    fn empty_run_is_a_valid_report() {
        let report = Aggregator::new().finish();
        assert!(report.is_empty());
        let json = report.to_json().unwrap();
        assert!(json.contains("possible_keys_32"));
        assert!(json.contains("raw_extractions"));
    }
}
