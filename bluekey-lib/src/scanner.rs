//! Generic key/token pattern sweep.
//!
//! The fallback net for payloads where the vendor signature is absent or
//! misframed: fixed-width windows slide over the payload hex one byte at a
//! time, and a window survives only if its hex digits are diverse enough to
//! rule out padding and filler runs.

use crate::capture::Packet;
use crate::constants::{
    KEY_DIVERSITY_FLOOR, KEY_WIDTH_HEX, MIN_PAYLOAD_SIZE, TOKEN_DIVERSITY_FLOOR, TOKEN_WIDTH_HEX,
};

/// What shape of secret a candidate looks like. The number is the hex-char
/// width (16 or 32 raw bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Key32,
    Token64,
}

impl CandidateKind {
    pub fn width_hex(&self) -> usize {
        match self {
            CandidateKind::Key32 => KEY_WIDTH_HEX,
            CandidateKind::Token64 => TOKEN_WIDTH_HEX,
        }
    }

    /// Minimum distinct hex digit count a window must exceed. The floor
    /// rises with the width to keep the false-positive rate comparable.
    pub fn diversity_floor(&self) -> usize {
        match self {
            CandidateKind::Key32 => KEY_DIVERSITY_FLOOR,
            CandidateKind::Token64 => TOKEN_DIVERSITY_FLOOR,
        }
    }

    /// Prefix used in synthetic report identifiers.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            CandidateKind::Key32 => "key_32",
            CandidateKind::Token64 => "token_64",
        }
    }
}

/// A heuristically flagged byte run. Provisional by definition: nothing
/// here is cryptographically confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Lowercase hex, exactly `kind.width_hex()` chars.
    pub value: String,
    pub source_packet_index: usize,
    /// Distinct hex digit count; filter input only, never serialized.
    pub diversity: usize,
}

/// Count distinct hex digit values in a lowercase hex string.
pub fn diversity(window: &str) -> usize {
    let mut seen = 0u16;
    for c in window.chars() {
        if let Some(d) = c.to_digit(16) {
            seen |= 1 << d;
        }
    }
    seen.count_ones() as usize
}

/// Run both sweeps over one packet. Payloads under four bytes are noise and
/// are not scanned.
pub fn scan(packet: &Packet) -> Vec<Candidate> {
    if packet.len() < MIN_PAYLOAD_SIZE {
        return Vec::new();
    }
    scan_hex(packet.index, &packet.hex_string())
}

/// Sweep an already hex-encoded payload for key- and token-shaped windows.
pub fn scan_hex(packet_index: usize, payload_hex: &str) -> Vec<Candidate> {
    let mut out = sweep(CandidateKind::Key32, packet_index, payload_hex);
    out.extend(sweep(CandidateKind::Token64, packet_index, payload_hex));
    out
}

/// Slide one fixed-width window across the hex string in 1-byte steps.
///
/// The upper bound is exclusive (`start < len - width`): the final aligned
/// window is never emitted. Callers and tests rely on this matching the
/// behavior of the captures already triaged with the earlier tooling.
fn sweep(kind: CandidateKind, packet_index: usize, payload_hex: &str) -> Vec<Candidate> {
    let width = kind.width_hex();
    let mut out = Vec::new();
    if payload_hex.len() <= width {
        return out;
    }

    let mut start = 0;
    while start < payload_hex.len() - width {
        let window = &payload_hex[start..start + width];
        let distinct = diversity(window);
        if distinct > kind.diversity_floor() {
            out.push(Candidate {
                kind,
                value: window.to_string(),
                source_packet_index: packet_index,
                diversity: distinct,
            });
        }
        start += 2;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diversity_counts_distinct_digits() {
        assert_eq!(diversity("00000000"), 1);
        assert_eq!(diversity("deadbeef"), 6);
        assert_eq!(diversity("0123456789abcdef"), 16);
    }

    #[test]
    fn all_zero_padding_is_rejected() {
        let hex = "00".repeat(40);
        assert!(scan_hex(1, &hex).is_empty());
    }

    #[test]
    fn key_windows_have_fixed_width_and_floor() {
        let hex: String = (0u8..48).map(|b| format!("{:02x}", b)).collect();
        let candidates = scan_hex(1, &hex);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert_eq!(c.value.len(), c.kind.width_hex());
            assert!(c.diversity > c.kind.diversity_floor());
        }
    }

    #[test]
    fn final_aligned_window_is_not_emitted() {
        // Exactly one window would fit flush at the end; the exclusive
        // bound means nothing is emitted at all.
        let hex: String = (0u8..16).map(|b| format!("{:02x}", b)).collect();
        assert_eq!(hex.len(), KEY_WIDTH_HEX);
        assert!(scan_hex(1, &hex).is_empty());
    }
}
