//! Vendor envelope detection.
//!
//! The vendor app frames its messages with a two-byte `2A 2A` signature
//! followed by a two-byte opcode pair. Detection runs over the payload's hex
//! encoding rather than the raw bytes so the signature is also found when a
//! capture carries it at an odd nibble offset.

use crate::capture::Packet;
use crate::constants::{
    ENVELOPE_LONG_HEX_LEN, ENVELOPE_PREFIX_HEX_LEN, ENVELOPE_SIGNATURE_HEX, KEY_WIDTH_HEX,
    TOKEN_WIDTH_HEX,
};
use tracing::debug;

/// One detected occurrence of the vendor signature inside a packet payload.
///
/// `key_guess` and `token_guess` are positional guesses: "plausible
/// location", never "validated value". They stay clearly separated from
/// confirmed data all the way to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub packet_index: usize,
    /// Two bytes immediately following the signature, as 4 hex chars.
    pub opcode_pair: String,
    /// Everything after signature and opcodes, as hex.
    pub payload_hex: String,
    /// First 16 bytes of the payload slice, present on long messages only.
    pub key_guess: Option<String>,
    /// Next 16 bytes of the payload slice, present when the slice is >= 32 bytes.
    pub token_guess: Option<String>,
}

impl Envelope {
    /// Whether the message body was long enough to mine for guesses.
    pub fn is_long_message(&self) -> bool {
        self.key_guess.is_some() || self.token_guess.is_some()
    }
}

/// Detect the first vendor envelope in a packet payload, if any.
///
/// Only the first signature occurrence per payload is processed; the vendor
/// app frames one message per write, so later occurrences are assumed to be
/// body bytes, not a second envelope.
pub fn detect(packet: &Packet) -> Option<Envelope> {
    detect_in_hex(packet.index, &packet.hex_string())
}

/// Detection core over an already lowercase hex string.
pub fn detect_in_hex(packet_index: usize, payload_hex: &str) -> Option<Envelope> {
    let start = payload_hex.find(ENVELOPE_SIGNATURE_HEX)?;
    let message = &payload_hex[start..];
    if message.len() < ENVELOPE_PREFIX_HEX_LEN {
        return None;
    }

    let opcode_pair = message[ENVELOPE_SIGNATURE_HEX.len()..ENVELOPE_PREFIX_HEX_LEN].to_string();
    let body = &message[ENVELOPE_PREFIX_HEX_LEN..];

    // Only "long" messages carry enough body to hold key material.
    let (key_guess, token_guess) = if message.len() > ENVELOPE_LONG_HEX_LEN {
        let key = (body.len() >= KEY_WIDTH_HEX).then(|| body[..KEY_WIDTH_HEX].to_string());
        let token =
            (body.len() >= TOKEN_WIDTH_HEX).then(|| body[KEY_WIDTH_HEX..TOKEN_WIDTH_HEX].to_string());
        (key, token)
    } else {
        (None, None)
    };

    debug!(
        packet_index,
        opcodes = %opcode_pair,
        body_hex_len = body.len(),
        "vendor envelope detected"
    );

    Some(Envelope {
        packet_index,
        opcode_pair,
        payload_hex: body.to_string(),
        key_guess,
        token_guess,
    })
}
