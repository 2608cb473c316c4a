//! Pipeline driver: format probe, container selection with binary-to-text
//! fallback, and the per-packet detector/scanner fold.
//!
//! `Start -> FormatProbe -> {BinaryParse | TextParse} -> Aggregate ->
//! Report`, with the single permitted back-edge `BinaryParse(fail) ->
//! TextParse`. The probe is terminal-failing only when the file is missing.

use crate::capture::{BtsnoopReader, HexDumpReader, Packet};
use crate::constants::MIN_PAYLOAD_SIZE;
use crate::error::ExtractError;
use crate::report::{Aggregator, Report};
use crate::{envelope, scanner};
use std::path::Path;
use tracing::{debug, info, warn};

/// Extensions that get a btsnoop attempt before the text fallback.
const BINARY_FIRST_EXTENSIONS: [&str; 2] = ["log", "hci"];

/// Run the whole extraction pipeline over one capture file.
pub fn extract_from_file<P: AsRef<Path>>(path: P) -> Result<Report, ExtractError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExtractError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    if has_binary_first_extension(path) {
        match BtsnoopReader::open(path) {
            Ok(reader) => {
                info!(path = %path.display(), "parsing capture as btsnoop");
                return Ok(run(reader));
            }
            Err(err) if err.is_recoverable() => {
                warn!(%err, "btsnoop parse rejected, falling back to text");
            }
            Err(err) => return Err(err),
        }
    }

    info!(path = %path.display(), "parsing capture as text hex dump");
    let reader = HexDumpReader::open(path)?;
    Ok(run(reader))
}

fn has_binary_first_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            BINARY_FIRST_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Fold every packet of a capture stream into a report.
///
/// Detector and scanner are pure per-packet transformations; the aggregator
/// is the only accumulating state and packets are folded strictly in order,
/// so two runs over one capture produce identical reports.
pub fn run(packets: impl Iterator<Item = Packet>) -> Report {
    let mut aggregator = Aggregator::new();
    let mut packet_count = 0usize;

    for packet in packets {
        packet_count += 1;
        if packet.len() < MIN_PAYLOAD_SIZE {
            continue;
        }
        let payload_hex = packet.hex_string();

        if let Some(envelope) = envelope::detect_in_hex(packet.index, &payload_hex) {
            aggregator.add_envelope(&envelope);
        }
        for candidate in scanner::scan_hex(packet.index, &payload_hex) {
            aggregator.add_candidate(&candidate);
        }
    }

    debug!(packet_count, findings = aggregator.finding_count(), "capture folded");
    let report = aggregator.finish();
    if report.is_empty() {
        info!(packet_count, "no candidates extracted");
    } else {
        info!(
            packet_count,
            keys = report.possible_keys_32.len(),
            tokens = report.possible_tokens_64.len(),
            envelope_messages = report.envelope_messages.len(),
            "extraction complete"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn binary_first_extension_matching_is_case_insensitive() {
        assert!(has_binary_first_extension(Path::new("btsnoop_hci.log")));
        assert!(has_binary_first_extension(Path::new("CAP.HCI")));
        assert!(!has_binary_first_extension(Path::new("dump.txt")));
        assert!(!has_binary_first_extension(Path::new("noextension")));
    }

    #[test]
    fn tiny_payloads_are_skipped_entirely() {
        let packets = vec![Packet::new(1, Bytes::from_static(&[0x2a, 0x2a, 0x01]))];
        let report = run(packets.into_iter());
        assert!(report.is_empty());
    }
}
