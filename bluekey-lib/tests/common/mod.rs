//! Common test utilities and shared imports

// Allow unused imports since this module is shared across multiple test
// files and not every helper is used in every file.
#[allow(unused_imports)]
pub use bluekey_lib::capture::{BtsnoopReader, HexDumpReader, Packet};
#[allow(unused_imports)]
pub use bluekey_lib::error::ExtractError;
#[allow(unused_imports)]
pub use bluekey_lib::report::Report;
#[allow(unused_imports)]
pub use bluekey_lib::{extract_from_file, pipeline};

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a btsnoop file in memory: valid 16-byte header plus one complete
/// record per payload.
#[allow(dead_code)]
pub fn btsnoop_file(payloads: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"btsnoop\0");
    out.extend_from_slice(&[0u8; 8]); // version + datalink, unused by the reader
    for payload in payloads {
        out.extend_from_slice(&btsnoop_record(payload));
    }
    out
}

/// One 24-byte record header (big-endian) followed by the payload.
#[allow(dead_code)]
pub fn btsnoop_record(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes()); // original_length
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes()); // included_length
    out.extend_from_slice(&0u32.to_be_bytes()); // flags
    out.extend_from_slice(&0u32.to_be_bytes()); // cumulative drops
    out.extend_from_slice(&0u64.to_be_bytes()); // timestamp
    out.extend_from_slice(payload);
    out
}

/// Write capture bytes under a temp dir and return the path alongside the
/// guard keeping the dir alive.
#[allow(dead_code)]
pub fn write_capture(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("write capture fixture");
    (dir, path)
}

/// An envelope payload: `2A 2A` signature, opcodes `01 02`, then `body_len`
/// incrementing bytes.
#[allow(dead_code)]
pub fn envelope_payload(body_len: u8) -> Vec<u8> {
    let mut payload = vec![0x2a, 0x2a, 0x01, 0x02];
    payload.extend(0..body_len);
    payload
}
