//! Container readers: they turn a capture file into an ordered stream of
//! packet payloads and know nothing about what the payloads mean.
//!
//! Two containers are supported: the btsnoop binary format written by
//! Android's HCI snoop log, and free-form text hex dumps (Wireshark export,
//! `hcidump` output, log files with hex side-panels). Both readers are lazy
//! and forward-only; a stream is consumed exactly once.

use crate::constants::{
    BTSNOOP_FILE_HEADER_SIZE, BTSNOOP_MAGIC, BTSNOOP_RECORD_HEADER_SIZE, MIN_LINE_HEX_DIGITS,
};
use crate::error::ExtractError;
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;
use tracing::{debug, trace};

/// One payload lifted out of the capture container.
///
/// `index` is the 1-based position in the capture and is stable across runs;
/// the payload is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub index: usize,
    pub payload: Bytes,
}

impl Packet {
    pub fn new(index: usize, payload: impl Into<Bytes>) -> Self {
        Self {
            index,
            payload: payload.into(),
        }
    }

    /// Lowercase hex encoding of the payload, the form the heuristics run on.
    pub fn hex_string(&self) -> String {
        hex::encode(&self.payload)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Record header fields of one btsnoop record.
///
/// Only `included_length` drives the reader; the rest is carried for
/// completeness and tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub original_length: u32,
    pub included_length: u32,
    pub flags: u32,
    pub cumulative_drops: u32,
    pub timestamp_us: u64,
}

impl RecordHeader {
    fn from_bytes(buf: &[u8; BTSNOOP_RECORD_HEADER_SIZE]) -> Self {
        Self {
            original_length: BigEndian::read_u32(&buf[0..4]),
            included_length: BigEndian::read_u32(&buf[4..8]),
            flags: BigEndian::read_u32(&buf[8..12]),
            cumulative_drops: BigEndian::read_u32(&buf[12..16]),
            timestamp_us: BigEndian::read_u64(&buf[16..24]),
        }
    }
}

/// Streaming reader for btsnoop capture files.
///
/// Construction validates the 16-byte file header; a wrong magic is a
/// recoverable [`ExtractError::Format`] so the caller can retry the file as
/// text. Iteration ends silently on truncation, since captures are routinely
/// stopped mid-write and a partial trailing record is not an error.
pub struct BtsnoopReader {
    reader: BufReader<File>,
    index: usize,
    done: bool,
}

impl BtsnoopReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; BTSNOOP_FILE_HEADER_SIZE];
        reader.read_exact(&mut header).map_err(|_| {
            ExtractError::Format("file shorter than the 16-byte btsnoop header".to_string())
        })?;
        if &header[..BTSNOOP_MAGIC.len()] != BTSNOOP_MAGIC {
            return Err(ExtractError::Format(format!(
                "bad btsnoop magic: {}",
                hex::encode(&header[..BTSNOOP_MAGIC.len()])
            )));
        }
        debug!("valid btsnoop header detected");

        Ok(Self {
            reader,
            index: 0,
            done: false,
        })
    }
}

impl Iterator for BtsnoopReader {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        if self.done {
            return None;
        }

        let mut header_buf = [0u8; BTSNOOP_RECORD_HEADER_SIZE];
        if self.reader.read_exact(&mut header_buf).is_err() {
            // Short record header: end of stream, not an error.
            self.done = true;
            return None;
        }
        let header = RecordHeader::from_bytes(&header_buf);

        let mut payload = vec![0u8; header.included_length as usize];
        if self.reader.read_exact(&mut payload).is_err() {
            // Payload cut off mid-record: drop the partial record and stop.
            self.done = true;
            return None;
        }

        self.index += 1;
        trace!(
            index = self.index,
            len = header.included_length,
            flags = header.flags,
            "btsnoop record"
        );
        Some(Packet::new(self.index, payload))
    }
}

/// Line-oriented reader for text hex dumps.
///
/// Every hex digit on a line is harvested, everything else (offsets, colons,
/// ASCII panels) is ignored. Lines carrying fewer than
/// [`MIN_LINE_HEX_DIGITS`] digits are skipped, as is any line whose digit run
/// fails to decode (odd digit count).
pub struct HexDumpReader<R: BufRead> {
    lines: Lines<R>,
    index: usize,
}

impl HexDumpReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> HexDumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            index: 0,
        }
    }
}

impl<R: BufRead> Iterator for HexDumpReader<R> {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                // Undecodable line (e.g. invalid UTF-8): skip, keep reading.
                Err(_) => continue,
            };

            let digits: String = line
                .chars()
                .filter(|c| c.is_ascii_hexdigit())
                .map(|c| c.to_ascii_lowercase())
                .collect();
            if digits.len() < MIN_LINE_HEX_DIGITS {
                continue;
            }

            match hex::decode(&digits) {
                Ok(payload) => {
                    self.index += 1;
                    trace!(index = self.index, len = payload.len(), "hex dump line");
                    return Some(Packet::new(self.index, payload));
                }
                Err(_) => {
                    // Odd digit count; the line is not a clean byte run.
                    debug!("skipping line with undecodable hex run ({} digits)", digits.len());
                    continue;
                }
            }
        }
    }
}
