// Container and heuristic constants for Bluetooth capture key extraction.

/// btsnoop file magic: ASCII "btsnoop" followed by a NUL byte.
pub const BTSNOOP_MAGIC: &[u8; 8] = b"btsnoop\0";

/// Size of the btsnoop file header (magic + version + datalink type).
pub const BTSNOOP_FILE_HEADER_SIZE: usize = 16;

/// Size of each btsnoop record header (5 big-endian fields).
pub const BTSNOOP_RECORD_HEADER_SIZE: usize = 24;

/// Vendor envelope signature as it appears in lowercase payload hex.
pub const ENVELOPE_SIGNATURE_HEX: &str = "2a2a";

/// Hex chars occupied by the signature plus the two opcode bytes.
pub const ENVELOPE_PREFIX_HEX_LEN: usize = 8;

/// An envelope is "long" (worth mining for keys) past this many hex chars.
pub const ENVELOPE_LONG_HEX_LEN: usize = 32;

/// Key candidate width in hex chars (16 bytes).
pub const KEY_WIDTH_HEX: usize = 32;

/// Token candidate width in hex chars (32 bytes).
pub const TOKEN_WIDTH_HEX: usize = 64;

/// A key window must contain more than this many distinct hex digits.
pub const KEY_DIVERSITY_FLOOR: usize = 4;

/// A token window must contain more than this many distinct hex digits.
pub const TOKEN_DIVERSITY_FLOOR: usize = 8;

/// Payloads shorter than this are not worth scanning.
pub const MIN_PAYLOAD_SIZE: usize = 4;

/// A hex-dump line must carry at least this many hex digits to yield a packet.
pub const MIN_LINE_HEX_DIGITS: usize = 8;

/// Default filename the CLI writes the report to.
pub const DEFAULT_REPORT_FILENAME: &str = "extracted_keys.json";
