/// Magic bytes for an LZO1X-1 frame: "LZO1X\n" followed by 2 null bytes.
pub const MAGIC: &[u8; 8] = b"LZO1X\n\x00\x00";

/// Current frame version.
pub const VERSION: u16 = 1;

/// Fixed size of the frame header in bytes.
///   magic[8] + version:u16 + flags:u16 + raw_len:u64
///   + payload_len:u64 + checksum:u64
///   = 8 + 2 + 2 + 8 + 8 + 8 = 36
pub const HEADER_SIZE: usize = 36;

/// `checksum` holds the xxhash3-64 of the raw (uncompressed) bytes.
pub const FLAG_HAS_CHECKSUM: u16 = 1 << 0;

/// Decoded representation of the 36-byte frame header.
///
/// A frame is the header followed by exactly `payload_len` bytes of one
/// LZO1X-1 stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u16,
    pub flags: u16,
    pub raw_len: u64,
    pub payload_len: u64,
    pub checksum: u64,
}

impl FrameHeader {
    /// Serialize to exactly `HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..8].copy_from_slice(MAGIC);
        buf[8..10].copy_from_slice(&self.version.to_le_bytes());
        buf[10..12].copy_from_slice(&self.flags.to_le_bytes());
        buf[12..20].copy_from_slice(&self.raw_len.to_le_bytes());
        buf[20..28].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[28..36].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize from the start of `buf`, checking magic and version.
    pub fn from_bytes(buf: &[u8]) -> anyhow::Result<Self> {
        if buf.len() < HEADER_SIZE {
            anyhow::bail!(
                "truncated frame: {} bytes, header alone is {}",
                buf.len(),
                HEADER_SIZE
            );
        }
        if &buf[..8] != MAGIC {
            anyhow::bail!("invalid magic bytes: not an LZO1X frame");
        }
        let header = Self {
            version: u16::from_le_bytes(buf[8..10].try_into()?),
            flags: u16::from_le_bytes(buf[10..12].try_into()?),
            raw_len: u64::from_le_bytes(buf[12..20].try_into()?),
            payload_len: u64::from_le_bytes(buf[20..28].try_into()?),
            checksum: u64::from_le_bytes(buf[28..36].try_into()?),
        };
        if header.version != VERSION {
            anyhow::bail!(
                "unsupported frame version {} (only version {} is supported)",
                header.version,
                VERSION
            );
        }
        Ok(header)
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }

    /// Compression ratio (raw / payload).
    pub fn ratio(&self) -> f64 {
        if self.payload_len == 0 {
            return 1.0;
        }
        self.raw_len as f64 / self.payload_len as f64
    }
}
