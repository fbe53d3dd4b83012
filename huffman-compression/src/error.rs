use thiserror::Error;

pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Debug, Error)]
pub enum HuffmanError {
    #[error("encoded file corrupted: {0}")]
    CorruptedStream(#[from] Corruption),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single byte value occurs more often than a header counter can hold.
    #[error("input too large: byte 0x{byte:02x} occurs more than {} times", u32::MAX)]
    InputTooLarge { byte: u8 },
}

/// Why an encoded stream was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Corruption {
    #[error("header truncated after {bytes_read} of 1024 bytes")]
    TruncatedHeader { bytes_read: usize },

    #[error("missing last_bits byte")]
    MissingLastBits,

    #[error("last_bits must be in 0..=7, got {0}")]
    InvalidLastBits(u8),

    #[error("bitstream does not follow a path in the code tree")]
    InvalidPath,

    #[error("bitstream ends inside a code")]
    UnfinishedCode,

    #[error("byte 0x{byte:02x} decoded {actual} times, header says {expected}")]
    FrequencyMismatch { byte: u8, expected: u32, actual: u32 },
}

impl HuffmanError {
    pub fn is_corruption(&self) -> bool {
        matches!(self, HuffmanError::CorruptedStream(_))
    }
}
