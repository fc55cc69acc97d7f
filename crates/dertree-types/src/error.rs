/// Classification of every failure the decoder and certificate model report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Truncated,
    UnsupportedLength,
    MalformedTag,
    InvalidStringEncoding,
    InvalidTimeFormat,
    InvalidOidEncoding,
    InvalidValue,
    TrailingGarbage,
    NestingTooDeep,
    UnexpectedStructure,
}

/// ASN.1 DER decoding errors.
///
/// Offsets are absolute positions in the buffer handed to the decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated at offset {offset}: need {need} bytes, {available} available")]
    Truncated {
        offset: usize,
        need: usize,
        available: usize,
    },
    #[error("unsupported length encoding at offset {offset}: {reason}")]
    UnsupportedLength { offset: usize, reason: &'static str },
    #[error("malformed tag 0x{byte:02x} at offset {offset}: {reason}")]
    MalformedTag {
        offset: usize,
        byte: u8,
        reason: &'static str,
    },
    #[error("invalid string encoding at offset {offset}: {reason}")]
    InvalidStringEncoding { offset: usize, reason: String },
    #[error("invalid time format at offset {offset}: {reason}")]
    InvalidTimeFormat { offset: usize, reason: String },
    #[error("invalid object identifier encoding at offset {offset}: {reason}")]
    InvalidOidEncoding { offset: usize, reason: &'static str },
    #[error("invalid primitive value at offset {offset}: {reason}")]
    InvalidValue { offset: usize, reason: &'static str },
    #[error("{count} trailing bytes at offset {offset}")]
    TrailingGarbage { offset: usize, count: usize },
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { offset: usize, limit: usize },
}

impl DecodeError {
    /// Return the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Truncated { .. } => ErrorKind::Truncated,
            DecodeError::UnsupportedLength { .. } => ErrorKind::UnsupportedLength,
            DecodeError::MalformedTag { .. } => ErrorKind::MalformedTag,
            DecodeError::InvalidStringEncoding { .. } => ErrorKind::InvalidStringEncoding,
            DecodeError::InvalidTimeFormat { .. } => ErrorKind::InvalidTimeFormat,
            DecodeError::InvalidOidEncoding { .. } => ErrorKind::InvalidOidEncoding,
            DecodeError::InvalidValue { .. } => ErrorKind::InvalidValue,
            DecodeError::TrailingGarbage { .. } => ErrorKind::TrailingGarbage,
            DecodeError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
        }
    }

    /// Return the byte offset the error refers to.
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::Truncated { offset, .. }
            | DecodeError::UnsupportedLength { offset, .. }
            | DecodeError::MalformedTag { offset, .. }
            | DecodeError::InvalidStringEncoding { offset, .. }
            | DecodeError::InvalidTimeFormat { offset, .. }
            | DecodeError::InvalidOidEncoding { offset, .. }
            | DecodeError::InvalidValue { offset, .. }
            | DecodeError::TrailingGarbage { offset, .. }
            | DecodeError::NestingTooDeep { offset, .. } => *offset,
        }
    }

    /// Shift the reported offset by `base`.
    ///
    /// Used when a slice of a larger buffer is decoded on its own.
    pub fn rebase(mut self, base: usize) -> Self {
        match &mut self {
            DecodeError::Truncated { offset, .. }
            | DecodeError::UnsupportedLength { offset, .. }
            | DecodeError::MalformedTag { offset, .. }
            | DecodeError::InvalidStringEncoding { offset, .. }
            | DecodeError::InvalidTimeFormat { offset, .. }
            | DecodeError::InvalidOidEncoding { offset, .. }
            | DecodeError::InvalidValue { offset, .. }
            | DecodeError::TrailingGarbage { offset, .. }
            | DecodeError::NestingTooDeep { offset, .. } => *offset += base,
        }
        self
    }
}

/// PKI certificate errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkiError {
    #[error("asn1 decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("unexpected certificate structure: {0}")]
    UnexpectedStructure(String),
}

impl PkiError {
    /// Return the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PkiError::Decode(e) => e.kind(),
            PkiError::UnexpectedStructure(_) => ErrorKind::UnexpectedStructure,
        }
    }
}
