use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Truncated message: needed {needed} byte(s) at offset {offset}, buffer is {len} bytes")]
    TruncatedMessage {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("Invalid label at offset {offset}: {reason}")]
    InvalidLabel { offset: usize, reason: &'static str },

    #[error("Compression pointer at offset {offset} does not point backwards")]
    CompressionLoop { offset: usize },

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Expected at most one OPT record in the additional section, found {0}")]
    MultipleOptRecords(u16),

    #[error("Invalid OPT record: {0}")]
    InvalidOptRecord(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn truncated(offset: usize, needed: usize, len: usize) -> Self {
        DomainError::TruncatedMessage {
            offset,
            needed,
            len,
        }
    }

    /// True for errors caused by the contents of a received datagram, as
    /// opposed to local failures such as a send error.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            DomainError::TruncatedMessage { .. }
                | DomainError::InvalidLabel { .. }
                | DomainError::CompressionLoop { .. }
                | DomainError::InvalidDomainName(_)
                | DomainError::MultipleOptRecords(_)
                | DomainError::InvalidOptRecord(_)
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
