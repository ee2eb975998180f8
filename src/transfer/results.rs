//! Transfer descriptors
//!
//! The 299 reply announces a file and its size before any bytes flow.

use std::fmt;

use crate::error::CodecError;

/// A file about to be sent over the data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDescriptor {
    pub name: String,
    pub size: u64,
}

impl TransferDescriptor {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Recovers a descriptor from a 299 reply message.
    ///
    /// Accepts `File <name> size <n> bytes`, and also the same text without
    /// the leading `File`.
    pub fn parse(message: &str) -> Result<Self, CodecError> {
        let invalid = || CodecError::InvalidDescriptor(message.to_string());

        let trimmed = message.trim();
        let rest = trimmed.strip_prefix("File ").unwrap_or(trimmed);
        let rest = rest.strip_suffix(" bytes").ok_or_else(invalid)?;
        let (name, size) = rest.rsplit_once(" size ").ok_or_else(invalid)?;
        let size = size.trim().parse::<u64>().map_err(|_| invalid())?;

        if name.trim().is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(name.trim(), size))
    }
}

impl fmt::Display for TransferDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File {} size {} bytes", self.name, self.size)
    }
}
