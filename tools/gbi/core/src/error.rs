use thiserror::Error;

/// Failures that abort the traversal of a single frame. Segment tables
/// and anything drawn before the failure are left as they are.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretError {
    #[error("call stack overflow: {capacity} nested calls, next call to {address:#010X}")]
    CallStackOverflow { capacity: usize, address: u32 },

    #[error("malformed display list pointer {logical:#010X} (resolved to {address:#010X})")]
    MalformedSubListPointer { logical: u32, address: u32 },

    #[error("command at {address:#010X} is outside of memory")]
    CommandOutOfBounds { address: u32 },

    #[error("command limit of {limit} exceeded")]
    CommandLimitExceeded { limit: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("write of {len} bytes at {address:#010X} is out of range")]
pub struct OutOfRange {
    pub address: u32,
    pub len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_include_addresses() {
        let err = InterpretError::MalformedSubListPointer { logical: 0x0300_0004, address: 0x1004 };
        assert_eq!(
            err.to_string(),
            "malformed display list pointer 0x03000004 (resolved to 0x00001004)"
        );

        let err = OutOfRange { address: 0x100, len: 8 };
        assert_eq!(err.to_string(), "write of 8 bytes at 0x00000100 is out of range");
    }
}
