use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Whitelist file does not exist")]
    Missing,
    #[error("Whitelist read error: {0}")]
    ReadFailure(String),
    #[error("Whitelist parse error: {0}")]
    ParseFailure(String),
    #[error("Whitelist serialization error: {0}")]
    SerializeFailure(String),
    #[error("Whitelist write error: {0}")]
    WriteFailure(String),
}

impl StoreError {
    // True when an existing file could not be turned into a document.
    // A missing file is not a read failure: there is nothing to protect.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, StoreError::ReadFailure(_) | StoreError::ParseFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_a_read_failure() {
        assert!(!StoreError::Missing.is_read_failure());
        assert!(StoreError::ReadFailure("denied".to_string()).is_read_failure());
        assert!(StoreError::ParseFailure("eof".to_string()).is_read_failure());
        assert!(!StoreError::WriteFailure("full".to_string()).is_read_failure());
    }
}
