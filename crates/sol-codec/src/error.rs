use thiserror::Error;

/// Transaction codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid public key: {0}")]
    InvalidPubkey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("unexpected end of data at byte {0}")]
    UnexpectedEof(usize),

    #[error("compact-u16 value overflow")]
    CompactU16Overflow,

    #[error("unsupported message version: {0}")]
    UnsupportedVersion(u8),

    #[error("malformed message header: {0}")]
    InvalidHeader(String),

    #[error("account index out of range: {0}")]
    AccountIndexOutOfRange(u8),

    #[error("trailing bytes after transaction")]
    TrailingBytes,

    #[error("signer not present in transaction: {0}")]
    UnknownSigner(String),

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unexpected_eof() {
        let err = CodecError::UnexpectedEof(17);
        assert_eq!(err.to_string(), "unexpected end of data at byte 17");
    }

    #[test]
    fn display_unknown_signer() {
        let err = CodecError::UnknownSigner("11111111111111111111111111111111".into());
        assert!(err.to_string().contains("11111111111111111111111111111111"));
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CodecError::TrailingBytes);
        assert_eq!(err.to_string(), "trailing bytes after transaction");
    }
}
