//! Base58 newtypes for Solana public keys and signatures.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte Ed25519 public
//! key. There is no hashing step (unlike Bitcoin or Ethereum). Signatures
//! are 64 raw Ed25519 bytes, also carried as Base58 on the WalletConnect
//! wire.

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// A 32-byte Ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Pubkey(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl FromStr for Pubkey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CodecError::InvalidPubkey(format!("base58 decode failed: {e}")))?;

        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CodecError::InvalidPubkey(format!("expected 32 bytes, got {}", v.len()))
        })?;

        Ok(Pubkey(arr))
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Signature(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// The all-zero placeholder that fills unsigned signature slots.
    pub const fn placeholder() -> Self {
        Signature([0u8; 64])
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == [0u8; 64]
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::placeholder()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl FromStr for Signature {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CodecError::InvalidSignature(format!("base58 decode failed: {e}")))?;

        let arr: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            CodecError::InvalidSignature(format!("expected 64 bytes, got {}", v.len()))
        })?;

        Ok(Signature(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program address is 32 zero bytes, which encodes to
    /// "11111111111111111111111111111111" in Base58.
    #[test]
    fn system_program_pubkey() {
        let pk = Pubkey::new([0u8; 32]);
        assert_eq!(pk.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn pubkey_roundtrip() {
        // Known Solana address (the Token Program)
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let pk: Pubkey = address.parse().unwrap();
        assert_eq!(pk.to_string(), address);
    }

    #[test]
    fn pubkey_garbage_fails() {
        assert!("not-a-valid-address!!!".parse::<Pubkey>().is_err());
    }

    #[test]
    fn pubkey_wrong_length_fails() {
        // "1" decodes to a single zero byte, which is not 32 bytes.
        let err = "1".parse::<Pubkey>().unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes"));
    }

    #[test]
    fn signature_roundtrip() {
        let sig = Signature::new([0x5Au8; 64]);
        let parsed: Signature = sig.to_string().parse().unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn signature_wrong_length_fails() {
        // A 32-byte value is a valid pubkey but not a valid signature.
        let s = bs58::encode([1u8; 32]).into_string();
        assert!(s.parse::<Signature>().is_err());
    }

    #[test]
    fn placeholder_signature() {
        assert!(Signature::placeholder().is_placeholder());
        assert!(!Signature::new([1u8; 64]).is_placeholder());
    }
}
