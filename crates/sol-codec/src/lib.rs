//! Solana transaction wire codec.
//!
//! This crate handles the Solana compact binary transaction format in both
//! directions — serialization and parsing, legacy and v0 versioned messages
//! — without pulling in `solana-sdk` (which drags in tokio and 200+
//! transitive dependencies). It holds no keys and performs no signing: the
//! signatures it carries come from a remote wallet.
//!
//! `bs58` handles Base58 for addresses and signatures; `base64` handles the
//! transaction byte encoding used on the WalletConnect wire.

pub mod error;
pub mod pubkey;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use error::CodecError;
pub use pubkey::{Pubkey, Signature};
pub use transaction::{
    decode_compact_u16, encode_compact_u16, AddressTableLookup, CompiledInstruction, Message,
    MessageHeader, MessageV0, Transaction, VersionedMessage, MESSAGE_VERSION_PREFIX,
};
