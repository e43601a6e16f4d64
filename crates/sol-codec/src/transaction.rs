//! Solana transaction wire format, both directions.
//!
//! The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     version prefix        (v0 only: 0x80 | version)
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!     lookups[]             (v0 only: compact-u16 count, then entries)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//!
//! Address table lookup:
//!   account_key             32 bytes
//!   writable_indexes        compact-u16 len, then u8 * len
//!   readonly_indexes        compact-u16 len, then u8 * len
//! ```
//!
//! Legacy messages start with the signature-count header byte, which is
//! always < 0x80; versioned messages set the top bit of their first byte.
//! The format is therefore self-describing and a single decoder handles
//! both variants.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::CodecError;
use crate::pubkey::{Pubkey, Signature};

/// Top bit of the first message byte marks a versioned message.
pub const MESSAGE_VERSION_PREFIX: u8 = 0x80;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated,
/// the encoding runs past three bytes, or the value exceeds `u16::MAX`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), CodecError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        if consumed >= data.len() {
            return Err(CodecError::UnexpectedEof(consumed));
        }
        let byte = data[consumed];
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }
        // A third byte can contribute at most two bits; a continuation bit
        // there would push the value past u16 range.
        if consumed >= 3 {
            return Err(CodecError::CompactU16Overflow);
        }
    }

    if value > u16::MAX as u32 {
        return Err(CodecError::CompactU16Overflow);
    }

    Ok((value as u16, consumed))
}

// ---------------------------------------------------------------------------
// Byte cursor
// ---------------------------------------------------------------------------

/// Positioned reader over a wire-format byte slice.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn peek_u8(&self) -> Result<u8, CodecError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(CodecError::UnexpectedEof(self.pos))
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(CodecError::UnexpectedEof(self.pos))?;
        if end > self.data.len() {
            return Err(CodecError::UnexpectedEof(self.data.len()));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_compact_u16(&mut self) -> Result<u16, CodecError> {
        let (value, consumed) = decode_compact_u16(&self.data[self.pos..]).map_err(|e| match e {
            CodecError::UnexpectedEof(n) => CodecError::UnexpectedEof(self.pos + n),
            other => other,
        })?;
        self.pos += consumed;
        Ok(value)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let slice = self.read_bytes(N)?;
        // read_bytes guarantees the length.
        let mut arr = [0u8; N];
        arr.copy_from_slice(slice);
        Ok(arr)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// The three-byte message header describing signer/writable layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,
}

/// A compiled instruction where account references are replaced by u8
/// indices into the message's account keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A legacy (pre-versioning) transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// All account keys referenced by this message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Whether the account at `index` must sign the transaction.
    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    /// Whether the account at `index` is writable, per the header layout.
    ///
    /// A header whose read-only counts exceed the accounts they apply to
    /// classifies those accounts as read-only rather than panicking.
    pub fn is_writable(&self, index: usize) -> bool {
        let signers = self.header.num_required_signatures as usize;
        if index < signers {
            index < signers.saturating_sub(self.header.num_readonly_signed as usize)
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(self.header.num_readonly_unsigned as usize)
        }
    }
}

/// A v0 address table lookup: extra accounts loaded from an on-chain table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTableLookup {
    pub account_key: Pubkey,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

/// A v0 transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageV0 {
    pub header: MessageHeader,
    /// Static account keys; table-loaded accounts follow at runtime.
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
    pub address_table_lookups: Vec<AddressTableLookup>,
}

/// Either message variant, distinguished on the wire by the version prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedMessage {
    Legacy(Message),
    V0(MessageV0),
}

impl VersionedMessage {
    pub fn header(&self) -> &MessageHeader {
        match self {
            VersionedMessage::Legacy(m) => &m.header,
            VersionedMessage::V0(m) => &m.header,
        }
    }

    /// The account keys carried in the message itself (excluding any
    /// table-loaded accounts). Signers are always static keys.
    pub fn static_account_keys(&self) -> &[Pubkey] {
        match self {
            VersionedMessage::Legacy(m) => &m.account_keys,
            VersionedMessage::V0(m) => &m.account_keys,
        }
    }

    pub fn recent_blockhash(&self) -> &[u8; 32] {
        match self {
            VersionedMessage::Legacy(m) => &m.recent_blockhash,
            VersionedMessage::V0(m) => &m.recent_blockhash,
        }
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        match self {
            VersionedMessage::Legacy(m) => &m.instructions,
            VersionedMessage::V0(m) => &m.instructions,
        }
    }

    /// Serialize the message bytes (the portion of the wire format that
    /// gets signed).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);

        match self {
            VersionedMessage::Legacy(m) => {
                serialize_message_common(
                    &mut buf,
                    &m.header,
                    &m.account_keys,
                    &m.recent_blockhash,
                    &m.instructions,
                );
            }
            VersionedMessage::V0(m) => {
                buf.push(MESSAGE_VERSION_PREFIX); // version 0
                serialize_message_common(
                    &mut buf,
                    &m.header,
                    &m.account_keys,
                    &m.recent_blockhash,
                    &m.instructions,
                );
                buf.extend_from_slice(&encode_compact_u16(m.address_table_lookups.len() as u16));
                for lookup in &m.address_table_lookups {
                    buf.extend_from_slice(lookup.account_key.as_bytes());
                    buf.extend_from_slice(&encode_compact_u16(lookup.writable_indexes.len() as u16));
                    buf.extend_from_slice(&lookup.writable_indexes);
                    buf.extend_from_slice(&encode_compact_u16(lookup.readonly_indexes.len() as u16));
                    buf.extend_from_slice(&lookup.readonly_indexes);
                }
            }
        }

        buf
    }

    /// Total number of addressable accounts: static keys plus, for v0,
    /// table-loaded accounts.
    fn addressable_accounts(&self) -> usize {
        let loaded = match self {
            VersionedMessage::Legacy(_) => 0,
            VersionedMessage::V0(m) => m
                .address_table_lookups
                .iter()
                .map(|l| l.writable_indexes.len() + l.readonly_indexes.len())
                .sum(),
        };
        self.static_account_keys().len() + loaded
    }

    /// Check that the header counts fit the account keys and that every
    /// instruction index resolves to an account.
    ///
    /// Program ids must be static keys; instruction account indices may
    /// additionally reach into table-loaded accounts on v0 messages.
    pub fn validate(&self) -> Result<(), CodecError> {
        let header = self.header();
        let num_static = self.static_account_keys().len();
        let signers = header.num_required_signatures as usize;

        if signers > num_static {
            return Err(CodecError::InvalidHeader(format!(
                "{signers} required signatures but {num_static} account keys"
            )));
        }
        if header.num_readonly_signed as usize > signers {
            return Err(CodecError::InvalidHeader(format!(
                "{} read-only signers but {signers} signers",
                header.num_readonly_signed
            )));
        }
        if header.num_readonly_unsigned as usize > num_static - signers {
            return Err(CodecError::InvalidHeader(format!(
                "{} read-only non-signers but {} non-signer keys",
                header.num_readonly_unsigned,
                num_static - signers
            )));
        }

        let addressable = self.addressable_accounts();
        for ix in self.instructions() {
            if ix.program_id_index as usize >= num_static {
                return Err(CodecError::AccountIndexOutOfRange(ix.program_id_index));
            }
            for &index in &ix.account_indices {
                if index as usize >= addressable {
                    return Err(CodecError::AccountIndexOutOfRange(index));
                }
            }
        }

        Ok(())
    }

    fn deserialize(cursor: &mut Cursor<'_>) -> Result<Self, CodecError> {
        let first = cursor.peek_u8()?;

        let message = if first & MESSAGE_VERSION_PREFIX == 0 {
            let (header, account_keys, recent_blockhash, instructions) =
                deserialize_message_common(cursor)?;
            VersionedMessage::Legacy(Message {
                header,
                account_keys,
                recent_blockhash,
                instructions,
            })
        } else {
            let version = cursor.read_u8()? & !MESSAGE_VERSION_PREFIX;
            if version != 0 {
                return Err(CodecError::UnsupportedVersion(version));
            }

            let (header, account_keys, recent_blockhash, instructions) =
                deserialize_message_common(cursor)?;

            let num_lookups = cursor.read_compact_u16()?;
            let mut address_table_lookups = Vec::with_capacity(num_lookups as usize);
            for _ in 0..num_lookups {
                let account_key = Pubkey::new(cursor.read_array::<32>()?);
                let writable_len = cursor.read_compact_u16()?;
                let writable_indexes = cursor.read_bytes(writable_len as usize)?.to_vec();
                let readonly_len = cursor.read_compact_u16()?;
                let readonly_indexes = cursor.read_bytes(readonly_len as usize)?.to_vec();
                address_table_lookups.push(AddressTableLookup {
                    account_key,
                    writable_indexes,
                    readonly_indexes,
                });
            }

            VersionedMessage::V0(MessageV0 {
                header,
                account_keys,
                recent_blockhash,
                instructions,
                address_table_lookups,
            })
        };

        message.validate()?;
        Ok(message)
    }
}

fn serialize_message_common(
    buf: &mut Vec<u8>,
    header: &MessageHeader,
    account_keys: &[Pubkey],
    recent_blockhash: &[u8; 32],
    instructions: &[CompiledInstruction],
) {
    // Header: 3 bytes.
    buf.push(header.num_required_signatures);
    buf.push(header.num_readonly_signed);
    buf.push(header.num_readonly_unsigned);

    // Account keys.
    buf.extend_from_slice(&encode_compact_u16(account_keys.len() as u16));
    for key in account_keys {
        buf.extend_from_slice(key.as_bytes());
    }

    // Recent blockhash.
    buf.extend_from_slice(recent_blockhash);

    // Instructions.
    buf.extend_from_slice(&encode_compact_u16(instructions.len() as u16));
    for ix in instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
        buf.extend_from_slice(&ix.data);
    }
}

type MessageParts = (MessageHeader, Vec<Pubkey>, [u8; 32], Vec<CompiledInstruction>);

fn deserialize_message_common(cursor: &mut Cursor<'_>) -> Result<MessageParts, CodecError> {
    let header = MessageHeader {
        num_required_signatures: cursor.read_u8()?,
        num_readonly_signed: cursor.read_u8()?,
        num_readonly_unsigned: cursor.read_u8()?,
    };

    let num_accounts = cursor.read_compact_u16()?;
    let mut account_keys = Vec::with_capacity(num_accounts as usize);
    for _ in 0..num_accounts {
        account_keys.push(Pubkey::new(cursor.read_array::<32>()?));
    }

    let recent_blockhash = cursor.read_array::<32>()?;

    let num_instructions = cursor.read_compact_u16()?;
    let mut instructions = Vec::with_capacity(num_instructions as usize);
    for _ in 0..num_instructions {
        let program_id_index = cursor.read_u8()?;
        let num_indices = cursor.read_compact_u16()?;
        let account_indices = cursor.read_bytes(num_indices as usize)?.to_vec();
        let data_len = cursor.read_compact_u16()?;
        let data = cursor.read_bytes(data_len as usize)?.to_vec();
        instructions.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data,
        });
    }

    Ok((header, account_keys, recent_blockhash, instructions))
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A complete transaction: signature slots plus the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// One slot per required signer, in static-account-key order.
    /// Unfilled slots hold the all-zero placeholder.
    pub signatures: Vec<Signature>,
    pub message: VersionedMessage,
}

impl Transaction {
    /// Build a transaction with placeholder signature slots for every
    /// required signer.
    pub fn new_unsigned(message: VersionedMessage) -> Self {
        let slots = message.header().num_required_signatures as usize;
        Transaction {
            signatures: vec![Signature::placeholder(); slots],
            message,
        }
    }

    /// Whether the message uses the versioned (v0) format.
    pub fn is_versioned(&self) -> bool {
        matches!(self.message, VersionedMessage::V0(_))
    }

    /// The fee payer: the first static account key, if any.
    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.message.static_account_keys().first()
    }

    /// Serialize to wire format with the signatures currently attached.
    pub fn serialize(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let mut wire = Vec::with_capacity(1 + 64 * self.signatures.len() + message.len());

        wire.extend_from_slice(&encode_compact_u16(self.signatures.len() as u16));
        for sig in &self.signatures {
            wire.extend_from_slice(sig.as_bytes());
        }
        wire.extend_from_slice(&message);

        wire
    }

    /// Serialize to wire format with signatures stripped: one all-zero
    /// placeholder per required signer, whatever is currently attached.
    pub fn serialize_unsigned(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let slots = self.message.header().num_required_signatures as usize;
        let mut wire = Vec::with_capacity(1 + 64 * slots + message.len());

        wire.extend_from_slice(&encode_compact_u16(slots as u16));
        for _ in 0..slots {
            wire.extend_from_slice(Signature::placeholder().as_bytes());
        }
        wire.extend_from_slice(&message);

        wire
    }

    /// Parse a wire-format transaction. The entire input must be consumed;
    /// trailing bytes are an error. The decoded message is checked with
    /// [`VersionedMessage::validate`], so header counts and instruction
    /// indices that do not resolve are rejected here rather than surfacing
    /// later as panics.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = Cursor::new(bytes);

        let num_signatures = cursor.read_compact_u16()?;
        let mut signatures = Vec::with_capacity(num_signatures as usize);
        for _ in 0..num_signatures {
            signatures.push(Signature::new(cursor.read_array::<64>()?));
        }

        let message = VersionedMessage::deserialize(&mut cursor)?;

        if !cursor.is_empty() {
            return Err(CodecError::TrailingBytes);
        }

        Ok(Transaction {
            signatures,
            message,
        })
    }

    /// Base64 of the signed wire format.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.serialize())
    }

    /// Base64 of the signature-stripped wire format.
    pub fn to_base64_unsigned(&self) -> String {
        BASE64.encode(self.serialize_unsigned())
    }

    /// Parse a transaction from its base64 wire encoding.
    pub fn from_base64(encoded: &str) -> Result<Self, CodecError> {
        let bytes = BASE64.decode(encoded)?;
        Transaction::deserialize(&bytes)
    }

    /// Write `signature` into the slot belonging to `signer`.
    ///
    /// Fails if `signer` is not among the required signers of the static
    /// account keys. Missing slots are padded with placeholders first, so a
    /// transaction decoded with fewer signatures than signers still accepts
    /// a signature.
    pub fn attach_signature(
        &mut self,
        signer: &Pubkey,
        signature: Signature,
    ) -> Result<(), CodecError> {
        let num_signers = self.message.header().num_required_signatures as usize;
        let slot = self
            .message
            .static_account_keys()
            .iter()
            .take(num_signers)
            .position(|key| key == signer)
            .ok_or_else(|| CodecError::UnknownSigner(signer.to_string()))?;

        if self.signatures.len() < num_signers {
            self.signatures.resize(num_signers, Signature::placeholder());
        }
        self.signatures[slot] = signature;

        Ok(())
    }
}
