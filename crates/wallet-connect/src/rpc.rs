//! RPC method tags and payload shapes for the `solana` namespace.
//!
//! Field names follow the WalletConnect JSON wire: camelCase, transaction
//! bytes as base64, pubkeys/messages/signatures as base58. Legacy
//! (unversioned) transactions additionally carry the deprecated
//! `feePayer`/`recentBlockhash`/`instructions` fields some older wallets
//! still parse.

use std::fmt;

use serde::{Deserialize, Serialize};

use sol_codec::{CodecError, Transaction, VersionedMessage};

/// The RPC methods a wallet may advertise for the `solana` namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RpcMethod {
    SignTransaction,
    SignMessage,
    SignAndSendTransaction,
    SignAllTransactions,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 4] = [
        RpcMethod::SignTransaction,
        RpcMethod::SignMessage,
        RpcMethod::SignAndSendTransaction,
        RpcMethod::SignAllTransactions,
    ];

    /// The fixed wire name of the method.
    pub const fn as_str(self) -> &'static str {
        match self {
            RpcMethod::SignTransaction => "solana_signTransaction",
            RpcMethod::SignMessage => "solana_signMessage",
            RpcMethod::SignAndSendTransaction => "solana_signAndSendTransaction",
            RpcMethod::SignAllTransactions => "solana_signAllTransactions",
        }
    }

    /// Map an advertised method string back to its tag. Unknown strings
    /// yield `None` and are ignored by the capability set.
    pub fn from_advertised(s: &str) -> Option<RpcMethod> {
        RpcMethod::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// solana_signTransaction
// ---------------------------------------------------------------------------

/// One account reference of a legacy instruction, spelled out for wallets
/// that predate the serialized `transaction` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// A legacy instruction with base58 program id and data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyInstruction {
    pub program_id: String,
    pub data: String,
    pub keys: Vec<LegacyAccountMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_payer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_blockhash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<LegacyInstruction>>,

    /// Base64 of the signature-stripped wire format.
    pub transaction: String,
}

impl SignTransactionParams {
    /// Build the request payload for a transaction. Versioned transactions
    /// carry only the serialized form; legacy transactions also carry the
    /// deprecated spelled-out fields.
    ///
    /// Fails when a legacy instruction references an account index the
    /// message does not hold. Transactions that came through the wire
    /// decoder are already validated; this guards hand-built ones.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, CodecError> {
        let message = match &tx.message {
            VersionedMessage::V0(_) => {
                return Ok(SignTransactionParams {
                    fee_payer: None,
                    recent_blockhash: None,
                    instructions: None,
                    transaction: tx.to_base64_unsigned(),
                });
            }
            VersionedMessage::Legacy(message) => message,
        };

        let key_at = |index: u8| {
            message
                .account_keys
                .get(index as usize)
                .ok_or(CodecError::AccountIndexOutOfRange(index))
        };

        let fee_payer = message
            .account_keys
            .first()
            .ok_or_else(|| CodecError::InvalidHeader("no account keys".into()))?;

        let instructions = message
            .instructions
            .iter()
            .map(|ix| {
                Ok(LegacyInstruction {
                    program_id: key_at(ix.program_id_index)?.to_string(),
                    data: bs58::encode(&ix.data).into_string(),
                    keys: ix
                        .account_indices
                        .iter()
                        .map(|&index| {
                            Ok(LegacyAccountMeta {
                                pubkey: key_at(index)?.to_string(),
                                is_signer: message.is_signer(index as usize),
                                is_writable: message.is_writable(index as usize),
                            })
                        })
                        .collect::<Result<_, CodecError>>()?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        Ok(SignTransactionParams {
            fee_payer: Some(fee_payer.to_string()),
            recent_blockhash: Some(bs58::encode(&message.recent_blockhash).into_string()),
            instructions: Some(instructions),
            transaction: tx.to_base64_unsigned(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignTransactionResult {
    /// Base58 raw signature, attached locally when no serialized
    /// transaction is returned.
    pub signature: Option<String>,
    /// Base64 of the fully signed transaction, preferred when present.
    pub transaction: Option<String>,
}

// ---------------------------------------------------------------------------
// solana_signMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignMessageParams {
    /// Base58 public key of the signing account.
    pub pubkey: String,
    /// Base58 message bytes.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMessageResult {
    /// Base58 raw signature.
    pub signature: String,
}

// ---------------------------------------------------------------------------
// solana_signAndSendTransaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignAndSendTransactionParams {
    /// Base64 of the signature-stripped wire format.
    pub transaction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignAndSendTransactionResult {
    /// Network transaction signature, passed through verbatim.
    pub signature: String,
}

// ---------------------------------------------------------------------------
// solana_signAllTransactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignAllTransactionsParams {
    pub transactions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignAllTransactionsResult {
    pub transactions: Vec<String>,
}
