//! The established-session model mirrored from the provider.
//!
//! A session records, per namespace, the accounts the wallet exposes and the
//! RPC methods it supports. Accounts are `<chain>:<address>` strings where
//! the chain part is itself `solana:<genesis-hash-prefix>`, so the address
//! is everything after the last colon.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chains::ChainId;
use crate::error::WalletConnectError;
use crate::rpc::RpcMethod;
use sol_codec::Pubkey;

/// The namespace key under which Solana chains/methods/events are
/// advertised.
pub const SOLANA_NAMESPACE: &str = "solana";

/// Per-namespace session contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionNamespace {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

/// A mirrored WalletConnect session. The provider owns the real thing; the
/// facade holds this copy and clears it on disconnect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub namespaces: BTreeMap<String, SessionNamespace>,
}

impl Session {
    pub fn solana_namespace(&self) -> Option<&SessionNamespace> {
        self.namespaces.get(SOLANA_NAMESPACE)
    }

    /// Whether any solana account sits on the given chain identifier.
    pub fn advertises_chain(&self, chain: &str) -> bool {
        self.solana_namespace()
            .map(|ns| {
                ns.accounts
                    .iter()
                    .any(|account| account_chain(account) == Some(chain))
            })
            .unwrap_or(false)
    }

    /// The capability set advertised for the solana namespace. Unknown
    /// method strings are ignored.
    pub fn capabilities(&self) -> CapabilitySet {
        match self.solana_namespace() {
            Some(ns) => CapabilitySet::from_methods(ns.methods.iter().map(String::as_str)),
            None => CapabilitySet::default(),
        }
    }

    /// The public key of the account on `chain`, falling back to the first
    /// solana account when no account matches exactly.
    pub fn account_pubkey(&self, chain: ChainId) -> Result<Pubkey, WalletConnectError> {
        let ns = self
            .solana_namespace()
            .ok_or(WalletConnectError::ConnectionFailed)?;

        let account = ns
            .accounts
            .iter()
            .find(|account| account_chain(account) == Some(chain.as_str()))
            .or_else(|| ns.accounts.first())
            .ok_or(WalletConnectError::ConnectionFailed)?;

        let address = account
            .rsplit(':')
            .next()
            .ok_or(WalletConnectError::ConnectionFailed)?;

        Ok(address.parse::<Pubkey>()?)
    }
}

/// The chain part of a `<chain>:<address>` account string.
fn account_chain(account: &str) -> Option<&str> {
    account.rsplit_once(':').map(|(chain, _)| chain)
}

/// The set of RPC methods a session's wallet supports, computed once per
/// session and queried by tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    pub fn from_methods<'a>(methods: impl IntoIterator<Item = &'a str>) -> Self {
        let mut bits = 0u8;
        for method in methods {
            if let Some(tag) = RpcMethod::from_advertised(method) {
                bits |= 1 << tag as u8;
            }
        }
        CapabilitySet { bits }
    }

    pub fn supports(self, method: RpcMethod) -> bool {
        self.bits & (1 << method as u8) != 0
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A session with a single solana account on `chain` advertising
    /// `methods`. The account address is the base58 of 32 `0x07` bytes.
    pub(crate) fn session_with_account(chain: &str, methods: &[&str]) -> Session {
        let address = Pubkey::new([7u8; 32]).to_string();
        serde_json::from_value(json!({
            "topic": "f00d",
            "namespaces": {
                "solana": {
                    "accounts": [format!("{chain}:{address}")],
                    "methods": methods,
                    "events": [],
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_walletconnect_session_json() {
        let session = session_with_account(ChainId::Devnet.as_str(), &["solana_signMessage"]);
        assert_eq!(session.topic, "f00d");
        let ns = session.solana_namespace().unwrap();
        assert_eq!(ns.methods, vec!["solana_signMessage"]);
        assert_eq!(ns.accounts.len(), 1);
    }

    #[test]
    fn advertises_chain_matches_exactly() {
        let session = session_with_account(ChainId::Devnet.as_str(), &[]);
        assert!(session.advertises_chain(ChainId::Devnet.as_str()));
        assert!(!session.advertises_chain(ChainId::Mainnet.as_str()));
        // The address suffix must not leak into the chain comparison.
        assert!(!session.advertises_chain("solana"));
    }

    #[test]
    fn capability_set_from_advertised_methods() {
        let caps = CapabilitySet::from_methods([
            "solana_signTransaction",
            "solana_signMessage",
            "solana_getBalance", // unknown, ignored
        ]);
        assert!(caps.supports(RpcMethod::SignTransaction));
        assert!(caps.supports(RpcMethod::SignMessage));
        assert!(!caps.supports(RpcMethod::SignAndSendTransaction));
        assert!(!caps.supports(RpcMethod::SignAllTransactions));
    }

    #[test]
    fn empty_capability_set() {
        let caps = CapabilitySet::default();
        assert!(caps.is_empty());
        for method in RpcMethod::ALL {
            assert!(!caps.supports(method));
        }
    }

    #[test]
    fn session_without_solana_namespace_has_no_capabilities() {
        let session: Session = serde_json::from_value(json!({
            "topic": "t",
            "namespaces": { "eip155": { "accounts": [], "methods": ["eth_sign"] } }
        }))
        .unwrap();
        assert!(session.capabilities().is_empty());
        assert!(session.solana_namespace().is_none());
    }

    #[test]
    fn account_pubkey_for_matching_chain() {
        let session = session_with_account(ChainId::Devnet.as_str(), &[]);
        let pk = session.account_pubkey(ChainId::Devnet).unwrap();
        assert_eq!(pk, Pubkey::new([7u8; 32]));
    }

    #[test]
    fn account_pubkey_falls_back_to_first_account() {
        let session = session_with_account(ChainId::DeprecatedDevnet.as_str(), &[]);
        // No devnet account, but the deprecated-devnet one is still usable.
        let pk = session.account_pubkey(ChainId::Devnet).unwrap();
        assert_eq!(pk, Pubkey::new([7u8; 32]));
    }

    #[test]
    fn account_pubkey_empty_session_fails() {
        let session = Session::default();
        assert!(matches!(
            session.account_pubkey(ChainId::Devnet),
            Err(WalletConnectError::ConnectionFailed)
        ));
    }
}
