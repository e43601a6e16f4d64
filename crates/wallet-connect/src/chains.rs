//! CAIP-style Solana chain identifiers and the compatibility shim between
//! the current and deprecated forms.
//!
//! WalletConnect identifies a Solana network by `solana:` plus a prefix of
//! the network's genesis hash. The prefix length changed at one point, so
//! each network has a current and a deprecated identifier and wallets in the
//! wild advertise either. Session negotiation therefore offers both forms,
//! and after a session is established the concrete identifier for RPC calls
//! is picked from whatever the wallet actually advertises.

use std::fmt;
use std::str::FromStr;

use crate::error::WalletConnectError;
use crate::session::Session;

/// The two Solana networks this adapter knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolanaNetwork {
    Mainnet,
    Devnet,
}

/// One of the four known chain identifiers (mainnet/devnet, current and
/// deprecated genesis-hash prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainId {
    Mainnet,
    DeprecatedMainnet,
    Devnet,
    DeprecatedDevnet,
}

impl ChainId {
    pub const fn as_str(self) -> &'static str {
        match self {
            ChainId::Mainnet => "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
            ChainId::DeprecatedMainnet => "solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ",
            ChainId::Devnet => "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
            ChainId::DeprecatedDevnet => "solana:8E9rvCKLFQia2Y35HXjjpWzj8weVo44K",
        }
    }

    pub const fn network(self) -> SolanaNetwork {
        match self {
            ChainId::Mainnet | ChainId::DeprecatedMainnet => SolanaNetwork::Mainnet,
            ChainId::Devnet | ChainId::DeprecatedDevnet => SolanaNetwork::Devnet,
        }
    }

    pub const fn is_deprecated(self) -> bool {
        matches!(self, ChainId::DeprecatedMainnet | ChainId::DeprecatedDevnet)
    }

    /// The current identifier for a network.
    pub const fn current(network: SolanaNetwork) -> ChainId {
        match network {
            SolanaNetwork::Mainnet => ChainId::Mainnet,
            SolanaNetwork::Devnet => ChainId::Devnet,
        }
    }

    /// The deprecated identifier for a network.
    pub const fn deprecated(network: SolanaNetwork) -> ChainId {
        match network {
            SolanaNetwork::Mainnet => ChainId::DeprecatedMainnet,
            SolanaNetwork::Devnet => ChainId::DeprecatedDevnet,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = WalletConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp" => Ok(ChainId::Mainnet),
            "solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ" => Ok(ChainId::DeprecatedMainnet),
            "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1" => Ok(ChainId::Devnet),
            "solana:8E9rvCKLFQia2Y35HXjjpWzj8weVo44K" => Ok(ChainId::DeprecatedDevnet),
            other => Err(WalletConnectError::UnsupportedChain(other.to_string())),
        }
    }
}

/// The `{current, deprecated}` identifier pair to offer during session
/// negotiation for the requested identifier's network, in that order.
pub fn chains_for_network(requested: ChainId) -> [ChainId; 2] {
    if requested.is_deprecated() {
        log::warn!(
            "deprecated chain id {requested} requested; prefer {}",
            ChainId::current(requested.network())
        );
    }
    let network = requested.network();
    [ChainId::current(network), ChainId::deprecated(network)]
}

/// Pick the concrete identifier for RPC calls on an established session:
/// the requested identifier if the session's accounts advertise it,
/// otherwise the deprecated identifier for that network.
pub fn default_chain_from_session(session: &Session, requested: ChainId) -> ChainId {
    if session.advertises_chain(requested.as_str()) {
        return requested;
    }
    let fallback = ChainId::deprecated(requested.network());
    log::warn!(
        "session does not advertise {requested}; falling back to {fallback} \
         (the wallet should upgrade to the current chain id)"
    );
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::session_with_account;

    #[test]
    fn pair_expansion_mainnet() {
        for requested in [ChainId::Mainnet, ChainId::DeprecatedMainnet] {
            assert_eq!(
                chains_for_network(requested),
                [ChainId::Mainnet, ChainId::DeprecatedMainnet]
            );
        }
    }

    #[test]
    fn pair_expansion_devnet() {
        for requested in [ChainId::Devnet, ChainId::DeprecatedDevnet] {
            assert_eq!(
                chains_for_network(requested),
                [ChainId::Devnet, ChainId::DeprecatedDevnet]
            );
        }
    }

    #[test]
    fn pair_order_is_current_then_deprecated() {
        let [current, deprecated] = chains_for_network(ChainId::Devnet);
        assert!(!current.is_deprecated());
        assert!(deprecated.is_deprecated());
        assert_eq!(current.network(), deprecated.network());
    }

    #[test]
    fn from_str_all_known_ids() {
        for id in [
            ChainId::Mainnet,
            ChainId::DeprecatedMainnet,
            ChainId::Devnet,
            ChainId::DeprecatedDevnet,
        ] {
            assert_eq!(id.as_str().parse::<ChainId>().unwrap(), id);
        }
    }

    #[test]
    fn from_str_unknown_id_fails() {
        let err = "eip155:1".parse::<ChainId>().unwrap_err();
        assert!(matches!(err, WalletConnectError::UnsupportedChain(_)));
        assert!(err.to_string().contains("eip155:1"));
    }

    #[test]
    fn default_chain_prefers_exact_match() {
        let session = session_with_account(ChainId::Mainnet.as_str(), &[]);
        assert_eq!(
            default_chain_from_session(&session, ChainId::Mainnet),
            ChainId::Mainnet
        );
    }

    #[test]
    fn default_chain_falls_back_to_deprecated() {
        let session = session_with_account(ChainId::DeprecatedMainnet.as_str(), &[]);
        assert_eq!(
            default_chain_from_session(&session, ChainId::Mainnet),
            ChainId::DeprecatedMainnet
        );
    }

    #[test]
    fn default_chain_devnet_fallback() {
        let session = session_with_account(ChainId::DeprecatedDevnet.as_str(), &[]);
        assert_eq!(
            default_chain_from_session(&session, ChainId::Devnet),
            ChainId::DeprecatedDevnet
        );
    }

    #[test]
    fn deprecated_request_matching_session_sticks() {
        let session = session_with_account(ChainId::DeprecatedDevnet.as_str(), &[]);
        assert_eq!(
            default_chain_from_session(&session, ChainId::DeprecatedDevnet),
            ChainId::DeprecatedDevnet
        );
    }
}
