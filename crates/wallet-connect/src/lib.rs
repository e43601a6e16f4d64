//! WalletConnect adapter for Solana applications.
//!
//! Lets a Solana-focused application drive wallet operations — connect,
//! sign, send — through the WalletConnect Universal Provider protocol. The
//! relay/session machinery lives behind the [`provider::UniversalProvider`]
//! and [`provider::Modal`] traits; this crate keeps the session bookkeeping,
//! the chain-id compatibility shim, and the translation between Solana
//! transactions and the `solana_*` RPC payloads.

pub mod chains;
pub mod config;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod session;
pub mod wallet;

// Re-export key public types for ergonomic imports.
pub use chains::{chains_for_network, default_chain_from_session, ChainId, SolanaNetwork};
pub use config::{AppMetadata, ProviderOptions, WalletConnectConfig};
pub use error::WalletConnectError;
pub use provider::{Modal, ModalState, ProviderFactory, UniversalProvider};
pub use rpc::RpcMethod;
pub use session::{CapabilitySet, Session, SessionNamespace, SOLANA_NAMESPACE};
pub use wallet::WalletConnectWallet;
