//! Seams to the external WalletConnect machinery.
//!
//! The Universal Provider owns session negotiation, relay transport,
//! encryption, timeout and cancellation policy; the modal owns pairing UI.
//! Both are opaque here: the facade only forwards requests and mirrors the
//! session they produce.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::chains::ChainId;
use crate::config::ProviderOptions;
use crate::error::WalletConnectError;
use crate::session::Session;

/// The session/transport handler behind all RPC traffic.
#[async_trait]
pub trait UniversalProvider: Send + Sync + 'static {
    /// The live session, if the provider holds one.
    fn session(&self) -> Option<Session>;

    /// One-shot RPC round trip on the given chain.
    async fn request(
        &self,
        method: &'static str,
        params: Value,
        chain_id: &str,
    ) -> Result<Value, WalletConnectError>;

    /// Pin the chain used for subsequent requests.
    fn set_default_chain(&self, chain_id: &str);
}

/// One-time provider initialization, consumed at wallet construction.
#[async_trait]
pub trait ProviderFactory: Send + 'static {
    type Provider: UniversalProvider;

    async fn init(self, options: ProviderOptions) -> Result<Self::Provider, WalletConnectError>;
}

/// Whether the pairing modal is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Open,
    Closed,
}

/// The pairing UI component.
#[async_trait]
pub trait Modal: Send + Sync + 'static {
    /// Show the modal, offering the given chains for negotiation.
    async fn open(&self, chains: &[ChainId]) -> Result<(), WalletConnectError>;

    /// Subscribe to open/close transitions.
    fn subscribe_state(&self) -> watch::Receiver<ModalState>;

    /// Tear down the active session.
    async fn disconnect(&self) -> Result<(), WalletConnectError>;
}
