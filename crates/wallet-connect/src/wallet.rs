//! The stateful facade translating Solana wallet operations into
//! WalletConnect RPC calls.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::chains::{chains_for_network, default_chain_from_session, ChainId};
use crate::config::WalletConnectConfig;
use crate::error::WalletConnectError;
use crate::provider::{Modal, ModalState, ProviderFactory, UniversalProvider};
use crate::rpc::{
    RpcMethod, SignAllTransactionsParams, SignAllTransactionsResult,
    SignAndSendTransactionParams, SignAndSendTransactionResult, SignMessageParams,
    SignMessageResult, SignTransactionParams, SignTransactionResult,
};
use crate::session::{CapabilitySet, Session};
use sol_codec::{Pubkey, Signature, Transaction};

/// Provider lifecycle. Construction always starts initialization, so there
/// is no representable "uninitialized" state. The receiver fires exactly
/// once; after a successful fire the state moves to `Ready` for good.
enum ProviderState<P> {
    Initializing(oneshot::Receiver<Result<Arc<P>, WalletConnectError>>),
    Ready(Arc<P>),
}

/// A wallet driven over WalletConnect.
///
/// Holds the mirrored session state and forwards sign/send operations to
/// the external provider. One session is active at a time. The facade
/// expects one outstanding high-level operation at a time; in particular,
/// at most one `connect` may be in flight — concurrent re-entry is
/// unsupported.
pub struct WalletConnectWallet<P: UniversalProvider, M: Modal> {
    /// Requested network at construction; replaced after each successful
    /// connect by whichever identifier the session actually resolved to.
    network: ChainId,
    provider: ProviderState<P>,
    modal: M,
    session: Option<Session>,
    /// Computed once per adopted session.
    capabilities: CapabilitySet,
    public_key: Option<Pubkey>,
}

impl<P: UniversalProvider, M: Modal> WalletConnectWallet<P, M> {
    /// Validate the configuration and kick off provider initialization in
    /// the background. Must be called within a tokio runtime.
    ///
    /// Fails immediately with `InvalidConfig` when the project ID is
    /// missing.
    pub fn new<F>(
        config: WalletConnectConfig,
        factory: F,
        modal: M,
    ) -> Result<Self, WalletConnectError>
    where
        F: ProviderFactory<Provider = P>,
    {
        config.validate()?;

        let (init_tx, init_rx) = oneshot::channel();
        let options = config.options.clone();
        tokio::spawn(async move {
            let result = factory.init(options).await.map(Arc::new);
            // The wallet may have been dropped before init finished.
            let _ = init_tx.send(result);
        });

        Ok(WalletConnectWallet {
            network: config.network,
            provider: ProviderState::Initializing(init_rx),
            modal,
            session: None,
            capabilities: CapabilitySet::default(),
            public_key: None,
        })
    }

    // -- accessors ----------------------------------------------------------

    /// The initialized provider.
    pub fn client(&self) -> Result<&Arc<P>, WalletConnectError> {
        match &self.provider {
            ProviderState::Ready(provider) => Ok(provider),
            ProviderState::Initializing(_) => Err(WalletConnectError::NotInitialized),
        }
    }

    /// The active session.
    pub fn session(&self) -> Result<&Session, WalletConnectError> {
        self.session.as_ref().ok_or(WalletConnectError::NotInitialized)
    }

    /// The connected account's public key.
    pub fn public_key(&self) -> Result<Pubkey, WalletConnectError> {
        self.public_key.ok_or(WalletConnectError::NotInitialized)
    }

    /// The chain identifier in effect: the requested one until connect,
    /// then whichever the session resolved to.
    pub fn network(&self) -> ChainId {
        self.network
    }

    // -- lifecycle ----------------------------------------------------------

    /// Establish a session and return the connected public key.
    ///
    /// Suspends until provider initialization completes, then adopts the
    /// provider's existing session if it already holds one. Otherwise opens
    /// the modal with the `{current, deprecated}` chain pair and waits for
    /// it to close; a close without a resulting session is
    /// `ConnectionFailed`.
    pub async fn connect(&mut self) -> Result<Pubkey, WalletConnectError> {
        let provider = self.ensure_provider().await?;

        let session = match provider.session() {
            Some(session) => session,
            None => {
                let chains = chains_for_network(self.network);
                self.modal.open(&chains).await?;

                let mut state = self.modal.subscribe_state();
                while *state.borrow_and_update() != ModalState::Closed {
                    state
                        .changed()
                        .await
                        .map_err(|_| WalletConnectError::ConnectionFailed)?;
                }

                provider
                    .session()
                    .ok_or(WalletConnectError::ConnectionFailed)?
            }
        };

        self.adopt_session(&provider, session)
    }

    /// Tear down the active session. `NotInitialized` when there is none.
    pub async fn disconnect(&mut self) -> Result<(), WalletConnectError> {
        if self.session.is_none() {
            return Err(WalletConnectError::NotInitialized);
        }

        self.modal.disconnect().await?;

        self.session = None;
        self.capabilities = CapabilitySet::default();
        self.public_key = None;
        log::debug!("session cleared");

        Ok(())
    }

    // -- signing ------------------------------------------------------------

    /// Sign a transaction through the remote wallet.
    ///
    /// A serialized transaction in the response wins; otherwise the raw
    /// signature is attached to the original transaction at the connected
    /// account's slot.
    pub async fn sign_transaction(
        &self,
        tx: Transaction,
    ) -> Result<Transaction, WalletConnectError> {
        let provider = self.connected()?;
        self.require(RpcMethod::SignTransaction)?;

        let params = SignTransactionParams::from_transaction(&tx)?;
        let result: SignTransactionResult = self
            .request(&provider, RpcMethod::SignTransaction, &params)
            .await?;

        if let Some(encoded) = result.transaction {
            return Ok(Transaction::from_base64(&encoded)?);
        }

        let signature = result.signature.ok_or_else(|| {
            WalletConnectError::Rpc(
                "sign response carried neither transaction nor signature".into(),
            )
        })?;
        let signature: Signature = signature.parse()?;

        let mut tx = tx;
        tx.attach_signature(&self.public_key()?, signature)?;
        Ok(tx)
    }

    /// Sign raw message bytes; returns the raw signature.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletConnectError> {
        let provider = self.connected()?;
        self.require(RpcMethod::SignMessage)?;

        let params = SignMessageParams {
            pubkey: self.public_key()?.to_string(),
            message: bs58::encode(message).into_string(),
        };
        let result: SignMessageResult = self
            .request(&provider, RpcMethod::SignMessage, &params)
            .await?;

        Ok(result.signature.parse()?)
    }

    /// Sign and submit a transaction; returns the network signature string
    /// verbatim, with no local validation.
    pub async fn sign_and_send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<String, WalletConnectError> {
        let provider = self.connected()?;
        self.require(RpcMethod::SignAndSendTransaction)?;

        let params = SignAndSendTransactionParams {
            transaction: tx.to_base64_unsigned(),
        };
        let result: SignAndSendTransactionResult = self
            .request(&provider, RpcMethod::SignAndSendTransaction, &params)
            .await?;

        Ok(result.signature)
    }

    /// Sign a batch of transactions, preserving input order.
    ///
    /// Wallets without batch support fall back to sequential
    /// single-transaction signing; that is the only error recovered here,
    /// everything else propagates.
    pub async fn sign_all_transactions(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletConnectError> {
        match self.sign_all_batch(&txs).await {
            Err(WalletConnectError::MethodNotSupported(_)) => {
                log::debug!(
                    "batch signing unsupported; signing {} transactions sequentially",
                    txs.len()
                );
                let mut signed = Vec::with_capacity(txs.len());
                for tx in txs {
                    signed.push(self.sign_transaction(tx).await?);
                }
                Ok(signed)
            }
            other => other,
        }
    }

    async fn sign_all_batch(
        &self,
        txs: &[Transaction],
    ) -> Result<Vec<Transaction>, WalletConnectError> {
        let provider = self.connected()?;
        self.require(RpcMethod::SignAllTransactions)?;

        let params = SignAllTransactionsParams {
            transactions: txs.iter().map(Transaction::to_base64_unsigned).collect(),
        };
        let result: SignAllTransactionsResult = self
            .request(&provider, RpcMethod::SignAllTransactions, &params)
            .await?;

        if result.transactions.len() != txs.len() {
            return Err(WalletConnectError::Rpc(format!(
                "wallet returned {} transactions for {} inputs",
                result.transactions.len(),
                txs.len()
            )));
        }

        result
            .transactions
            .iter()
            .map(|encoded| Ok(Transaction::from_base64(encoded)?))
            .collect()
    }

    // -- internals ----------------------------------------------------------

    /// Await the one-shot init gate if initialization is still pending.
    ///
    /// If initialization failed, the gate is spent and every later call
    /// reports `NotInitialized`.
    async fn ensure_provider(&mut self) -> Result<Arc<P>, WalletConnectError> {
        if let ProviderState::Ready(provider) = &self.provider {
            return Ok(provider.clone());
        }

        let provider = match &mut self.provider {
            ProviderState::Initializing(rx) => {
                rx.await.map_err(|_| WalletConnectError::NotInitialized)??
            }
            ProviderState::Ready(provider) => provider.clone(),
        };

        self.provider = ProviderState::Ready(provider.clone());
        Ok(provider)
    }

    /// Resolve the effective chain, pin it on the provider, and mirror the
    /// session locally.
    fn adopt_session(
        &mut self,
        provider: &P,
        session: Session,
    ) -> Result<Pubkey, WalletConnectError> {
        let chain = default_chain_from_session(&session, self.network);
        provider.set_default_chain(chain.as_str());

        let public_key = session.account_pubkey(chain)?;
        log::debug!("session established on {chain} as {public_key}");

        self.network = chain;
        self.capabilities = session.capabilities();
        self.public_key = Some(public_key);
        self.session = Some(session);

        Ok(public_key)
    }

    fn connected(&self) -> Result<Arc<P>, WalletConnectError> {
        if self.session.is_none() {
            return Err(WalletConnectError::NotInitialized);
        }
        match &self.provider {
            ProviderState::Ready(provider) => Ok(provider.clone()),
            ProviderState::Initializing(_) => Err(WalletConnectError::NotInitialized),
        }
    }

    fn require(&self, method: RpcMethod) -> Result<(), WalletConnectError> {
        if self.capabilities.supports(method) {
            Ok(())
        } else {
            Err(WalletConnectError::MethodNotSupported(method.as_str()))
        }
    }

    async fn request<T, B>(
        &self,
        provider: &P,
        method: RpcMethod,
        params: B,
    ) -> Result<T, WalletConnectError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        log::debug!("sending {method} over {}", self.network);
        let value = provider
            .request(
                method.as_str(),
                serde_json::to_value(params)?,
                self.network.as_str(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
