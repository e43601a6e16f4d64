use thiserror::Error;

use sol_codec::CodecError;

/// WalletConnect facade errors.
///
/// Everything propagates to the caller unmodified; the single internal
/// recovery is `sign_all_transactions` substituting sequential signing for
/// the `MethodNotSupported` case.
#[derive(Debug, Error)]
pub enum WalletConnectError {
    /// Provider or session accessed before being established.
    #[error("wallet not initialized")]
    NotInitialized,

    /// The modal closed without producing a session.
    #[error("connection failed: no session established")]
    ConnectionFailed,

    /// The session's advertised method list omits the requested RPC method.
    #[error("wallet does not support method: {0}")]
    MethodNotSupported(&'static str),

    /// Missing project ID or otherwise unusable configuration. Fatal,
    /// surfaced at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A chain identifier outside the known set. Fatal.
    #[error("unsupported chain id: {0}")]
    UnsupportedChain(String),

    /// The provider returned a malformed or incomplete RPC response.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The external modal failed to open or disconnect.
    #[error("modal error: {0}")]
    Modal(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
