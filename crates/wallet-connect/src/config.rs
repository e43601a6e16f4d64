//! Wallet configuration: target network plus provider initialization
//! options, matching the JSON options object WalletConnect clients take.

use serde::{Deserialize, Serialize};

use crate::chains::ChainId;
use crate::error::WalletConnectError;

/// App metadata shown to the wallet during pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub icons: Vec<String>,
}

/// Options forwarded to provider initialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    /// WalletConnect Cloud project ID. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AppMetadata>,
}

/// Immutable wallet configuration: the target network and the provider
/// options. Constructed once; validated at wallet construction.
#[derive(Debug, Clone)]
pub struct WalletConnectConfig {
    pub network: ChainId,
    pub options: ProviderOptions,
}

impl WalletConnectConfig {
    pub fn new(network: ChainId, options: ProviderOptions) -> Self {
        WalletConnectConfig { network, options }
    }

    /// A missing or empty project ID makes the configuration unusable.
    pub fn validate(&self) -> Result<(), WalletConnectError> {
        match self.options.project_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(()),
            _ => Err(WalletConnectError::InvalidConfig(
                "projectId is required".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_accepts_project_id() {
        let config = WalletConnectConfig::new(
            ChainId::Devnet,
            ProviderOptions {
                project_id: Some("abc".into()),
                ..Default::default()
            },
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_project_id() {
        let config = WalletConnectConfig::new(ChainId::Devnet, ProviderOptions::default());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, WalletConnectError::InvalidConfig(_)));
        assert!(err.to_string().contains("projectId"));
    }

    #[test]
    fn validate_rejects_empty_project_id() {
        let config = WalletConnectConfig::new(
            ChainId::Mainnet,
            ProviderOptions {
                project_id: Some(String::new()),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn options_deserialize_from_camel_case_json() {
        let options: ProviderOptions = serde_json::from_value(json!({
            "projectId": "abc",
            "relayUrl": "wss://relay.walletconnect.com",
            "metadata": {
                "name": "demo",
                "description": "demo app",
                "url": "https://example.org",
                "icons": ["https://example.org/icon.png"],
            }
        }))
        .unwrap();

        assert_eq!(options.project_id.as_deref(), Some("abc"));
        assert_eq!(
            options.relay_url.as_deref(),
            Some("wss://relay.walletconnect.com")
        );
        assert_eq!(options.metadata.unwrap().name, "demo");
    }
}
