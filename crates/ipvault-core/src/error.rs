//! Error types shared by every IP Vault crate.

use thiserror::Error;

/// Substring the wallet layer uses when the operator declines a signature request.
pub const USER_REJECTED_MARKER: &str = "user rejected transaction";
/// Substring the registry contract reverts with when a record was already verified.
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

pub type IpvaultResult<T> = Result<T, IpvaultError>;

#[derive(Debug, Error)]
pub enum IpvaultError {
    #[error("wallet is not connected")]
    WalletNotConnected,

    #[error("FHE client has not been initialised")]
    FheUninitialized,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("user rejected transaction")]
    UserRejected,

    #[error("data already verified")]
    AlreadyVerified,

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("fhe client error: {0}")]
    Fhe(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl IpvaultError {
    /// Classify a failure reported by the registry contract or the signer.
    ///
    /// Collaborators only report free-form messages, so cancellation and the
    /// already-verified revert are recognised by substring.
    pub fn from_contract(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains(USER_REJECTED_MARKER) {
            IpvaultError::UserRejected
        } else if lowered.contains(ALREADY_VERIFIED_MARKER) {
            IpvaultError::AlreadyVerified
        } else {
            IpvaultError::Contract(message)
        }
    }

    /// Classify a failure reported by the FHE relayer.
    ///
    /// Encryption can prompt the wallet, so cancellation is recognised here too.
    pub fn from_fhe(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains(USER_REJECTED_MARKER) {
            IpvaultError::UserRejected
        } else if lowered.contains(ALREADY_VERIFIED_MARKER) {
            IpvaultError::AlreadyVerified
        } else {
            IpvaultError::Fhe(message)
        }
    }

    /// Classify a failure reported by the wallet provider.
    pub fn from_wallet(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains(USER_REJECTED_MARKER) {
            IpvaultError::UserRejected
        } else {
            IpvaultError::Wallet(message)
        }
    }

    /// Text shown after "Submission failed:" / "Decryption failed:" prefixes.
    pub fn detail(&self) -> String {
        match self {
            IpvaultError::Contract(message)
            | IpvaultError::Fhe(message)
            | IpvaultError::Wallet(message)
            | IpvaultError::InvalidInput(message) => {
                if message.trim().is_empty() {
                    "unknown error".to_string()
                } else {
                    message.clone()
                }
            }
            other => other.to_string(),
        }
    }
}
