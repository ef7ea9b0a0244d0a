//! Contracts for the external collaborators the dashboard drives.
//!
//! The wallet, the registry contract, and the FHE relayer are opaque to IP Vault.
//! Concrete implementations live in other crates (see `ipvault-devnet`); the
//! workflows in this crate only speak these traits.

use crate::record::{CiphertextHandle, RecordData};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a collaborator. Only the message is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Snapshot of the wallet connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletStatus {
    pub connected: bool,
    pub address: Option<String>,
}

impl WalletStatus {
    /// Address of the connected account, if any.
    pub fn active_address(&self) -> Option<&str> {
        if self.connected {
            self.address.as_deref()
        } else {
            None
        }
    }
}

/// Transaction accepted by the network but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: String,
    pub block_number: u64,
}

/// Arguments of the registry's create entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordRequest {
    pub id: String,
    pub name: String,
    pub ciphertext: Vec<u8>,
    pub input_proof: Vec<u8>,
    pub public_value1: u64,
    pub public_value2: u64,
    pub description: String,
}

/// Ciphertext plus the proof binding it to a contract and user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    pub ciphertext: Vec<u8>,
    pub proof: Vec<u8>,
}

/// Relayer answer for a public decryption request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptionResult {
    pub clear_values: HashMap<CiphertextHandle, u64>,
    pub abi_encoded_clear_values: Vec<u8>,
    pub decryption_proof: Vec<u8>,
}

/// Read-only view of the registry contract.
#[async_trait]
pub trait RegistryReader: Send + Sync {
    async fn address(&self) -> BackendResult<String>;

    async fn record_ids(&self) -> BackendResult<Vec<String>>;

    async fn record(&self, id: &str) -> BackendResult<RecordData>;

    async fn encrypted_value(&self, id: &str) -> BackendResult<CiphertextHandle>;

    /// Liveness flag exposed by the contract.
    async fn is_available(&self) -> BackendResult<bool>;
}

/// Registry contract bound to the connected account's signer.
#[async_trait]
pub trait RegistryWriter: Send + Sync {
    async fn create_record(&self, request: CreateRecordRequest) -> BackendResult<PendingTx>;

    async fn verify_decryption(
        &self,
        id: &str,
        abi_encoded_clear_values: &[u8],
        decryption_proof: &[u8],
    ) -> BackendResult<PendingTx>;

    async fn wait_for_receipt(&self, tx: &PendingTx) -> BackendResult<TxReceipt>;
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn status(&self) -> WalletStatus;

    /// Ask the wallet to connect; resolves to the selected address.
    async fn connect(&self) -> BackendResult<String>;

    async fn disconnect(&self);

    /// Registry accessor that signs with the connected account.
    async fn signer(&self) -> BackendResult<Arc<dyn RegistryWriter>>;
}

#[async_trait]
pub trait FheClient: Send + Sync {
    fn is_initialized(&self) -> bool;

    /// Load public keys and parameters; done once per session.
    async fn initialize(&self) -> BackendResult<()>;

    async fn encrypt(
        &self,
        contract_address: &str,
        user_address: &str,
        value: u64,
    ) -> BackendResult<EncryptedInput>;

    async fn public_decrypt(&self, handles: &[CiphertextHandle])
        -> BackendResult<DecryptionResult>;
}

/// Bundle of collaborator handles shared by workflows and the UI.
#[derive(Clone)]
pub struct Backends {
    pub wallet: Arc<dyn WalletProvider>,
    pub registry: Arc<dyn RegistryReader>,
    pub fhe: Arc<dyn FheClient>,
}

impl Backends {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        registry: Arc<dyn RegistryReader>,
        fhe: Arc<dyn FheClient>,
    ) -> Self {
        Self {
            wallet,
            registry,
            fhe,
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("wallet", &self.wallet.status())
            .field("fhe_initialized", &self.fhe.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Signer handle that can travel inside UI messages.
#[derive(Clone)]
pub struct SignerHandle(pub Arc<dyn RegistryWriter>);

impl fmt::Debug for SignerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignerHandle(..)")
    }
}
