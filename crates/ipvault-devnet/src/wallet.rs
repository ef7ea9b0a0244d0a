use crate::chain::DevnetChain;
use async_trait::async_trait;
use ipvault_core::{BackendError, BackendResult, RegistryWriter, WalletProvider, WalletStatus};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-account wallet that approves every signature unless told otherwise.
pub struct DevnetWallet {
    address: String,
    chain: DevnetChain,
    connected: AtomicBool,
    reject_next: Arc<AtomicBool>,
    refuse_connect: AtomicBool,
}

impl DevnetWallet {
    pub fn new(address: impl Into<String>, chain: DevnetChain) -> Self {
        Self {
            address: address.into(),
            chain,
            connected: AtomicBool::new(false),
            reject_next: Arc::new(AtomicBool::new(false)),
            refuse_connect: AtomicBool::new(false),
        }
    }

    pub fn account(&self) -> &str {
        &self.address
    }

    /// Decline the next signature request.
    pub fn reject_next_signature(&self) {
        self.reject_next.store(true, Ordering::SeqCst);
    }

    /// Decline every connection request until cleared.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connect.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for DevnetWallet {
    fn status(&self) -> WalletStatus {
        let connected = self.connected.load(Ordering::SeqCst);
        WalletStatus {
            connected,
            address: connected.then(|| self.address.clone()),
        }
    }

    async fn connect(&self) -> BackendResult<String> {
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(BackendError::new("user rejected the request"));
        }
        self.connected.store(true, Ordering::SeqCst);
        info!("devnet wallet connected as {}", self.address);
        Ok(self.address.clone())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn signer(&self) -> BackendResult<Arc<dyn RegistryWriter>> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(BackendError::new("wallet is not connected"));
        }
        Ok(Arc::new(
            self.chain.signer(self.address.clone(), self.reject_next.clone()),
        ))
    }
}
