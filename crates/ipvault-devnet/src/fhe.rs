//! Toy FHE client and relayer.
//!
//! Values are masked with a SHA-256 keystream derived from a local secret; this
//! stands in for the real scheme so the dashboard can run end to end. It offers
//! no confidentiality guarantees.

use crate::chain::CiphertextLedger;
use crate::codec;
use async_trait::async_trait;
use ipvault_core::{
    BackendError, BackendResult, CiphertextHandle, DecryptionResult, EncryptedInput, FheClient,
};
use log::{debug, info};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use zeroize::Zeroizing;

const NONCE_LEN: usize = 16;
const CIPHERTEXT_LEN: usize = NONCE_LEN + 8;

pub struct DevnetFhe {
    key: Zeroizing<[u8; 32]>,
    commitment: [u8; 32],
    ledger: CiphertextLedger,
    init_delay: Duration,
    initialized: AtomicBool,
    fail_next_init: AtomicBool,
}

impl DevnetFhe {
    /// Fresh relayer with a random secret reading ciphertexts from `ledger`.
    pub fn new(ledger: CiphertextLedger) -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(&mut key[..]);
        Self::with_key(key, ledger)
    }

    pub fn with_key(key: Zeroizing<[u8; 32]>, ledger: CiphertextLedger) -> Self {
        let mut commitment = [0u8; 32];
        commitment.copy_from_slice(&Sha256::digest(&key[..]));
        Self {
            key,
            commitment,
            ledger,
            init_delay: Duration::ZERO,
            initialized: AtomicBool::new(false),
            fail_next_init: AtomicBool::new(false),
        }
    }

    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Public commitment to the secret; the registry checks proofs against it.
    pub fn commitment(&self) -> [u8; 32] {
        self.commitment
    }

    /// Make the next `initialize` call fail once.
    pub fn fail_next_init(&self) {
        self.fail_next_init.store(true, Ordering::SeqCst);
    }

    fn keystream(&self, nonce: &[u8]) -> [u8; 8] {
        let mut hasher = Sha256::new();
        hasher.update(&self.key[..]);
        hasher.update(nonce);
        let digest = hasher.finalize();
        let mut stream = [0u8; 8];
        stream.copy_from_slice(&digest[..8]);
        stream
    }

    /// Encrypt without the session check; used when seeding the registry.
    pub fn seal(&self, value: u64) -> Vec<u8> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        let stream = self.keystream(&nonce);

        let mut out = Vec::with_capacity(CIPHERTEXT_LEN);
        out.extend_from_slice(&nonce);
        out.extend(
            value
                .to_be_bytes()
                .iter()
                .zip(stream.iter())
                .map(|(byte, mask)| byte ^ mask),
        );
        out
    }

    pub fn open(&self, ciphertext: &[u8]) -> BackendResult<u64> {
        if ciphertext.len() != CIPHERTEXT_LEN {
            return Err(BackendError::new(format!(
                "malformed ciphertext: expected {CIPHERTEXT_LEN} bytes, got {}",
                ciphertext.len()
            )));
        }
        let (nonce, body) = ciphertext.split_at(NONCE_LEN);
        let stream = self.keystream(nonce);
        let mut clear = [0u8; 8];
        for (idx, slot) in clear.iter_mut().enumerate() {
            *slot = body[idx] ^ stream[idx];
        }
        Ok(u64::from_be_bytes(clear))
    }

    fn ensure_initialized(&self) -> BackendResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(BackendError::new("FHE instance not initialized"))
        }
    }
}

#[async_trait]
impl FheClient for DevnetFhe {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn initialize(&self) -> BackendResult<()> {
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        if self.fail_next_init.swap(false, Ordering::SeqCst) {
            return Err(BackendError::new("failed to fetch FHE public key"));
        }
        self.initialized.store(true, Ordering::SeqCst);
        info!(
            "devnet relayer ready (key commitment {})",
            hex::encode(&self.commitment[..8])
        );
        Ok(())
    }

    async fn encrypt(
        &self,
        contract_address: &str,
        user_address: &str,
        value: u64,
    ) -> BackendResult<EncryptedInput> {
        self.ensure_initialized()?;
        let ciphertext = self.seal(value);
        let proof = codec::input_proof(&self.commitment, contract_address, user_address, &ciphertext);
        debug!("encrypted value for {user_address} on {contract_address}");
        Ok(EncryptedInput { ciphertext, proof })
    }

    async fn public_decrypt(
        &self,
        handles: &[CiphertextHandle],
    ) -> BackendResult<DecryptionResult> {
        self.ensure_initialized()?;
        if handles.is_empty() {
            return Err(BackendError::new("no handles to decrypt"));
        }

        let mut clear_values = HashMap::with_capacity(handles.len());
        let mut ordered = Vec::with_capacity(handles.len());
        for handle in handles {
            let ciphertext = self
                .ledger
                .get(handle)?
                .ok_or_else(|| BackendError::new(format!("unknown ciphertext handle {handle}")))?;
            let value = self.open(&ciphertext)?;
            clear_values.insert(handle.clone(), value);
            ordered.push(value);
        }

        let abi_encoded_clear_values = codec::encode_words(&ordered);
        let decryption_proof =
            codec::decryption_proof(&self.commitment, handles, &abi_encoded_clear_values);
        Ok(DecryptionResult {
            clear_values,
            abi_encoded_clear_values,
            decryption_proof,
        })
    }
}
