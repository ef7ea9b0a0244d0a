//! In-memory registry contract.
//!
//! Mirrors the registry's public surface: create a record from an encrypted
//! input, list and fetch records, expose ciphertext handles, and accept a
//! decryption proof exactly once per record.

use crate::codec;
use async_trait::async_trait;
use chrono::Utc;
use ipvault_core::{
    BackendError, BackendResult, CiphertextHandle, CreateRecordRequest, PendingTx, RecordData,
    RegistryReader, RegistryWriter, TxReceipt,
};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const REVERT_ALREADY_EXISTS: &str = "Business data already exists";
pub const REVERT_NOT_FOUND: &str = "Business data does not exist";
pub const REVERT_ALREADY_VERIFIED: &str = "Data already verified";
pub const REVERT_BAD_INPUT_PROOF: &str = "Invalid input proof";
pub const REVERT_BAD_DECRYPTION_PROOF: &str = "Invalid decryption proof";
pub const USER_REJECTED: &str = "user rejected transaction";

fn poisoned<T>(_: T) -> BackendError {
    BackendError::new("devnet state lock poisoned")
}

/// Ciphertexts published by the registry, readable by the relayer.
#[derive(Debug, Clone, Default)]
pub struct CiphertextLedger {
    inner: Arc<Mutex<HashMap<CiphertextHandle, Vec<u8>>>>,
}

impl CiphertextLedger {
    pub fn publish(&self, handle: CiphertextHandle, ciphertext: Vec<u8>) -> BackendResult<()> {
        self.inner.lock().map_err(poisoned)?.insert(handle, ciphertext);
        Ok(())
    }

    pub fn get(&self, handle: &CiphertextHandle) -> BackendResult<Option<Vec<u8>>> {
        Ok(self.inner.lock().map_err(poisoned)?.get(handle).cloned())
    }
}

#[derive(Debug, Clone)]
struct StoredRecord {
    name: String,
    handle: CiphertextHandle,
    public_value1: u64,
    public_value2: u64,
    description: String,
    creator: String,
    timestamp: i64,
    is_verified: bool,
    decrypted_value: u64,
}

impl StoredRecord {
    fn to_data(&self) -> RecordData {
        RecordData {
            name: self.name.clone(),
            public_value1: self.public_value1.to_string(),
            public_value2: self.public_value2.to_string(),
            description: self.description.clone(),
            creator: self.creator.clone(),
            timestamp: self.timestamp.to_string(),
            is_verified: self.is_verified,
            decrypted_value: self.decrypted_value.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct ChainState {
    order: Vec<String>,
    records: HashMap<String, StoredRecord>,
    pending: HashMap<String, u64>,
    block_number: u64,
    nonce: u64,
}

impl ChainState {
    fn mine(&mut self, parts: &[&[u8]]) -> PendingTx {
        self.nonce += 1;
        self.block_number += 1;
        let nonce = self.nonce.to_be_bytes();
        let mut all: Vec<&[u8]> = parts.to_vec();
        all.push(&nonce);
        let hash = codec::tx_hash(&all);
        self.pending.insert(hash.clone(), self.block_number);
        PendingTx { hash }
    }
}

/// Fields of a record inserted directly at genesis.
#[derive(Debug, Clone)]
pub struct SeedRecord {
    pub id: String,
    pub name: String,
    pub ciphertext: Vec<u8>,
    pub public_value1: u64,
    pub public_value2: u64,
    pub description: String,
    pub creator: String,
    /// Clear value already verified on chain, if any.
    pub verified_value: Option<u64>,
}

/// Shared handle to the registry; clones observe the same state.
#[derive(Clone)]
pub struct DevnetChain {
    address: String,
    commitment: [u8; 32],
    confirmation_delay: Duration,
    state: Arc<Mutex<ChainState>>,
    ledger: CiphertextLedger,
    available: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl DevnetChain {
    pub fn new(address: impl Into<String>, commitment: [u8; 32], ledger: CiphertextLedger) -> Self {
        Self {
            address: address.into(),
            commitment,
            confirmation_delay: Duration::ZERO,
            state: Arc::new(Mutex::new(ChainState::default())),
            ledger,
            available: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    pub fn contract_address(&self) -> &str {
        &self.address
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of calls served through [`RegistryReader`] or a signer.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn record_count(&self) -> BackendResult<usize> {
        Ok(self.lock()?.order.len())
    }

    fn lock(&self) -> BackendResult<MutexGuard<'_, ChainState>> {
        self.state.lock().map_err(poisoned)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn seed(&self, record: SeedRecord) -> BackendResult<()> {
        let handle = codec::ciphertext_handle(&record.ciphertext);
        let mut state = self.lock()?;
        if state.records.contains_key(&record.id) {
            return Err(BackendError::new(REVERT_ALREADY_EXISTS));
        }
        self.ledger.publish(handle.clone(), record.ciphertext)?;
        state.order.push(record.id.clone());
        state.records.insert(
            record.id,
            StoredRecord {
                name: record.name,
                handle,
                public_value1: record.public_value1,
                public_value2: record.public_value2,
                description: record.description,
                creator: record.creator,
                timestamp: Utc::now().timestamp(),
                is_verified: record.verified_value.is_some(),
                decrypted_value: record.verified_value.unwrap_or(0),
            },
        );
        Ok(())
    }

    /// Signer bound to `account`. `reject` makes the next write fail as if the
    /// operator declined it.
    pub fn signer(&self, account: impl Into<String>, reject: Arc<AtomicBool>) -> DevnetSigner {
        DevnetSigner {
            chain: self.clone(),
            account: account.into(),
            reject,
        }
    }

    fn create(&self, sender: &str, request: CreateRecordRequest) -> BackendResult<PendingTx> {
        let expected =
            codec::input_proof(&self.commitment, &self.address, sender, &request.ciphertext);
        let mut state = self.lock()?;
        if state.records.contains_key(&request.id) {
            return Err(revert(REVERT_ALREADY_EXISTS));
        }
        if request.input_proof != expected {
            return Err(revert(REVERT_BAD_INPUT_PROOF));
        }

        let handle = codec::ciphertext_handle(&request.ciphertext);
        self.ledger.publish(handle.clone(), request.ciphertext)?;
        let tx = state.mine(&[&b"create"[..], request.id.as_bytes(), sender.as_bytes()]);
        state.order.push(request.id.clone());
        state.records.insert(
            request.id.clone(),
            StoredRecord {
                name: request.name,
                handle,
                public_value1: request.public_value1,
                public_value2: request.public_value2,
                description: request.description,
                creator: sender.to_string(),
                timestamp: Utc::now().timestamp(),
                is_verified: false,
                decrypted_value: 0,
            },
        );
        info!("devnet: record {} created by {sender} ({})", request.id, tx.hash);
        Ok(tx)
    }

    fn verify(&self, id: &str, abi_values: &[u8], proof: &[u8]) -> BackendResult<PendingTx> {
        let mut state = self.lock()?;
        let record = state
            .records
            .get(id)
            .ok_or_else(|| revert(REVERT_NOT_FOUND))?;
        if record.is_verified {
            return Err(revert(REVERT_ALREADY_VERIFIED));
        }
        let expected = codec::decryption_proof(
            &self.commitment,
            std::slice::from_ref(&record.handle),
            abi_values,
        );
        if proof != expected.as_slice() {
            return Err(revert(REVERT_BAD_DECRYPTION_PROOF));
        }
        let value = codec::decode_words(abi_values)
            .and_then(|values| values.first().copied())
            .ok_or_else(|| revert(REVERT_BAD_DECRYPTION_PROOF))?;

        if let Some(record) = state.records.get_mut(id) {
            record.is_verified = true;
            record.decrypted_value = value;
        }
        let tx = state.mine(&[&b"verify"[..], id.as_bytes()]);
        info!("devnet: record {id} verified ({})", tx.hash);
        Ok(tx)
    }

    async fn confirm(&self, tx: &PendingTx) -> BackendResult<TxReceipt> {
        if !self.confirmation_delay.is_zero() {
            tokio::time::sleep(self.confirmation_delay).await;
        }
        let block_number = self
            .lock()?
            .pending
            .remove(&tx.hash)
            .ok_or_else(|| BackendError::new(format!("unknown transaction {}", tx.hash)))?;
        Ok(TxReceipt {
            hash: tx.hash.clone(),
            block_number,
        })
    }
}

fn revert(reason: &str) -> BackendError {
    BackendError::new(format!("execution reverted: {reason}"))
}

#[async_trait]
impl RegistryReader for DevnetChain {
    async fn address(&self) -> BackendResult<String> {
        self.touch();
        Ok(self.address.clone())
    }

    async fn record_ids(&self) -> BackendResult<Vec<String>> {
        self.touch();
        Ok(self.lock()?.order.clone())
    }

    async fn record(&self, id: &str) -> BackendResult<RecordData> {
        self.touch();
        self.lock()?
            .records
            .get(id)
            .map(StoredRecord::to_data)
            .ok_or_else(|| revert(REVERT_NOT_FOUND))
    }

    async fn encrypted_value(&self, id: &str) -> BackendResult<CiphertextHandle> {
        self.touch();
        self.lock()?
            .records
            .get(id)
            .map(|record| record.handle.clone())
            .ok_or_else(|| revert(REVERT_NOT_FOUND))
    }

    async fn is_available(&self) -> BackendResult<bool> {
        self.touch();
        Ok(self.available.load(Ordering::SeqCst))
    }
}

/// Registry accessor signing as one account.
#[derive(Clone)]
pub struct DevnetSigner {
    chain: DevnetChain,
    account: String,
    reject: Arc<AtomicBool>,
}

impl DevnetSigner {
    fn approve(&self) -> BackendResult<()> {
        if self.reject.swap(false, Ordering::SeqCst) {
            debug!("devnet wallet: operator declined signature");
            return Err(BackendError::new(format!("ACTION_REJECTED: {USER_REJECTED}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryWriter for DevnetSigner {
    async fn create_record(&self, request: CreateRecordRequest) -> BackendResult<PendingTx> {
        self.chain.touch();
        self.approve()?;
        self.chain.create(&self.account, request)
    }

    async fn verify_decryption(
        &self,
        id: &str,
        abi_encoded_clear_values: &[u8],
        decryption_proof: &[u8],
    ) -> BackendResult<PendingTx> {
        self.chain.touch();
        self.approve()?;
        self.chain.verify(id, abi_encoded_clear_values, decryption_proof)
    }

    async fn wait_for_receipt(&self, tx: &PendingTx) -> BackendResult<TxReceipt> {
        self.chain.confirm(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhe::DevnetFhe;
    use ipvault_core::FheClient;

    const CONTRACT: &str = "0x00000000000000000000000000000000000000c0";
    const ALICE: &str = "0x00000000000000000000000000000000000000a1";

    async fn setup() -> (DevnetChain, DevnetFhe) {
        let ledger = CiphertextLedger::default();
        let fhe = DevnetFhe::new(ledger.clone());
        fhe.initialize().await.unwrap();
        let chain = DevnetChain::new(CONTRACT, fhe.commitment(), ledger);
        (chain, fhe)
    }

    async fn create(chain: &DevnetChain, fhe: &DevnetFhe, id: &str, value: u64) -> PendingTx {
        let input = fhe.encrypt(CONTRACT, ALICE, value).await.unwrap();
        let signer = chain.signer(ALICE, Arc::new(AtomicBool::new(false)));
        signer
            .create_record(CreateRecordRequest {
                id: id.into(),
                name: "Patent".into(),
                ciphertext: input.ciphertext,
                input_proof: input.proof,
                public_value1: value,
                public_value2: 1,
                description: "desc".into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let (chain, fhe) = setup().await;
        let tx = create(&chain, &fhe, "ip-1", 42).await;
        let signer = chain.signer(ALICE, Arc::new(AtomicBool::new(false)));
        let receipt = signer.wait_for_receipt(&tx).await.unwrap();
        assert_eq!(receipt.block_number, 1);
        assert!(signer.wait_for_receipt(&tx).await.is_err());

        assert_eq!(chain.record_ids().await.unwrap(), vec!["ip-1"]);
        let data = chain.record("ip-1").await.unwrap();
        assert_eq!(data.public_value1, "42");
        assert_eq!(data.public_value2, "1");
        assert_eq!(data.creator, ALICE);
        assert!(!data.is_verified);
    }

    #[tokio::test]
    async fn duplicate_ids_and_forged_proofs_revert() {
        let (chain, fhe) = setup().await;
        create(&chain, &fhe, "ip-1", 1).await;

        let input = fhe.encrypt(CONTRACT, ALICE, 5).await.unwrap();
        let signer = chain.signer(ALICE, Arc::new(AtomicBool::new(false)));
        let request = CreateRecordRequest {
            id: "ip-1".into(),
            name: "dup".into(),
            ciphertext: input.ciphertext.clone(),
            input_proof: input.proof.clone(),
            public_value1: 5,
            public_value2: 0,
            description: String::new(),
        };
        let err = signer.create_record(request.clone()).await.unwrap_err();
        assert!(err.message.contains(REVERT_ALREADY_EXISTS));

        let other = chain.signer(
            "0x00000000000000000000000000000000000000b2",
            Arc::new(AtomicBool::new(false)),
        );
        let err = other
            .create_record(CreateRecordRequest {
                id: "ip-2".into(),
                ..request
            })
            .await
            .unwrap_err();
        assert!(err.message.contains(REVERT_BAD_INPUT_PROOF));
    }

    #[tokio::test]
    async fn verification_is_accepted_once() {
        let (chain, fhe) = setup().await;
        create(&chain, &fhe, "ip-1", 77).await;
        let handle = chain.encrypted_value("ip-1").await.unwrap();
        let decrypted = fhe.public_decrypt(&[handle]).await.unwrap();
        let signer = chain.signer(ALICE, Arc::new(AtomicBool::new(false)));

        let forged = signer
            .verify_decryption("ip-1", &codec::encode_words(&[1]), &decrypted.decryption_proof)
            .await
            .unwrap_err();
        assert!(forged.message.contains(REVERT_BAD_DECRYPTION_PROOF));

        signer
            .verify_decryption(
                "ip-1",
                &decrypted.abi_encoded_clear_values,
                &decrypted.decryption_proof,
            )
            .await
            .unwrap();
        let data = chain.record("ip-1").await.unwrap();
        assert!(data.is_verified);
        assert_eq!(data.decrypted_value, "77");

        let again = signer
            .verify_decryption(
                "ip-1",
                &decrypted.abi_encoded_clear_values,
                &decrypted.decryption_proof,
            )
            .await
            .unwrap_err();
        assert!(again.message.contains(REVERT_ALREADY_VERIFIED));
    }

    #[tokio::test]
    async fn rejected_signature_consumes_flag() {
        let (chain, fhe) = setup().await;
        let reject = Arc::new(AtomicBool::new(true));
        let signer = chain.signer(ALICE, reject.clone());
        let input = fhe.encrypt(CONTRACT, ALICE, 3).await.unwrap();
        let request = CreateRecordRequest {
            id: "ip-9".into(),
            name: "n".into(),
            ciphertext: input.ciphertext,
            input_proof: input.proof,
            public_value1: 3,
            public_value2: 0,
            description: String::new(),
        };
        let err = signer.create_record(request.clone()).await.unwrap_err();
        assert!(err.message.contains(USER_REJECTED));
        assert_eq!(chain.record_count().unwrap(), 0);
        assert!(signer.create_record(request).await.is_ok());
    }

    #[tokio::test]
    async fn missing_record_reverts() {
        let (chain, _fhe) = setup().await;
        let err = chain.record("nope").await.unwrap_err();
        assert_eq!(err.message, format!("execution reverted: {REVERT_NOT_FOUND}"));
        chain.set_available(false);
        assert!(!chain.is_available().await.unwrap());
    }
}
