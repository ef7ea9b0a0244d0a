use super::*;
use crate::backend::{
    BackendError, BackendResult, DecryptionResult, EncryptedInput, FheClient, RegistryReader,
    RegistryWriter, TxReceipt, WalletProvider, WalletStatus,
};
use crate::record::{CiphertextHandle, RecordData};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RegistryState {
    records: Vec<(String, RecordData)>,
    broken: HashSet<String>,
    calls: usize,
    created: Vec<CreateRecordRequest>,
    verified: Vec<String>,
    reject_writes_with: Option<String>,
}

#[derive(Clone, Default)]
struct MockRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl MockRegistry {
    fn with_records(records: Vec<(&str, RecordData)>) -> Self {
        let registry = Self::default();
        registry.state.lock().unwrap().records = records
            .into_iter()
            .map(|(id, data)| (id.to_string(), data))
            .collect();
        registry
    }

    fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl RegistryReader for MockRegistry {
    async fn address(&self) -> BackendResult<String> {
        self.state.lock().unwrap().calls += 1;
        Ok("0x00000000000000000000000000000000000000c0".into())
    }

    async fn record_ids(&self) -> BackendResult<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.records.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn record(&self, id: &str) -> BackendResult<RecordData> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.broken.contains(id) {
            return Err(BackendError::new("call revert exception"));
        }
        state
            .records
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| BackendError::new("Business data does not exist"))
    }

    async fn encrypted_value(&self, id: &str) -> BackendResult<CiphertextHandle> {
        self.state.lock().unwrap().calls += 1;
        Ok(CiphertextHandle(format!("0xhandle-{id}")))
    }

    async fn is_available(&self) -> BackendResult<bool> {
        self.state.lock().unwrap().calls += 1;
        Ok(true)
    }
}

#[async_trait]
impl RegistryWriter for MockRegistry {
    async fn create_record(&self, request: CreateRecordRequest) -> BackendResult<PendingTx> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if let Some(message) = state.reject_writes_with.clone() {
            return Err(BackendError::new(message));
        }
        let hash = format!("0xtx-{}", request.id);
        state.created.push(request);
        Ok(PendingTx { hash })
    }

    async fn verify_decryption(
        &self,
        id: &str,
        _abi_encoded_clear_values: &[u8],
        _decryption_proof: &[u8],
    ) -> BackendResult<PendingTx> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if let Some(message) = state.reject_writes_with.clone() {
            return Err(BackendError::new(message));
        }
        state.verified.push(id.to_string());
        Ok(PendingTx {
            hash: format!("0xverify-{id}"),
        })
    }

    async fn wait_for_receipt(&self, tx: &PendingTx) -> BackendResult<TxReceipt> {
        Ok(TxReceipt {
            hash: tx.hash.clone(),
            block_number: 7,
        })
    }
}

struct MockWallet {
    connected: AtomicBool,
    registry: MockRegistry,
    signer_error: Option<String>,
}

impl MockWallet {
    fn new(connected: bool, registry: MockRegistry) -> Self {
        Self {
            connected: AtomicBool::new(connected),
            registry,
            signer_error: None,
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn status(&self) -> WalletStatus {
        let connected = self.connected.load(Ordering::SeqCst);
        WalletStatus {
            connected,
            address: connected.then(|| "0x00000000000000000000000000000000000000aa".to_string()),
        }
    }

    async fn connect(&self) -> BackendResult<String> {
        self.connected.store(true, Ordering::SeqCst);
        Ok("0x00000000000000000000000000000000000000aa".into())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn signer(&self) -> BackendResult<Arc<dyn RegistryWriter>> {
        if let Some(message) = &self.signer_error {
            return Err(BackendError::new(message.clone()));
        }
        Ok(Arc::new(self.registry.clone()))
    }
}

#[derive(Default)]
struct MockFhe {
    initialized: AtomicBool,
    init_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
    clear_value: u64,
}

#[async_trait]
impl FheClient for MockFhe {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn initialize(&self) -> BackendResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn encrypt(
        &self,
        _contract_address: &str,
        _user_address: &str,
        value: u64,
    ) -> BackendResult<EncryptedInput> {
        Ok(EncryptedInput {
            ciphertext: value.to_be_bytes().to_vec(),
            proof: vec![0xaa],
        })
    }

    async fn public_decrypt(
        &self,
        handles: &[CiphertextHandle],
    ) -> BackendResult<DecryptionResult> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        let clear_values: HashMap<CiphertextHandle, u64> = handles
            .iter()
            .map(|handle| (handle.clone(), self.clear_value))
            .collect();
        Ok(DecryptionResult {
            clear_values,
            abi_encoded_clear_values: self.clear_value.to_be_bytes().to_vec(),
            decryption_proof: vec![0xbb],
        })
    }
}

fn record(name: &str, verified: bool, decrypted: &str) -> RecordData {
    RecordData {
        name: name.to_string(),
        public_value1: "10".into(),
        public_value2: "0".into(),
        description: format!("{name} description"),
        creator: "0x00000000000000000000000000000000000000aa".into(),
        timestamp: "1700000000".into(),
        is_verified: verified,
        decrypted_value: decrypted.into(),
    }
}

fn backends(connected: bool, registry: &MockRegistry, fhe: Arc<MockFhe>) -> Backends {
    Backends::new(
        Arc::new(MockWallet::new(connected, registry.clone())),
        Arc::new(registry.clone()),
        fhe,
    )
}

fn initialized_fhe(clear_value: u64) -> Arc<MockFhe> {
    let fhe = MockFhe {
        clear_value,
        ..MockFhe::default()
    };
    fhe.initialized.store(true, Ordering::SeqCst);
    Arc::new(fhe)
}

fn submission() -> RecordSubmission {
    RecordSubmission {
        name: "Patent A".into(),
        value: 42,
        category: Category::Technology,
        description: "desc".into(),
    }
}

#[tokio::test]
async fn load_skips_records_that_fail_to_fetch() {
    let registry = MockRegistry::with_records(vec![
        ("ip-1", record("First", false, "0")),
        ("ip-2", record("Second", false, "0")),
        ("ip-3", record("Third", true, "99")),
    ]);
    registry
        .state
        .lock()
        .unwrap()
        .broken
        .insert("ip-2".to_string());

    let report = load_records(&registry).await.unwrap();
    let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["ip-1", "ip-3"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, "ip-2");
    assert_eq!(report.records[1].decrypted_value, 99);
}

#[tokio::test]
async fn initialize_is_skipped_when_already_initialised() {
    let fhe = MockFhe::default();
    initialize_fhe(&fhe).await.unwrap();
    initialize_fhe(&fhe).await.unwrap();
    assert_eq!(fhe.init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disconnected_submit_never_touches_the_registry() {
    let registry = MockRegistry::default();
    let backends = backends(false, &registry, initialized_fhe(0));

    let err = submit_record(&backends, "0xc0", submission())
        .await
        .unwrap_err();
    assert!(matches!(err, IpvaultError::WalletNotConnected));
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn disconnected_decrypt_never_touches_the_registry() {
    let registry = MockRegistry::with_records(vec![("ip-1", record("First", false, "0"))]);
    let backends = backends(false, &registry, initialized_fhe(0));

    let err = decrypt_record(&backends, "ip-1").await.unwrap_err();
    assert!(matches!(err, IpvaultError::WalletNotConnected));
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn submit_requires_initialised_fhe() {
    let registry = MockRegistry::default();
    let backends = backends(true, &registry, Arc::new(MockFhe::default()));

    let err = submit_record(&backends, "0xc0", submission())
        .await
        .unwrap_err();
    assert!(matches!(err, IpvaultError::FheUninitialized));
    assert!(registry.state.lock().unwrap().created.is_empty());
}

#[tokio::test]
async fn submit_sends_hint_and_category_code() {
    let registry = MockRegistry::default();
    let backends = backends(true, &registry, initialized_fhe(0));

    let submitted = submit_record(&backends, "0xc0", submission()).await.unwrap();
    let receipt = confirm(&submitted.signer, &submitted.tx).await.unwrap();
    assert_eq!(receipt.hash, submitted.tx.hash);

    let state = registry.state.lock().unwrap();
    assert_eq!(state.created.len(), 1);
    let request = &state.created[0];
    assert_eq!(request.id, submitted.id);
    assert!(request.id.starts_with("ip-"));
    assert_eq!(request.name, "Patent A");
    assert_eq!(request.public_value1, 42);
    assert_eq!(request.public_value2, Category::Technology.code());
    assert_eq!(request.ciphertext, 42u64.to_be_bytes().to_vec());
}

#[tokio::test]
async fn user_rejection_is_classified() {
    let registry = MockRegistry::default();
    registry.state.lock().unwrap().reject_writes_with =
        Some("ACTION_REJECTED: user rejected transaction".into());
    let backends = backends(true, &registry, initialized_fhe(0));

    let err = submit_record(&backends, "0xc0", submission())
        .await
        .unwrap_err();
    assert!(matches!(err, IpvaultError::UserRejected));
}

#[tokio::test]
async fn signer_rejection_is_classified_as_cancellation() {
    let registry = MockRegistry::with_records(vec![("ip-1", record("First", false, "0"))]);
    let wallet = MockWallet {
        signer_error: Some("user rejected transaction".into()),
        ..MockWallet::new(true, registry.clone())
    };
    let backends = Backends::new(
        Arc::new(wallet),
        Arc::new(registry.clone()),
        initialized_fhe(0),
    );

    let err = submit_record(&backends, "0xc0", submission())
        .await
        .unwrap_err();
    assert!(matches!(err, IpvaultError::UserRejected));
    assert!(registry.state.lock().unwrap().created.is_empty());

    let err = decrypt_record(&backends, "ip-1").await.unwrap_err();
    assert!(matches!(err, IpvaultError::UserRejected));
    assert!(registry.state.lock().unwrap().verified.is_empty());
}

#[tokio::test]
async fn verified_record_skips_relayer_round_trip() {
    let registry = MockRegistry::with_records(vec![("ip-1", record("First", true, "77"))]);
    let fhe = initialized_fhe(5);
    let backends = backends(true, &registry, fhe.clone());

    let outcome = decrypt_record(&backends, "ip-1").await.unwrap();
    assert_eq!(
        outcome,
        DecryptOutcome::AlreadyOnChain {
            record_id: "ip-1".into(),
            record_name: "First".into(),
            value: 77,
        }
    );
    assert_eq!(fhe.decrypt_calls.load(Ordering::SeqCst), 0);
    assert!(registry.state.lock().unwrap().verified.is_empty());
}

#[tokio::test]
async fn unverified_record_is_decrypted_and_verified() {
    let registry = MockRegistry::with_records(vec![("ip-1", record("First", false, "0"))]);
    let fhe = initialized_fhe(1234);
    let backends = backends(true, &registry, fhe.clone());

    let outcome = decrypt_record(&backends, "ip-1").await.unwrap();
    assert_eq!(outcome.value(), 1234);
    assert_eq!(outcome.record_name(), "First");
    assert!(matches!(outcome, DecryptOutcome::Verified { .. }));
    assert_eq!(fhe.decrypt_calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.state.lock().unwrap().verified, vec!["ip-1"]);
}

#[tokio::test]
async fn already_verified_revert_is_classified() {
    let registry = MockRegistry::with_records(vec![("ip-1", record("First", false, "0"))]);
    registry.state.lock().unwrap().reject_writes_with =
        Some("execution reverted: Data already verified".into());
    let backends = backends(true, &registry, initialized_fhe(3));

    let err = decrypt_record(&backends, "ip-1").await.unwrap_err();
    assert!(matches!(err, IpvaultError::AlreadyVerified));
}
