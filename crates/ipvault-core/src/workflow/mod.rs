//! Async workflows that talk to the wallet, registry contract, and FHE relayer.
//!
//! Each entry point performs one request/response exchange with the
//! collaborators and returns a report; applying the report to dashboard state is
//! left to the caller so the UI can run these on its executor.

use crate::backend::{
    Backends, CreateRecordRequest, FheClient, PendingTx, RegistryReader, SignerHandle, TxReceipt,
};
use crate::error::{IpvaultError, IpvaultResult};
use crate::record::{Category, IpRecord};
use chrono::Utc;
use log::{debug, info, warn};
use rand::Rng;

/// Outcome of a full registry listing.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<IpRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Record id whose fields could not be fetched during a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: String,
    pub reason: String,
}

/// Validated create-form contents ready for encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSubmission {
    pub name: String,
    pub value: u64,
    pub category: Category,
    pub description: String,
}

/// Create transaction accepted by the network, awaiting confirmation.
#[derive(Debug, Clone)]
pub struct SubmittedRecord {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub tx: PendingTx,
    pub signer: SignerHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// The contract had already verified the value; no relayer round-trip happened.
    AlreadyOnChain {
        record_id: String,
        record_name: String,
        value: u64,
    },
    /// The relayer decrypted the value and the contract accepted the proof.
    Verified {
        record_id: String,
        record_name: String,
        value: u64,
        receipt: TxReceipt,
    },
}

impl DecryptOutcome {
    pub fn value(&self) -> u64 {
        match self {
            DecryptOutcome::AlreadyOnChain { value, .. } | DecryptOutcome::Verified { value, .. } => {
                *value
            }
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            DecryptOutcome::AlreadyOnChain { record_id, .. }
            | DecryptOutcome::Verified { record_id, .. } => record_id,
        }
    }

    pub fn record_name(&self) -> &str {
        match self {
            DecryptOutcome::AlreadyOnChain { record_name, .. }
            | DecryptOutcome::Verified { record_name, .. } => record_name,
        }
    }
}

/// Generate a client-side record identifier (`ip-<millis>-<suffix>`).
pub fn new_record_id() -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("ip-{}-{suffix:08x}", Utc::now().timestamp_millis())
}

/// Initialise the FHE client unless it already is.
pub async fn initialize_fhe(fhe: &dyn FheClient) -> IpvaultResult<()> {
    if fhe.is_initialized() {
        debug!("fhe client already initialised; skipping");
        return Ok(());
    }
    fhe.initialize()
        .await
        .map_err(|err| IpvaultError::Fhe(err.message))?;
    info!("fhe client initialised");
    Ok(())
}

pub async fn contract_address(registry: &dyn RegistryReader) -> IpvaultResult<String> {
    registry
        .address()
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))
}

/// List every record known to the registry.
///
/// A failing listing call fails the whole load; a failing per-record fetch is
/// logged and the record skipped.
pub async fn load_records(registry: &dyn RegistryReader) -> IpvaultResult<LoadReport> {
    let ids = registry
        .record_ids()
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))?;

    let mut report = LoadReport {
        records: Vec::with_capacity(ids.len()),
        skipped: Vec::new(),
    };

    for id in ids {
        match registry.record(&id).await {
            Ok(data) => report.records.push(IpRecord::from_chain(&id, data)),
            Err(err) => {
                warn!("skipping record {id}: {}", err.message);
                report.skipped.push(SkippedRecord {
                    id,
                    reason: err.message,
                });
            }
        }
    }

    debug!(
        "loaded {} records ({} skipped)",
        report.records.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Encrypt the IP value and send the create transaction.
///
/// Fails with [`IpvaultError::WalletNotConnected`] before touching any other
/// collaborator when no account is connected.
pub async fn submit_record(
    backends: &Backends,
    contract_address: &str,
    submission: RecordSubmission,
) -> IpvaultResult<SubmittedRecord> {
    let status = backends.wallet.status();
    let creator = status
        .active_address()
        .ok_or(IpvaultError::WalletNotConnected)?
        .to_string();

    if !backends.fhe.is_initialized() {
        return Err(IpvaultError::FheUninitialized);
    }

    let signer = backends
        .wallet
        .signer()
        .await
        .map_err(|err| IpvaultError::from_wallet(err.message))?;

    let encrypted = backends
        .fhe
        .encrypt(contract_address, &creator, submission.value)
        .await
        .map_err(|err| IpvaultError::from_fhe(err.message))?;

    let id = new_record_id();
    let request = CreateRecordRequest {
        id: id.clone(),
        name: submission.name.clone(),
        ciphertext: encrypted.ciphertext,
        input_proof: encrypted.proof,
        public_value1: submission.value,
        public_value2: submission.category.code(),
        description: submission.description,
    };

    let tx = signer
        .create_record(request)
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))?;
    info!("create transaction {} sent for record {id}", tx.hash);

    Ok(SubmittedRecord {
        id,
        name: submission.name,
        creator,
        tx,
        signer: SignerHandle(signer),
    })
}

/// Block until the network confirms `tx`.
pub async fn confirm(signer: &SignerHandle, tx: &PendingTx) -> IpvaultResult<TxReceipt> {
    let receipt = signer
        .0
        .wait_for_receipt(tx)
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))?;
    info!(
        "transaction {} confirmed in block {}",
        receipt.hash, receipt.block_number
    );
    Ok(receipt)
}

/// Reveal the value of record `id`, verifying the decryption on chain if needed.
///
/// The record is fetched once up front; its name labels the outcome in both
/// the already-verified and the fresh-verification branch.
pub async fn decrypt_record(backends: &Backends, id: &str) -> IpvaultResult<DecryptOutcome> {
    if backends.wallet.status().active_address().is_none() {
        return Err(IpvaultError::WalletNotConnected);
    }

    let record = backends
        .registry
        .record(id)
        .await
        .map(|data| IpRecord::from_chain(id, data))
        .map_err(|err| IpvaultError::from_contract(err.message))?;

    if let Some(value) = record.verified_value() {
        debug!("record {id} already verified on chain");
        return Ok(DecryptOutcome::AlreadyOnChain {
            record_id: record.id,
            record_name: record.name,
            value,
        });
    }

    let signer = backends
        .wallet
        .signer()
        .await
        .map_err(|err| IpvaultError::from_wallet(err.message))?;

    let handle = backends
        .registry
        .encrypted_value(id)
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))?;

    let decryption = backends
        .fhe
        .public_decrypt(std::slice::from_ref(&handle))
        .await
        .map_err(|err| IpvaultError::from_fhe(err.message))?;

    let value = *decryption.clear_values.get(&handle).ok_or_else(|| {
        IpvaultError::Fhe(format!("relayer returned no clear value for handle {handle}"))
    })?;

    let tx = signer
        .verify_decryption(
            id,
            &decryption.abi_encoded_clear_values,
            &decryption.decryption_proof,
        )
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))?;
    let receipt = confirm(&SignerHandle(signer), &tx).await?;

    Ok(DecryptOutcome::Verified {
        record_id: record.id,
        record_name: record.name,
        value,
        receipt,
    })
}

pub async fn check_availability(registry: &dyn RegistryReader) -> IpvaultResult<bool> {
    registry
        .is_available()
        .await
        .map_err(|err| IpvaultError::from_contract(err.message))
}

#[cfg(test)]
mod tests;
