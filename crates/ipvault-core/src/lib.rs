//! Core building blocks shared by the IP Vault binaries.
//!
//! The record model, collaborator contracts, configuration, and the dashboard
//! state machine live here so front-ends only wire events to workflows.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod record;
pub mod session;
pub mod workflow;

pub use backend::{
    BackendError, BackendResult, Backends, CreateRecordRequest, DecryptionResult, EncryptedInput,
    FheClient, PendingTx, RegistryReader, RegistryWriter, SignerHandle, TxReceipt, WalletProvider,
    WalletStatus,
};
pub use config::{ConfigFormat, IpvaultConfig};
pub use dashboard::{DashboardState, Modal, Screen, ToastStatus};
pub use error::{IpvaultError, IpvaultResult};
pub use record::{Category, CategoryFilter, CiphertextHandle, IpRecord, RecordData};
pub use session::Dashboard;
pub use workflow::{DecryptOutcome, LoadReport, RecordSubmission, SubmittedRecord};
