//! Session state of the record dashboard and its mutation points.
//!
//! Every async workflow result funnels through one of the `begin_*` /
//! `*_finished` pairs below, so the headless [`crate::session::Dashboard`] and
//! the iced front-end apply identical transitions.

pub mod filter;
pub mod form;
pub mod history;
pub mod modal;
pub mod stats;
pub mod toast;

pub use filter::RecordFilter;
pub use form::CreateForm;
pub use history::{History, HistoryAction, HistoryEntry};
pub use modal::{Modal, RevealedValue};
pub use stats::Stats;
pub use toast::{Toast, ToastExpiry, ToastSlot, ToastStatus};

use crate::backend::TxReceipt;
use crate::config::UiCfg;
use crate::error::{IpvaultError, IpvaultResult};
use crate::record::{Category, CategoryFilter, IpRecord};
use crate::workflow::{DecryptOutcome, LoadReport, RecordSubmission, SubmittedRecord};
use log::{debug, error, info, warn};
use std::time::Duration;

/// User-facing toast texts.
pub mod messages {
    pub const CONNECT_WALLET: &str = "Please connect your wallet first";
    pub const FHE_INIT_FAILED: &str = "FHE initialization failed";
    pub const LOAD_FAILED: &str = "Failed to load data";
    pub const CREATING: &str = "Creating IP record with Zama FHE...";
    pub const AWAITING_CONFIRMATION: &str = "Waiting for transaction confirmation...";
    pub const CREATED: &str = "IP record created successfully!";
    pub const CANCELLED: &str = "Transaction cancelled by user";
    pub const SUBMISSION_FAILED: &str = "Submission failed";
    pub const VERIFYING: &str = "Verifying decryption on chain...";
    pub const ALREADY_VERIFIED: &str = "Data already verified on-chain";
    pub const DECRYPTED: &str = "Data decrypted and verified!";
    pub const DECRYPTION_FAILED: &str = "Decryption failed";
    pub const AVAILABLE: &str = "Contract is available";
    pub const AVAILABILITY_FAILED: &str = "Availability check failed";
}

/// What the dashboard window renders at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Disconnected,
    InitializingFhe,
    Loading,
    Dashboard,
}

/// In-flight operations; each one blocks a duplicate of itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlags {
    pub refreshing: bool,
    pub creating: bool,
    pub encrypting: bool,
    pub decrypting: bool,
    pub fhe_initializing: bool,
}

/// Effect of a finished decrypt on the rest of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecryptApplied {
    pub value: Option<u64>,
    pub reload: bool,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub wallet_address: Option<String>,
    pub contract_address: Option<String>,
    pub fhe_ready: bool,
    pub busy: BusyFlags,
    pub loaded: bool,
    pub records: Vec<IpRecord>,
    pub stats: Stats,
    pub filter: RecordFilter,
    pub modal: Modal,
    pub form: CreateForm,
    pub toast: ToastSlot,
    pub history: History,
    default_category: Category,
    /// A reload was requested while another one was running.
    reload_pending: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(&UiCfg::default())
    }
}

impl DashboardState {
    pub fn new(ui: &UiCfg) -> Self {
        Self {
            wallet_address: None,
            contract_address: None,
            fhe_ready: false,
            busy: BusyFlags::default(),
            loaded: false,
            records: Vec::new(),
            stats: Stats::default(),
            filter: RecordFilter::default(),
            modal: Modal::None,
            form: CreateForm::new(ui.default_category),
            toast: ToastSlot::new(
                Duration::from_millis(ui.success_toast_ms),
                Duration::from_millis(ui.error_toast_ms),
            ),
            history: History::with_limit(ui.history_limit),
            default_category: ui.default_category,
            reload_pending: false,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.wallet_address.is_none() {
            Screen::Disconnected
        } else if self.busy.fhe_initializing {
            Screen::InitializingFhe
        } else if !self.loaded && self.busy.refreshing {
            Screen::Loading
        } else {
            Screen::Dashboard
        }
    }

    pub fn is_connected(&self) -> bool {
        self.wallet_address.is_some()
    }

    pub fn visible_records(&self) -> Vec<&IpRecord> {
        self.filter.apply(&self.records)
    }

    pub fn can_submit(&self) -> bool {
        !self.busy.creating && !self.busy.encrypting && self.form.is_complete()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search = term.into();
    }

    pub fn set_category_filter(&mut self, category: CategoryFilter) {
        self.filter.category = category;
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Create;
    }

    pub fn open_history(&mut self) {
        self.modal = Modal::History;
    }

    /// Open the detail dialog for `id`; unknown ids leave the modal untouched.
    pub fn open_detail(&mut self, id: &str) -> bool {
        match self.records.iter().find(|record| record.id == id) {
            Some(record) => {
                self.modal = Modal::detail(record.clone());
                true
            }
            None => false,
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    pub fn expire_toast(&mut self, generation: u64) -> bool {
        self.toast.expire(generation)
    }

    /// Next toast expiry the caller still has to schedule.
    pub fn take_toast_expiry(&mut self) -> Option<ToastExpiry> {
        self.toast.take_expiry()
    }

    fn notify(&mut self, status: ToastStatus, message: impl Into<String>) {
        let message = message.into();
        match status {
            ToastStatus::Error => warn!("{message}"),
            _ => debug!("{message}"),
        }
        self.toast.show(status, message);
    }

    fn require_wallet(&mut self) -> Option<String> {
        let address = self.wallet_address.clone();
        if address.is_none() {
            self.notify(ToastStatus::Error, messages::CONNECT_WALLET);
        }
        address
    }

    /// Record a successful connect. Returns true when the FHE client still
    /// needs initialising.
    pub fn connected(&mut self, address: String, contract_address: String) -> bool {
        info!("wallet connected as {address}");
        self.wallet_address = Some(address);
        self.contract_address = Some(contract_address);
        self.stats = Stats::compute(&self.records, self.wallet_address.as_deref());
        !self.fhe_ready && !self.busy.fhe_initializing
    }

    pub fn connect_failed(&mut self, err: &IpvaultError) {
        error!("wallet connection failed: {err}");
        self.notify(ToastStatus::Error, err.detail());
    }

    /// Drop everything tied to the account. The FHE session survives.
    ///
    /// Account operations still in flight are released; their results are
    /// discarded when they arrive.
    pub fn disconnected(&mut self) {
        info!("wallet disconnected");
        self.wallet_address = None;
        self.records.clear();
        self.loaded = false;
        self.stats = Stats::default();
        self.modal = Modal::None;
        self.form.reset(self.default_category);
        self.busy = BusyFlags {
            fhe_initializing: self.busy.fhe_initializing,
            ..BusyFlags::default()
        };
        self.reload_pending = false;
    }

    pub fn begin_fhe_init(&mut self) -> bool {
        if self.fhe_ready || self.busy.fhe_initializing {
            return false;
        }
        self.busy.fhe_initializing = true;
        true
    }

    pub fn fhe_init_finished(&mut self, result: IpvaultResult<()>) {
        self.busy.fhe_initializing = false;
        match result {
            Ok(()) => self.fhe_ready = true,
            Err(err) => {
                error!("fhe initialisation failed: {err}");
                self.notify(ToastStatus::Error, messages::FHE_INIT_FAILED);
            }
        }
    }

    /// Claim the refresh slot. False when disconnected or a reload is running;
    /// in the latter case the reload is queued behind the running one.
    pub fn begin_refresh(&mut self) -> bool {
        if !self.is_connected() {
            debug!("load skipped: wallet not connected");
            return false;
        }
        if self.busy.refreshing {
            debug!("load queued: refresh already in flight");
            self.reload_pending = true;
            return false;
        }
        self.busy.refreshing = true;
        true
    }

    /// Apply a finished load. Returns true when a queued reload must start now.
    pub fn refresh_finished(&mut self, result: IpvaultResult<LoadReport>) -> bool {
        if !self.is_connected() {
            debug!("discarding record listing that finished after disconnect");
            return false;
        }
        self.busy.refreshing = false;
        match result {
            Ok(report) => {
                self.records = report.records;
                self.loaded = true;
                self.stats = Stats::compute(&self.records, self.wallet_address.as_deref());
                self.modal.refresh_record(&self.records);
            }
            Err(err) => {
                error!("record listing failed: {err}");
                self.notify(ToastStatus::Error, messages::LOAD_FAILED);
            }
        }
        std::mem::take(&mut self.reload_pending)
    }

    /// Validate preconditions and the form; on success the create is in flight.
    pub fn begin_create(&mut self) -> Option<RecordSubmission> {
        self.require_wallet()?;
        if self.busy.creating || self.busy.encrypting {
            return None;
        }
        let submission = match self.form.validate() {
            Ok(submission) => submission,
            Err(err) => {
                self.notify(ToastStatus::Error, err.detail());
                return None;
            }
        };
        self.busy.creating = true;
        self.busy.encrypting = true;
        self.notify(ToastStatus::Pending, messages::CREATING);
        Some(submission)
    }

    /// Apply the encrypt-and-send step; returns the transaction to confirm.
    pub fn create_submitted(
        &mut self,
        result: IpvaultResult<SubmittedRecord>,
    ) -> Option<SubmittedRecord> {
        self.busy.encrypting = false;
        match result {
            Ok(submitted) => {
                self.notify(ToastStatus::Pending, messages::AWAITING_CONFIRMATION);
                Some(submitted)
            }
            Err(err) => {
                self.create_failed(&err);
                None
            }
        }
    }

    /// Apply the confirmation. Returns true when a reload must follow.
    pub fn create_confirmed(
        &mut self,
        submitted: &SubmittedRecord,
        result: IpvaultResult<TxReceipt>,
    ) -> bool {
        match result {
            Ok(receipt) => {
                self.busy.creating = false;
                info!(
                    "record {} created in block {}",
                    submitted.id, receipt.block_number
                );
                self.history.record(
                    HistoryAction::Create,
                    submitted.id.as_str(),
                    submitted.name.as_str(),
                    submitted.creator.as_str(),
                );
                self.notify(ToastStatus::Success, messages::CREATED);
                self.modal = Modal::None;
                self.form.reset(self.default_category);
                true
            }
            Err(err) => {
                self.create_failed(&err);
                false
            }
        }
    }

    fn create_failed(&mut self, err: &IpvaultError) {
        self.busy.creating = false;
        self.busy.encrypting = false;
        let message = match err {
            IpvaultError::UserRejected => messages::CANCELLED.to_string(),
            other => format!("{}: {}", messages::SUBMISSION_FAILED, other.detail()),
        };
        self.notify(ToastStatus::Error, message);
    }

    pub fn begin_decrypt(&mut self, id: &str) -> bool {
        if self.require_wallet().is_none() || self.busy.decrypting {
            return false;
        }
        debug!("decrypt requested for {id}");
        self.busy.decrypting = true;
        self.notify(ToastStatus::Pending, messages::VERIFYING);
        true
    }

    pub fn decrypt_finished(&mut self, result: IpvaultResult<DecryptOutcome>) -> DecryptApplied {
        let Some(address) = self.wallet_address.clone() else {
            debug!("discarding decrypt result that finished after disconnect");
            return DecryptApplied::default();
        };
        self.busy.decrypting = false;
        match result {
            Ok(outcome) => {
                let (message, reload) = match &outcome {
                    DecryptOutcome::AlreadyOnChain { .. } => (messages::ALREADY_VERIFIED, false),
                    DecryptOutcome::Verified { .. } => (messages::DECRYPTED, true),
                };
                self.history.record(
                    HistoryAction::Verify,
                    outcome.record_id(),
                    outcome.record_name(),
                    address,
                );
                self.modal
                    .set_local_decryption(outcome.record_id(), outcome.value());
                self.notify(ToastStatus::Success, message);
                DecryptApplied {
                    value: Some(outcome.value()),
                    reload,
                }
            }
            Err(IpvaultError::AlreadyVerified) => {
                self.notify(ToastStatus::Success, messages::ALREADY_VERIFIED);
                DecryptApplied {
                    value: None,
                    reload: true,
                }
            }
            Err(err) => {
                self.notify(
                    ToastStatus::Error,
                    format!("{}: {}", messages::DECRYPTION_FAILED, err.detail()),
                );
                DecryptApplied::default()
            }
        }
    }

    pub fn availability_checked(&mut self, result: IpvaultResult<bool>) {
        match result {
            Ok(true) => self.notify(ToastStatus::Success, messages::AVAILABLE),
            Ok(false) => warn!("registry reports itself unavailable"),
            Err(err) => {
                error!("availability check failed: {err}");
                self.notify(ToastStatus::Error, messages::AVAILABILITY_FAILED);
            }
        }
    }
}
