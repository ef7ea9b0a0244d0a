//! Headless dashboard controller.
//!
//! Drives the workflows sequentially against a [`Backends`] bundle and applies
//! each result to a [`DashboardState`]. The iced front-end performs the same
//! steps through its message loop; this type serves scripted use and tests.

use crate::backend::Backends;
use crate::config::UiCfg;
use crate::dashboard::DashboardState;
use crate::error::IpvaultError;
use crate::workflow;
use log::debug;

pub struct Dashboard {
    backends: Backends,
    state: DashboardState,
}

impl Dashboard {
    pub fn new(backends: Backends, ui: &UiCfg) -> Self {
        Self {
            backends,
            state: DashboardState::new(ui),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Connect the wallet, initialise FHE if needed, then load the records.
    pub async fn connect(&mut self) -> bool {
        let connected = async {
            let address = self
                .backends
                .wallet
                .connect()
                .await
                .map_err(|err| IpvaultError::from_contract(err.message))?;
            let contract = workflow::contract_address(self.backends.registry.as_ref()).await?;
            Ok::<_, IpvaultError>((address, contract))
        }
        .await;

        match connected {
            Ok((address, contract)) => {
                if self.state.connected(address, contract) {
                    self.init_fhe().await;
                }
                self.load().await;
                true
            }
            Err(err) => {
                self.state.connect_failed(&err);
                false
            }
        }
    }

    pub async fn disconnect(&mut self) {
        self.backends.wallet.disconnect().await;
        self.state.disconnected();
    }

    pub async fn init_fhe(&mut self) {
        if !self.state.begin_fhe_init() {
            return;
        }
        let result = workflow::initialize_fhe(self.backends.fhe.as_ref()).await;
        self.state.fhe_init_finished(result);
    }

    /// Reload the record list, running any reload queued meanwhile.
    pub async fn load(&mut self) {
        if !self.state.begin_refresh() {
            return;
        }
        loop {
            let result = workflow::load_records(self.backends.registry.as_ref()).await;
            if !self.state.refresh_finished(result) || !self.state.begin_refresh() {
                break;
            }
        }
    }

    /// Submit the current form. Returns true once the record is confirmed.
    pub async fn create(&mut self) -> bool {
        let Some(submission) = self.state.begin_create() else {
            return false;
        };
        let contract = self.state.contract_address.clone().unwrap_or_default();
        let result = workflow::submit_record(&self.backends, &contract, submission).await;
        let Some(submitted) = self.state.create_submitted(result) else {
            return false;
        };
        let receipt = workflow::confirm(&submitted.signer, &submitted.tx).await;
        let confirmed = self.state.create_confirmed(&submitted, receipt);
        if confirmed {
            self.load().await;
        }
        confirmed
    }

    /// Reveal the value of record `id`. `None` when nothing was decrypted.
    pub async fn decrypt(&mut self, id: &str) -> Option<u64> {
        if !self.state.begin_decrypt(id) {
            return None;
        }
        let result = workflow::decrypt_record(&self.backends, id).await;
        let applied = self.state.decrypt_finished(result);
        if applied.reload {
            self.load().await;
        }
        debug!("decrypt of {id} finished with {:?}", applied.value);
        applied.value
    }

    pub async fn check_availability(&mut self) {
        let result = workflow::check_availability(self.backends.registry.as_ref()).await;
        self.state.availability_checked(result);
    }
}
