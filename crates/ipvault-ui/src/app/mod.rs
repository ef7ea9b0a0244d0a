//! Application wiring for the IP Vault dashboard.
//!
//! Collaborator calls run as iced tasks; every result comes back as a
//! [`Message`] and is applied through the matching `DashboardState`
//! transition.

mod style;
mod view;

use std::sync::Arc;
use std::time::Duration;

use iced::window;
use iced::{application, Size, Task, Theme};
use ipvault_core::backend::TxReceipt;
use ipvault_core::config::IpvaultConfig;
use ipvault_core::workflow::{self, DecryptOutcome, LoadReport, SubmittedRecord};
use ipvault_core::{Backends, Category, CategoryFilter, DashboardState, IpvaultError};
use log::{debug, info};
use tokio::time as tokio_time;

const WINDOW_WIDTH: f32 = 1280.0;
const WINDOW_HEIGHT: f32 = 820.0;

/// Collaborator result carried inside a message.
///
/// `IpvaultError` is not `Clone`, so results travel behind an `Arc` and are
/// reclaimed with [`reclaim`] before reaching the state.
pub(super) type Outcome<T> = Result<T, Arc<IpvaultError>>;

/// Launch the dashboard window against the given collaborators.
pub fn run(config: IpvaultConfig, backends: Backends) -> iced::Result {
    configure_runtime_environment();
    info!(
        "Launching IP Vault dashboard on {} (config {}).",
        config.network.chain_name,
        config.path.display()
    );
    application("IP Vault", IpvaultUi::update, IpvaultUi::view)
        .antialiasing(true)
        .window(window::Settings {
            size: Size::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            ..window::Settings::default()
        })
        .theme(IpvaultUi::theme)
        .run_with(move || IpvaultUi::init(config, backends))
}

fn configure_runtime_environment() {
    use std::env;

    if env::var_os("ICED_PRESENT_MODE").is_none() {
        env::set_var("ICED_PRESENT_MODE", "fifo");
    }
    if env::var_os("WGPU_POWER_PREF").is_none() {
        env::set_var("WGPU_POWER_PREF", "low_power");
    }
}

pub(super) struct IpvaultUi {
    config: IpvaultConfig,
    backends: Backends,
    state: DashboardState,
    /// Last liveness flag reported by the registry, if checked.
    available: Option<bool>,
    checking_availability: bool,
}

#[derive(Debug, Clone)]
pub(super) enum Message {
    ConnectPressed,
    Connected(Outcome<(String, String)>),
    DisconnectPressed,
    Disconnected,
    FheInitialized(Outcome<()>),
    RefreshPressed,
    Loaded(Outcome<LoadReport>),
    OpenCreate,
    NameChanged(String),
    ValueChanged(String),
    DescriptionChanged(String),
    CategorySelected(Category),
    SubmitCreate,
    Submitted(Outcome<SubmittedRecord>),
    Confirmed(SubmittedRecord, Outcome<TxReceipt>),
    OpenDetail(String),
    DecryptPressed(String),
    Decrypted(Outcome<DecryptOutcome>),
    OpenHistory,
    CloseModal,
    SearchChanged(String),
    FilterSelected(CategoryFilter),
    CheckAvailability,
    AvailabilityChecked(Outcome<bool>),
    ToastExpired(u64),
    DismissToast,
}

impl IpvaultUi {
    fn init(config: IpvaultConfig, backends: Backends) -> (Self, Task<Message>) {
        let state = DashboardState::new(&config.ui);
        let auto_connect = config.wallet.auto_connect;
        let ui = Self {
            config,
            backends,
            state,
            available: None,
            checking_availability: false,
        };
        let task = if auto_connect {
            Task::done(Message::ConnectPressed)
        } else {
            Task::none()
        };
        (ui, task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ConnectPressed => self.finalize(vec![Task::perform(
                connect_wallet(self.backends.clone()),
                Message::Connected,
            )]),
            Message::Connected(result) => match reclaim(result) {
                Ok((address, contract)) => {
                    let mut tasks = Vec::new();
                    if self.state.connected(address, contract) {
                        tasks.push(self.init_fhe());
                    }
                    tasks.push(self.refresh());
                    self.finalize(tasks)
                }
                Err(err) => {
                    self.state.connect_failed(&err);
                    self.finalize(vec![])
                }
            },
            Message::DisconnectPressed => {
                let backends = self.backends.clone();
                self.finalize(vec![Task::perform(
                    async move { backends.wallet.disconnect().await },
                    |_| Message::Disconnected,
                )])
            }
            Message::Disconnected => {
                self.state.disconnected();
                self.available = None;
                self.finalize(vec![])
            }
            Message::FheInitialized(result) => {
                self.state.fhe_init_finished(reclaim(result));
                self.finalize(vec![])
            }
            Message::RefreshPressed => {
                let task = self.refresh();
                self.finalize(vec![task])
            }
            Message::Loaded(result) => {
                let mut tasks = Vec::new();
                if self.state.refresh_finished(reclaim(result)) {
                    tasks.push(self.refresh());
                }
                self.finalize(tasks)
            }
            Message::OpenCreate => {
                self.state.open_create();
                self.finalize(vec![])
            }
            Message::NameChanged(value) => {
                self.state.form.name = value;
                self.finalize(vec![])
            }
            Message::ValueChanged(value) => {
                self.state.form.set_ip_value(&value);
                self.finalize(vec![])
            }
            Message::DescriptionChanged(value) => {
                self.state.form.description = value;
                self.finalize(vec![])
            }
            Message::CategorySelected(category) => {
                self.state.form.category = category;
                self.finalize(vec![])
            }
            Message::SubmitCreate => {
                let Some(submission) = self.state.begin_create() else {
                    return self.finalize(vec![]);
                };
                let backends = self.backends.clone();
                let contract = self.state.contract_address.clone().unwrap_or_default();
                self.finalize(vec![Task::perform(
                    async move {
                        workflow::submit_record(&backends, &contract, submission)
                            .await
                            .map_err(Arc::new)
                    },
                    Message::Submitted,
                )])
            }
            Message::Submitted(result) => match self.state.create_submitted(reclaim(result)) {
                Some(submitted) => self.finalize(vec![Task::perform(
                    async move {
                        let receipt = workflow::confirm(&submitted.signer, &submitted.tx)
                            .await
                            .map_err(Arc::new);
                        (submitted, receipt)
                    },
                    |(submitted, receipt)| Message::Confirmed(submitted, receipt),
                )]),
                None => self.finalize(vec![]),
            },
            Message::Confirmed(submitted, result) => {
                let mut tasks = Vec::new();
                if self.state.create_confirmed(&submitted, reclaim(result)) {
                    tasks.push(self.refresh());
                }
                self.finalize(tasks)
            }
            Message::OpenDetail(id) => {
                if !self.state.open_detail(&id) {
                    debug!("detail requested for unknown record {id}");
                }
                self.finalize(vec![])
            }
            Message::DecryptPressed(id) => {
                if !self.state.begin_decrypt(&id) {
                    return self.finalize(vec![]);
                }
                let backends = self.backends.clone();
                self.finalize(vec![Task::perform(
                    async move {
                        workflow::decrypt_record(&backends, &id)
                            .await
                            .map_err(Arc::new)
                    },
                    Message::Decrypted,
                )])
            }
            Message::Decrypted(result) => {
                let applied = self.state.decrypt_finished(reclaim(result));
                let mut tasks = Vec::new();
                if applied.reload {
                    tasks.push(self.refresh());
                }
                self.finalize(tasks)
            }
            Message::OpenHistory => {
                self.state.open_history();
                self.finalize(vec![])
            }
            Message::CloseModal => {
                self.state.close_modal();
                self.finalize(vec![])
            }
            Message::SearchChanged(term) => {
                self.state.set_search(term);
                self.finalize(vec![])
            }
            Message::FilterSelected(filter) => {
                self.state.set_category_filter(filter);
                self.finalize(vec![])
            }
            Message::CheckAvailability => {
                if self.checking_availability {
                    return self.finalize(vec![]);
                }
                self.checking_availability = true;
                let backends = self.backends.clone();
                self.finalize(vec![Task::perform(
                    async move {
                        workflow::check_availability(backends.registry.as_ref())
                            .await
                            .map_err(Arc::new)
                    },
                    Message::AvailabilityChecked,
                )])
            }
            Message::AvailabilityChecked(result) => {
                self.checking_availability = false;
                self.available = result.as_ref().ok().copied();
                self.state.availability_checked(reclaim(result));
                self.finalize(vec![])
            }
            Message::ToastExpired(generation) => {
                self.state.expire_toast(generation);
                self.finalize(vec![])
            }
            Message::DismissToast => {
                self.state.toast.dismiss();
                self.finalize(vec![])
            }
        }
    }

    fn view(&self) -> iced::Element<'_, Message> {
        view::render(self)
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }

    fn init_fhe(&mut self) -> Task<Message> {
        if !self.state.begin_fhe_init() {
            return Task::none();
        }
        let backends = self.backends.clone();
        Task::perform(
            async move {
                workflow::initialize_fhe(backends.fhe.as_ref())
                    .await
                    .map_err(Arc::new)
            },
            Message::FheInitialized,
        )
    }

    fn refresh(&mut self) -> Task<Message> {
        if !self.state.begin_refresh() {
            return Task::none();
        }
        let backends = self.backends.clone();
        Task::perform(
            async move {
                workflow::load_records(backends.registry.as_ref())
                    .await
                    .map_err(Arc::new)
            },
            Message::Loaded,
        )
    }

    fn schedule_toast_expiry(&mut self) -> Task<Message> {
        match self.state.take_toast_expiry() {
            Some(expiry) => {
                let delay: Duration = expiry.after;
                Task::future(async move {
                    tokio_time::sleep(delay).await;
                    Message::ToastExpired(expiry.generation)
                })
            }
            None => Task::none(),
        }
    }

    fn finalize(&mut self, mut tasks: Vec<Task<Message>>) -> Task<Message> {
        tasks.push(self.schedule_toast_expiry());
        Task::batch(tasks)
    }
}

async fn connect_wallet(backends: Backends) -> Outcome<(String, String)> {
    let address = backends
        .wallet
        .connect()
        .await
        .map_err(|err| IpvaultError::from_wallet(err.message))?;
    let contract = workflow::contract_address(backends.registry.as_ref()).await?;
    Ok((address, contract))
}

/// Take back ownership of a message-borne error.
///
/// Messages are delivered once, so the `Arc` is normally unique. A shared one
/// is re-classified from its text, which keeps cancellation and the
/// already-verified case intact.
fn reclaim<T>(result: Outcome<T>) -> Result<T, IpvaultError> {
    result.map_err(|shared| {
        Arc::try_unwrap(shared)
            .unwrap_or_else(|shared| IpvaultError::from_contract(shared.to_string()))
    })
}

/// Format the mean hint value for the stats panel.
fn format_average(avg: f64) -> String {
    if avg.fract() == 0.0 {
        format!("{avg:.0}")
    } else {
        format!("{avg:.2}")
    }
}
