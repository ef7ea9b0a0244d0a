use ipvault_core::config::{IpvaultConfig, UiCfg};
use ipvault_core::dashboard::{messages, HistoryAction, RevealedValue, Screen, ToastStatus};
use ipvault_core::{Category, Dashboard, Modal};
use ipvault_devnet::Devnet;
use std::fs;

const CONTRACT: &str = "0x00000000000000000000000000000000000000c0";
const ALICE: &str = "0x00000000000000000000000000000000000000a1";

fn fresh() -> (Devnet, Dashboard) {
    let devnet = Devnet::new(CONTRACT, ALICE);
    let dashboard = Dashboard::new(devnet.backends(), &UiCfg::default());
    (devnet, dashboard)
}

fn toast(dashboard: &Dashboard) -> Option<(ToastStatus, String)> {
    dashboard
        .state()
        .toast
        .current()
        .map(|toast| (toast.status, toast.message.clone()))
}

fn fill_form(dashboard: &mut Dashboard, name: &str, value: &str, description: &str) {
    let form = &mut dashboard.state_mut().form;
    form.name = name.to_string();
    form.set_ip_value(value);
    form.description = description.to_string();
}

#[tokio::test]
async fn connect_initialises_fhe_and_loads() {
    let (devnet, mut dashboard) = fresh();
    devnet.seed_demo_records(ALICE).unwrap();

    assert_eq!(dashboard.state().screen(), Screen::Disconnected);
    assert!(dashboard.connect().await);

    let state = dashboard.state();
    assert_eq!(state.screen(), Screen::Dashboard);
    assert!(state.fhe_ready);
    assert_eq!(state.contract_address.as_deref(), Some(CONTRACT));
    assert_eq!(state.records.len(), 3);
    assert_eq!(state.stats.total_records, 3);
    assert_eq!(state.stats.verified_records, 1);
    assert_eq!(state.stats.user_records, 1);
}

#[tokio::test]
async fn create_flow_records_history_and_reloads() {
    let (_devnet, mut dashboard) = fresh();
    dashboard.connect().await;
    dashboard.state_mut().open_create();
    fill_form(&mut dashboard, "Patent A", "42", "desc");

    assert!(dashboard.create().await);

    let state = dashboard.state();
    let creates: Vec<_> = state
        .history
        .iter()
        .filter(|entry| entry.action == HistoryAction::Create)
        .collect();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].record_name, "Patent A");
    assert_eq!(creates[0].address, ALICE);

    let created = state
        .records
        .iter()
        .find(|record| record.name == "Patent A")
        .expect("created record is listed after reload");
    assert_eq!(created.public_value1, 42);
    assert_eq!(created.public_value2, Category::Legal.code());
    assert_eq!(created.id, creates[0].record_id);
    assert!(created.id.starts_with("ip-"));

    assert_eq!(state.modal, Modal::None);
    assert_eq!(state.form.name, "");
    assert!(!state.busy.creating);
    assert_eq!(
        toast(&dashboard),
        Some((ToastStatus::Success, messages::CREATED.to_string()))
    );
}

#[tokio::test]
async fn disconnected_create_and_decrypt_never_reach_the_registry() {
    let (devnet, mut dashboard) = fresh();
    fill_form(&mut dashboard, "Patent A", "42", "desc");

    assert!(!dashboard.create().await);
    assert_eq!(
        toast(&dashboard),
        Some((ToastStatus::Error, messages::CONNECT_WALLET.to_string()))
    );
    assert_eq!(dashboard.decrypt("ip-demo-0").await, None);
    assert_eq!(devnet.chain.call_count(), 0);
    assert!(dashboard.state().history.is_empty());
}

#[tokio::test]
async fn decrypt_verifies_once_then_reads_stored_value() {
    let (devnet, mut dashboard) = fresh();
    devnet.seed_demo_records(ALICE).unwrap();
    dashboard.connect().await;
    assert!(dashboard.state_mut().open_detail("ip-demo-0"));

    assert_eq!(dashboard.decrypt("ip-demo-0").await, Some(120_000));
    let state = dashboard.state();
    let record = state
        .records
        .iter()
        .find(|record| record.id == "ip-demo-0")
        .unwrap();
    assert!(record.is_verified);
    assert_eq!(record.decrypted_value, 120_000);
    assert_eq!(
        state.modal.revealed_value(),
        Some(RevealedValue::OnChain(120_000))
    );
    assert_eq!(
        toast(&dashboard),
        Some((ToastStatus::Success, messages::DECRYPTED.to_string()))
    );

    let calls_before = devnet.chain.call_count();
    assert_eq!(dashboard.decrypt("ip-demo-0").await, Some(120_000));
    assert_eq!(
        toast(&dashboard),
        Some((ToastStatus::Success, messages::ALREADY_VERIFIED.to_string()))
    );
    // One record fetch; no handle lookup, no verification, no reload.
    assert_eq!(devnet.chain.call_count(), calls_before + 1);

    let verifies = dashboard
        .state()
        .history
        .iter()
        .filter(|entry| entry.action == HistoryAction::Verify)
        .count();
    assert_eq!(verifies, 2);
}

#[tokio::test]
async fn user_rejection_is_reported_as_cancellation() {
    let (devnet, mut dashboard) = fresh();
    dashboard.connect().await;
    fill_form(&mut dashboard, "Patent B", "7", "");
    devnet.wallet.reject_next_signature();

    assert!(!dashboard.create().await);
    assert_eq!(
        toast(&dashboard),
        Some((ToastStatus::Error, messages::CANCELLED.to_string()))
    );
    assert_eq!(devnet.chain.record_count().unwrap(), 0);
    assert_eq!(dashboard.state().form.name, "Patent B");
}

#[tokio::test]
async fn failed_fhe_init_blocks_create_until_reconnect() {
    let (devnet, mut dashboard) = fresh();
    devnet.fhe.fail_next_init();
    dashboard.connect().await;
    assert!(!dashboard.state().fhe_ready);
    assert_eq!(dashboard.state().screen(), Screen::Dashboard);

    fill_form(&mut dashboard, "Patent C", "9", "");
    assert!(!dashboard.create().await);
    let (status, message) = toast(&dashboard).unwrap();
    assert_eq!(status, ToastStatus::Error);
    assert!(message.starts_with(messages::SUBMISSION_FAILED), "{message}");

    dashboard.connect().await;
    assert!(dashboard.state().fhe_ready);
    assert!(dashboard.create().await);
}

#[tokio::test]
async fn availability_check_reports_only_positive_or_error() {
    let (devnet, mut dashboard) = fresh();
    dashboard.check_availability().await;
    assert_eq!(
        toast(&dashboard),
        Some((ToastStatus::Success, messages::AVAILABLE.to_string()))
    );

    dashboard.state_mut().toast.dismiss();
    devnet.chain.set_available(false);
    dashboard.check_availability().await;
    assert_eq!(toast(&dashboard), None);
}

#[tokio::test]
async fn history_never_exceeds_limit() {
    let (_devnet, mut dashboard) = fresh();
    dashboard.connect().await;
    for idx in 0..12 {
        fill_form(&mut dashboard, &format!("Record {idx}"), "1", "");
        assert!(dashboard.create().await);
    }
    let history = &dashboard.state().history;
    assert_eq!(history.len(), 10);
    assert_eq!(
        history.latest().map(|entry| entry.record_name.as_str()),
        Some("Record 11")
    );
    assert_eq!(dashboard.state().records.len(), 12);
}

#[tokio::test]
async fn config_file_drives_devnet_wiring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ipvault.toml");
    fs::write(
        &path,
        format!(
            "[network]\ncontract_address = \"{CONTRACT}\"\n\n[wallet]\naddress = \"{ALICE}\"\n\n[devnet]\nconfirmation_delay_ms = 0\nseed_demo_records = true\n"
        ),
    )
    .unwrap();

    let cfg = IpvaultConfig::load(&path).unwrap();
    assert!(cfg.validate().is_empty());
    let devnet = Devnet::from_config(&cfg).unwrap();
    let mut dashboard = Dashboard::new(devnet.backends(), &cfg.ui);
    dashboard.connect().await;
    assert_eq!(dashboard.state().records.len(), 3);
    assert_eq!(dashboard.state().stats.user_records, 1);
}
