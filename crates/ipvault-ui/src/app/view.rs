//! Renders the dashboard tree using iced widgets.

use super::{format_average, style, IpvaultUi, Message};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::{
    button, column, container, pick_list, row, scrollable, text, text_input, Column, Row, Space,
    Stack,
};
use iced::{Alignment, Color, Element, Font, Length, Theme};
use iced_aw::Spinner;
use ipvault_core::dashboard::{HistoryEntry, Modal, RevealedValue, Screen, ToastStatus};
use ipvault_core::record::short_address;
use ipvault_core::{Category, CategoryFilter, IpRecord};

const PAD_ROOT: u16 = 16;
const PAD_CARD: u16 = 16;
const GAP_SECTION: u16 = 14;
const GAP_GROUP: u16 = 8;
const FONT_TITLE: u16 = 24;
const FONT_HEADING: u16 = 16;
const FONT_BODY: u16 = 14;
const FONT_MICRO: u16 = 12;
const MODAL_WIDTH: f32 = 560.0;
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const TEXT_PRIMARY: Color = Color {
    r: 0.93,
    g: 0.95,
    b: 0.98,
    a: 1.0,
};
const TEXT_MUTED: Color = Color {
    r: 0.5,
    g: 0.56,
    b: 0.68,
    a: 1.0,
};

pub(super) fn render(ui: &IpvaultUi) -> Element<'_, Message> {
    let body: Element<'_, Message> = match ui.state.screen() {
        Screen::Disconnected => render_connect_prompt(ui),
        Screen::InitializingFhe => render_busy(
            "Initializing Zama FHE...",
            "Fetching the network public key for this session.",
        ),
        Screen::Loading => render_busy(
            "Loading encrypted records...",
            "Reading the registry contract.",
        ),
        Screen::Dashboard => render_dashboard(ui),
    };

    let column = Column::new()
        .spacing(GAP_SECTION)
        .width(Length::Fill)
        .push(render_header(ui))
        .push(body)
        .push(render_footer(ui));

    let base: Element<'_, Message> = container(column)
        .padding(PAD_ROOT)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(style::background())
        .into();

    let mut stack = Stack::new()
        .width(Length::Fill)
        .height(Length::Fill)
        .push(base);

    match &ui.state.modal {
        Modal::None => {}
        Modal::Create => stack = stack.push(render_create_overlay(ui)),
        Modal::Detail { record, .. } => stack = stack.push(render_detail_overlay(ui, record)),
        Modal::History => stack = stack.push(render_history_overlay(ui)),
    }
    if let Some(toast) = render_toast(ui) {
        stack = stack.push(toast);
    }

    stack.into()
}

fn render_header(ui: &IpvaultUi) -> Element<'_, Message> {
    let state = &ui.state;
    let copy = column![
        text("IP VAULT")
            .size(FONT_TITLE)
            .style(text_color(style::GOLD)),
        text(format!(
            "Confidential IP registry on {}",
            ui.config.network.chain_name
        ))
        .size(FONT_MICRO)
        .style(text_color(TEXT_MUTED)),
    ]
    .spacing(4);

    let wallet_chip = match state.wallet_address.as_deref() {
        Some(address) => render_status_chip("Wallet", short_address(address), style::GREEN),
        None => render_status_chip("Wallet", "Not connected", style::RED),
    };
    let (fhe_label, fhe_tint) = if state.fhe_ready {
        ("Ready", style::GREEN)
    } else if state.busy.fhe_initializing {
        ("Initializing", style::GOLD)
    } else {
        ("Offline", style::SLATE)
    };
    let fhe_chip = render_status_chip("FHE", fhe_label, fhe_tint);
    let contract_chip = render_status_chip(
        "Contract",
        availability_label(ui.available),
        match ui.available {
            Some(true) => style::GREEN,
            Some(false) => style::RED,
            None => style::TEAL,
        },
    );

    let mut controls = Row::new().spacing(GAP_GROUP).align_y(Vertical::Center);
    controls = controls.push(
        button(text("Check availability").size(FONT_BODY))
            .padding([8, 14])
            .style(style::secondary_button())
            .on_press_maybe((!ui.checking_availability).then_some(Message::CheckAvailability)),
    );
    if state.is_connected() {
        controls = controls
            .push(
                button(text("History").size(FONT_BODY))
                    .padding([8, 14])
                    .style(style::secondary_button())
                    .on_press(Message::OpenHistory),
            )
            .push(
                button(
                    text(if state.busy.refreshing {
                        "Refreshing..."
                    } else {
                        "Refresh"
                    })
                    .size(FONT_BODY),
                )
                .padding([8, 14])
                .style(style::secondary_button())
                .on_press_maybe((!state.busy.refreshing).then_some(Message::RefreshPressed)),
            )
            .push(
                button(text("Disconnect").size(FONT_BODY))
                    .padding([8, 14])
                    .style(style::danger_button())
                    .on_press(Message::DisconnectPressed),
            );
    } else {
        controls = controls.push(
            button(text("Connect wallet").size(FONT_BODY))
                .padding([8, 18])
                .style(style::primary_button())
                .on_press(Message::ConnectPressed),
        );
    }

    container(
        row![
            copy,
            Space::with_width(Length::Fill),
            wallet_chip,
            fhe_chip,
            contract_chip,
            controls,
        ]
        .spacing(GAP_SECTION)
        .align_y(Vertical::Center),
    )
    .padding([12, 20])
    .width(Length::Fill)
    .style(style::header_card())
    .into()
}

fn render_status_chip(
    label: &str,
    value: impl Into<String>,
    tint: Color,
) -> Element<'static, Message> {
    let label_owned = label.to_owned();
    container(
        column![
            text(label_owned)
                .size(11)
                .style(text_color(TEXT_MUTED)),
            text(value.into())
                .size(13)
                .style(text_color(TEXT_PRIMARY)),
        ]
        .spacing(2)
        .align_x(Alignment::Center),
    )
    .padding([6, 12])
    .style(style::status_chip(tint))
    .into()
}

fn render_connect_prompt(ui: &IpvaultUi) -> Element<'_, Message> {
    let panel = column![
        text("Connect your wallet")
            .size(22)
            .style(text_color(style::GOLD)),
        text("Register intellectual property with its value encrypted under Zama FHE. Only the hint value and category are public; the real value is revealed through on-chain verified decryption.")
            .size(FONT_BODY)
            .style(text_color(TEXT_PRIMARY)),
        text(format!("Account: {}", short_address(&ui.config.wallet.address)))
            .size(FONT_MICRO)
            .font(Font::MONOSPACE)
            .style(text_color(TEXT_MUTED)),
        button(text("Connect wallet").size(FONT_BODY))
            .padding([10, 22])
            .style(style::primary_button())
            .on_press(Message::ConnectPressed),
    ]
    .spacing(GAP_SECTION)
    .align_x(Alignment::Center)
    .max_width(520.0);

    container(container(panel).padding(28).style(style::panel()))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn render_busy<'a>(headline: &'a str, detail: &'a str) -> Element<'a, Message> {
    let spinner: Element<'a, Message> = Spinner::new()
        .width(Length::Fixed(54.0))
        .height(Length::Fixed(54.0))
        .circle_radius(6.0)
        .into();

    container(
        column![
            spinner,
            text(headline)
                .size(FONT_HEADING)
                .style(text_color(TEXT_PRIMARY)),
            text(detail).size(FONT_MICRO).style(text_color(TEXT_MUTED)),
        ]
        .spacing(GAP_SECTION)
        .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}

fn render_dashboard(ui: &IpvaultUi) -> Element<'_, Message> {
    column![
        render_stats(ui),
        render_fhe_process(),
        render_toolbar(ui),
        render_records(ui),
    ]
    .spacing(GAP_SECTION)
    .height(Length::Fill)
    .into()
}

fn render_stats(ui: &IpvaultUi) -> Element<'_, Message> {
    let stats = &ui.state.stats;
    row![
        render_stat_card(
            "Total records",
            stats.total_records.to_string(),
            "registered on-chain",
            style::TEAL,
        ),
        render_stat_card(
            "Verified",
            stats.verified_records.to_string(),
            format!("{}% of all records", stats.verified_percent()),
            style::GREEN,
        ),
        render_stat_card(
            "My records",
            stats.user_records.to_string(),
            "created by this wallet",
            style::GOLD,
        ),
        render_stat_card(
            "Avg. public value",
            format_average(stats.avg_value),
            "mean hint value",
            Color::from_rgb8(0x9b, 0x8c, 0xff),
        ),
    ]
    .spacing(GAP_SECTION)
    .into()
}

fn render_stat_card(
    label: &str,
    value: String,
    caption: impl Into<String>,
    tint: Color,
) -> Element<'static, Message> {
    container(
        column![
            text(label.to_owned())
                .size(FONT_MICRO)
                .style(text_color(TEXT_MUTED)),
            text(value).size(26).style(text_color(tint)),
            text(caption.into())
                .size(FONT_MICRO)
                .style(text_color(TEXT_MUTED)),
        ]
        .spacing(4),
    )
    .padding(PAD_CARD)
    .width(Length::FillPortion(1))
    .style(style::stat_card(tint))
    .into()
}

fn render_fhe_process() -> Element<'static, Message> {
    let steps = [
        ("1", "Encrypt", "The IP value is encrypted client-side."),
        ("2", "Store", "Only the ciphertext handle lands on-chain."),
        ("3", "Decrypt", "The relayer publicly decrypts with a proof."),
        ("4", "Verify", "The contract checks the proof and stores the value."),
    ];
    let row = steps.iter().fold(
        Row::new().spacing(GAP_SECTION),
        |row, (step, title, detail)| {
            row.push(
                column![
                    text(format!("{step}. {title}"))
                        .size(FONT_BODY)
                        .style(text_color(style::TEAL)),
                    text(*detail).size(FONT_MICRO).style(text_color(TEXT_MUTED)),
                ]
                .spacing(2)
                .width(Length::FillPortion(1)),
            )
        },
    );

    container(row)
        .padding([10, PAD_CARD])
        .width(Length::Fill)
        .style(style::panel())
        .into()
}

fn render_toolbar(ui: &IpvaultUi) -> Element<'_, Message> {
    let state = &ui.state;
    let search = text_input("Search name or description...", &state.filter.search)
        .on_input(Message::SearchChanged)
        .padding(10)
        .size(FONT_BODY)
        .width(Length::Fill)
        .style(style::text_input());

    let filter = pick_list(
        CategoryFilter::ALL,
        Some(state.filter.category),
        Message::FilterSelected,
    )
    .padding(10)
    .text_size(FONT_BODY);

    let create = button(text("+ New IP record").size(FONT_BODY))
        .padding([10, 18])
        .style(style::primary_button())
        .on_press(Message::OpenCreate);

    row![search, filter, create]
        .spacing(GAP_GROUP)
        .align_y(Vertical::Center)
        .into()
}

fn render_records(ui: &IpvaultUi) -> Element<'_, Message> {
    let state = &ui.state;
    let visible = state.visible_records();

    let content: Element<'_, Message> = if visible.is_empty() {
        let message = if state.records.is_empty() {
            "No IP records yet. Create the first one."
        } else {
            "No records match the current filter."
        };
        container(text(message).size(FONT_BODY).style(text_color(TEXT_MUTED)))
            .padding(24)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
    } else {
        let rows = visible.into_iter().fold(
            Column::new().spacing(GAP_GROUP),
            |column, record| column.push(render_record_row(record)),
        );
        scrollable(rows).height(Length::Fill).into()
    };

    container(content)
        .padding(PAD_CARD)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(style::panel())
        .into()
}

fn render_record_row(record: &IpRecord) -> Element<'_, Message> {
    let (status, tint) = verification_label(record);
    let line = row![
        column![
            text(&record.name)
                .size(FONT_HEADING)
                .style(text_color(TEXT_PRIMARY)),
            text(&record.description)
                .size(FONT_MICRO)
                .style(text_color(TEXT_MUTED)),
        ]
        .spacing(2)
        .width(Length::Fill),
        text(category_label(record))
            .size(FONT_MICRO)
            .style(text_color(style::TEAL)),
        text(short_address(&record.creator))
            .size(FONT_MICRO)
            .font(Font::MONOSPACE)
            .style(text_color(TEXT_MUTED)),
        text(format!("hint {}", record.public_value1))
            .size(FONT_MICRO)
            .style(text_color(TEXT_PRIMARY)),
        container(text(status).size(11).style(text_color(TEXT_PRIMARY)))
            .padding([4, 10])
            .style(style::status_chip(tint)),
    ]
    .spacing(GAP_SECTION)
    .align_y(Vertical::Center);

    button(line)
        .padding([10, 14])
        .width(Length::Fill)
        .style(style::record_row(record.is_verified))
        .on_press(Message::OpenDetail(record.id.clone()))
        .into()
}

fn render_create_overlay(ui: &IpvaultUi) -> Element<'_, Message> {
    let state = &ui.state;
    let form = &state.form;

    let submit_label = if state.busy.encrypting {
        "Encrypting..."
    } else if state.busy.creating {
        "Confirming..."
    } else {
        "Encrypt & register"
    };

    let body = column![
        text("NEW IP RECORD")
            .size(20)
            .style(text_color(style::GOLD)),
        render_field(
            "Name",
            text_input("e.g. Solar Cell Patent", &form.name)
                .on_input(Message::NameChanged)
                .padding(10)
                .size(FONT_BODY)
                .style(style::text_input())
                .into(),
        ),
        render_field(
            "IP value (encrypted with FHE)",
            text_input("digits only", form.ip_value())
                .on_input(Message::ValueChanged)
                .padding(10)
                .size(FONT_BODY)
                .style(style::text_input())
                .into(),
        ),
        render_field(
            "Category",
            pick_list(Category::ALL, Some(form.category), Message::CategorySelected)
                .padding(10)
                .text_size(FONT_BODY)
                .into(),
        ),
        render_field(
            "Description",
            text_input("What does this record cover?", &form.description)
                .on_input(Message::DescriptionChanged)
                .padding(10)
                .size(FONT_BODY)
                .style(style::text_input())
                .into(),
        ),
        row![
            button(text("Cancel").size(FONT_BODY))
                .padding([8, 18])
                .style(style::secondary_button())
                .on_press(Message::CloseModal),
            Space::with_width(Length::Fill),
            button(text(submit_label).size(FONT_BODY))
                .padding([8, 18])
                .style(style::primary_button())
                .on_press_maybe(state.can_submit().then_some(Message::SubmitCreate)),
        ]
        .spacing(GAP_SECTION),
    ]
    .spacing(GAP_SECTION);

    render_modal(body.into())
}

fn render_detail_overlay<'a>(ui: &'a IpvaultUi, record: &'a IpRecord) -> Element<'a, Message> {
    let state = &ui.state;
    let (status, tint) = verification_label(record);
    let revealed = state
        .modal
        .revealed_value()
        .unwrap_or(RevealedValue::Locked);

    let decrypt_label = if state.busy.decrypting {
        "Decrypting..."
    } else if record.is_verified {
        "Show verified value"
    } else {
        "Decrypt & verify"
    };

    let body = column![
        row![
            text(&record.name).size(20).style(text_color(style::GOLD)),
            Space::with_width(Length::Fill),
            container(text(status).size(11).style(text_color(TEXT_PRIMARY)))
                .padding([4, 10])
                .style(style::status_chip(tint)),
        ]
        .align_y(Vertical::Center),
        detail_lines(record, revealed).into_iter().fold(
            Column::new().spacing(GAP_GROUP),
            |column, (label, value)| column.push(render_detail_line(label, value)),
        ),
        text(&record.description)
            .size(FONT_BODY)
            .style(text_color(TEXT_PRIMARY)),
        row![
            button(text("Close").size(FONT_BODY))
                .padding([8, 18])
                .style(style::secondary_button())
                .on_press(Message::CloseModal),
            Space::with_width(Length::Fill),
            button(text(decrypt_label).size(FONT_BODY))
                .padding([8, 18])
                .style(style::primary_button())
                .on_press_maybe(
                    (!state.busy.decrypting)
                        .then(|| Message::DecryptPressed(record.id.clone())),
                ),
        ]
        .spacing(GAP_SECTION),
    ]
    .spacing(GAP_GROUP);

    render_modal(body.into())
}

/// Label/value rows of the detail dialog.
///
/// The listing carries no ciphertext handle for a record, so none is shown.
pub(super) fn detail_lines(
    record: &IpRecord,
    revealed: RevealedValue,
) -> Vec<(&'static str, String)> {
    vec![
        ("Record id", record.id.clone()),
        ("Category", category_label(record).to_string()),
        ("Creator", short_address(&record.creator)),
        ("Created", created_label(record)),
        ("Public hint value", record.public_value1.to_string()),
        ("IP value", revealed_label(revealed)),
    ]
}

fn render_history_overlay(ui: &IpvaultUi) -> Element<'_, Message> {
    let history = &ui.state.history;

    let entries: Element<'_, Message> = if history.is_empty() {
        text("No operations recorded in this session.")
            .size(FONT_BODY)
            .style(text_color(TEXT_MUTED))
            .into()
    } else {
        let list = history.iter().fold(
            Column::new().spacing(GAP_GROUP),
            |column, entry| column.push(render_history_entry(entry)),
        );
        scrollable(list).height(Length::Fixed(360.0)).into()
    };

    let body = column![
        row![
            text("OPERATION HISTORY")
                .size(20)
                .style(text_color(style::GOLD)),
            Space::with_width(Length::Fill),
            text(format!("last {}", history.limit()))
                .size(FONT_MICRO)
                .style(text_color(TEXT_MUTED)),
        ]
        .align_y(Vertical::Center),
        entries,
        row![
            Space::with_width(Length::Fill),
            button(text("Close").size(FONT_BODY))
                .padding([8, 18])
                .style(style::secondary_button())
                .on_press(Message::CloseModal),
        ],
    ]
    .spacing(GAP_SECTION);

    render_modal(body.into())
}

fn render_history_entry(entry: &HistoryEntry) -> Element<'_, Message> {
    row![
        text(entry.action.to_string())
            .size(FONT_MICRO)
            .width(Length::Fixed(56.0))
            .style(text_color(style::TEAL)),
        text(&entry.record_name)
            .size(FONT_BODY)
            .width(Length::Fill)
            .style(text_color(TEXT_PRIMARY)),
        text(short_address(&entry.address))
            .size(FONT_MICRO)
            .font(Font::MONOSPACE)
            .style(text_color(TEXT_MUTED)),
        text(entry.at.format("%H:%M:%S").to_string())
            .size(FONT_MICRO)
            .style(text_color(TEXT_MUTED)),
    ]
    .spacing(GAP_SECTION)
    .align_y(Vertical::Center)
    .into()
}

fn render_field<'a>(label: &'a str, input: Element<'a, Message>) -> Element<'a, Message> {
    column![
        text(label).size(FONT_MICRO).style(text_color(TEXT_MUTED)),
        input
    ]
    .spacing(4)
    .into()
}

fn render_detail_line(label: &str, value: String) -> Element<'static, Message> {
    row![
        text(label.to_owned())
            .size(FONT_MICRO)
            .width(Length::Fixed(140.0))
            .style(text_color(TEXT_MUTED)),
        text(value).size(FONT_BODY).style(text_color(TEXT_PRIMARY)),
    ]
    .spacing(GAP_GROUP)
    .into()
}

fn render_modal(body: Element<'_, Message>) -> Element<'_, Message> {
    let panel = container(body)
        .padding(20)
        .width(Length::Fixed(MODAL_WIDTH))
        .style(style::modal_panel());

    container(panel)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(style::overlay_backdrop())
        .into()
}

fn render_toast(ui: &IpvaultUi) -> Option<Element<'_, Message>> {
    let toast = ui.state.toast.current()?;
    let tint = toast_tint(toast.status);

    let mut line = Row::new().spacing(GAP_GROUP).align_y(Vertical::Center);
    if toast.status == ToastStatus::Pending {
        line = line.push(
            Spinner::new()
                .width(Length::Fixed(18.0))
                .height(Length::Fixed(18.0))
                .circle_radius(2.5),
        );
    }
    line = line
        .push(
            text(&toast.message)
                .size(FONT_BODY)
                .style(text_color(TEXT_PRIMARY)),
        )
        .push(
            button(text("x").size(FONT_MICRO))
                .padding([2, 8])
                .style(style::secondary_button())
                .on_press(Message::DismissToast),
        );

    let banner = container(line)
        .padding([10, 16])
        .max_width(460.0)
        .style(style::toast_banner(tint));

    Some(
        container(banner)
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Right)
            .align_y(Vertical::Bottom)
            .into(),
    )
}

fn render_footer(ui: &IpvaultUi) -> Element<'_, Message> {
    let contract = ui
        .state
        .contract_address
        .as_deref()
        .map(short_address)
        .unwrap_or_else(|| "not deployed".to_string());
    container(
        row![
            text(format!("IP Vault v{APP_VERSION}"))
                .size(FONT_MICRO)
                .style(text_color(TEXT_MUTED)),
            Space::with_width(Length::Fill),
            text("Registry:")
                .size(FONT_MICRO)
                .style(text_color(TEXT_MUTED)),
            text(contract)
                .size(FONT_MICRO)
                .font(Font::MONOSPACE)
                .style(text_color(TEXT_PRIMARY)),
        ]
        .spacing(6)
        .align_y(Vertical::Center),
    )
    .padding([6, 4])
    .into()
}

pub(super) fn toast_tint(status: ToastStatus) -> Color {
    match status {
        ToastStatus::Pending => style::GOLD,
        ToastStatus::Success => style::GREEN,
        ToastStatus::Error => style::RED,
    }
}

pub(super) fn revealed_label(revealed: RevealedValue) -> String {
    match revealed {
        RevealedValue::OnChain(value) => format!("{value} (verified on-chain)"),
        RevealedValue::Local(value) => format!("{value} (decrypted, pending reload)"),
        RevealedValue::Locked => "Encrypted".to_string(),
    }
}

pub(super) fn availability_label(available: Option<bool>) -> &'static str {
    match available {
        Some(true) => "Available",
        Some(false) => "Unavailable",
        None => "Unchecked",
    }
}

fn verification_label(record: &IpRecord) -> (&'static str, Color) {
    if record.is_verified {
        ("Verified", style::GREEN)
    } else {
        ("Encrypted", style::GOLD)
    }
}

pub(super) fn category_label(record: &IpRecord) -> &'static str {
    record
        .category()
        .map(Category::label)
        .unwrap_or("Uncategorized")
}

fn created_label(record: &IpRecord) -> String {
    record
        .created_at()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn text_color(color: Color) -> impl Fn(&Theme) -> iced::widget::text::Style + Copy {
    move |_| iced::widget::text::Style { color: Some(color) }
}
