//! Vault palette and widget styles.

use iced::border::{Border, Radius};
use iced::widget::button::{Status as ButtonStatus, Style as ButtonStyle};
use iced::widget::container;
use iced::widget::text_input::{self, Status as InputStatus};
use iced::{Background, Color, Theme};

pub(super) const BG_SURFACE: Color = Color {
    r: 0x08 as f32 / 255.0,
    g: 0x0b as f32 / 255.0,
    b: 0x14 as f32 / 255.0,
    a: 1.0,
};
const PANEL_BG: Color = Color {
    r: 0x0f as f32 / 255.0,
    g: 0x14 as f32 / 255.0,
    b: 0x24 as f32 / 255.0,
    a: 1.0,
};
pub(super) const GOLD: Color = Color {
    r: 0.96,
    g: 0.74,
    b: 0.27,
    a: 1.0,
};
pub(super) const TEAL: Color = Color {
    r: 0.16,
    g: 0.83,
    b: 0.76,
    a: 1.0,
};
pub(super) const GREEN: Color = Color {
    r: 0.2,
    g: 0.86,
    b: 0.5,
    a: 1.0,
};
pub(super) const RED: Color = Color {
    r: 0.93,
    g: 0.27,
    b: 0.35,
    a: 1.0,
};
pub(super) const SLATE: Color = Color {
    r: 0.12,
    g: 0.15,
    b: 0.25,
    a: 1.0,
};
const SLATE_LIGHT: Color = Color {
    r: 0.22,
    g: 0.26,
    b: 0.38,
    a: 1.0,
};

pub(super) fn background() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| container::Style {
        background: Some(Background::Color(BG_SURFACE)),
        ..Default::default()
    }
}

pub(super) fn header_card() -> impl Fn(&Theme) -> container::Style + Copy {
    // Title bar with wallet controls.
    |_| container::Style {
        background: Some(Background::Color(PANEL_BG)),
        border: Border {
            radius: Radius::from(16.0),
            width: 1.5,
            color: with_alpha(GOLD, 0.7),
        },
        shadow: iced::Shadow {
            color: with_alpha(GOLD, 0.18),
            blur_radius: 12.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub(super) fn panel() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| container::Style {
        background: Some(Background::Color(PANEL_BG)),
        border: Border {
            radius: Radius::from(14.0),
            width: 1.0,
            color: SLATE_LIGHT,
        },
        ..Default::default()
    }
}

pub(super) fn stat_card(tint: Color) -> impl Fn(&Theme) -> container::Style + Copy {
    move |_| container::Style {
        background: Some(Background::Color(with_alpha(tint, 0.08))),
        border: Border {
            radius: Radius::from(14.0),
            width: 1.2,
            color: with_alpha(tint, 0.55),
        },
        ..Default::default()
    }
}

pub(super) fn record_row(verified: bool) -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    // Clickable record line; verified records carry a green edge.
    move |_theme, status| {
        let background = match status {
            ButtonStatus::Hovered | ButtonStatus::Pressed => Color::from_rgb8(0x17, 0x1e, 0x33),
            _ => PANEL_BG,
        };
        ButtonStyle {
            background: Some(Background::Color(background)),
            border: Border {
                radius: Radius::from(12.0),
                width: 1.0,
                color: if verified {
                    with_alpha(GREEN, 0.6)
                } else {
                    SLATE_LIGHT
                },
            },
            text_color: Color::from_rgb8(0xe8, 0xec, 0xf6),
            ..ButtonStyle::default()
        }
    }
}

pub(super) fn status_chip(tint: Color) -> impl Fn(&Theme) -> container::Style + Copy {
    move |_theme| container::Style {
        background: Some(Background::Color(with_alpha(tint, 0.16))),
        border: Border {
            radius: Radius::from(10.0),
            width: 1.0,
            color: with_alpha(tint, 0.65),
        },
        ..Default::default()
    }
}

pub(super) fn toast_banner(tint: Color) -> impl Fn(&Theme) -> container::Style + Copy {
    move |_theme| container::Style {
        background: Some(Background::Color(Color::from_rgba(0.05, 0.07, 0.13, 0.97))),
        border: Border {
            radius: Radius::from(12.0),
            width: 1.5,
            color: tint,
        },
        shadow: iced::Shadow {
            color: with_alpha(tint, 0.3),
            blur_radius: 16.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub(super) fn primary_button() -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, status| {
        let background = match status {
            ButtonStatus::Pressed => with_alpha(GOLD, 0.8),
            ButtonStatus::Disabled => SLATE,
            _ => GOLD,
        };
        ButtonStyle {
            background: Some(Background::Color(background)),
            border: Border {
                radius: Radius::from(10.0),
                width: 1.0,
                color: if matches!(status, ButtonStatus::Disabled) {
                    SLATE_LIGHT
                } else {
                    GOLD
                },
            },
            text_color: if matches!(status, ButtonStatus::Disabled) {
                Color::from_rgb8(0x5c, 0x66, 0x80)
            } else {
                Color::from_rgb8(0x14, 0x10, 0x05)
            },
            ..ButtonStyle::default()
        }
    }
}

pub(super) fn secondary_button() -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    // Outline treatment for header and modal actions.
    move |_theme, status| {
        let background = match status {
            ButtonStatus::Pressed => Color::from_rgb8(0x1d, 0x26, 0x40),
            ButtonStatus::Hovered => Color::from_rgb8(0x17, 0x1f, 0x36),
            _ => PANEL_BG,
        };
        ButtonStyle {
            background: Some(Background::Color(background)),
            border: Border {
                radius: Radius::from(10.0),
                width: 1.0,
                color: with_alpha(TEAL, 0.7),
            },
            text_color: Color::from_rgb8(0xd7, 0xf7, 0xf3),
            ..ButtonStyle::default()
        }
    }
}

pub(super) fn danger_button() -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, status| {
        let background = if matches!(status, ButtonStatus::Pressed) {
            Color::from_rgb8(0x6c, 0x16, 0x25)
        } else {
            Color::from_rgb8(0x3a, 0x12, 0x1c)
        };
        ButtonStyle {
            background: Some(Background::Color(background)),
            border: Border {
                radius: Radius::from(10.0),
                width: 1.0,
                color: RED,
            },
            text_color: Color::from_rgb8(0xff, 0xe3, 0xe6),
            ..ButtonStyle::default()
        }
    }
}

pub(super) fn text_input() -> impl Fn(&Theme, InputStatus) -> text_input::Style + Copy {
    move |_theme, status| {
        let border_color = match status {
            InputStatus::Focused => GOLD,
            _ => SLATE_LIGHT,
        };
        text_input::Style {
            background: Background::Color(Color::from_rgb8(10, 13, 24)),
            border: Border {
                radius: Radius::from(10.0),
                width: 1.2,
                color: border_color,
            },
            icon: Color::WHITE,
            placeholder: Color::from_rgb8(0x6b, 0x74, 0x8f),
            value: Color::from_rgb8(0xf1, 0xf4, 0xfb),
            selection: with_alpha(GOLD, 0.5),
        }
    }
}

pub(super) fn overlay_backdrop() -> impl Fn(&Theme) -> container::Style + Copy {
    // Dimmed backdrop behind an open modal.
    |_| container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
        ..Default::default()
    }
}

pub(super) fn modal_panel() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| container::Style {
        background: Some(Background::Color(Color::from_rgba(0.06, 0.08, 0.15, 0.98))),
        border: Border {
            radius: Radius::from(18.0),
            width: 1.5,
            color: GOLD,
        },
        shadow: iced::Shadow {
            color: with_alpha(GOLD, 0.2),
            blur_radius: 12.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub(super) fn with_alpha(mut color: Color, alpha: f32) -> Color {
    color.a = alpha;
    color
}
