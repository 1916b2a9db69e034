use iced::{Background, Border, Color, Theme, Vector};

use crate::app::helpers::palette;
use crate::app::types::BannerKind;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TabStyle {
    pub(crate) active: bool,
}

impl iced::widget::button::StyleSheet for TabStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> iced::widget::button::Appearance {
        let (background, text_color) = if self.active {
            (palette::surface(), palette::primary())
        } else {
            (palette::background(), palette::text_muted())
        };

        iced::widget::button::Appearance {
            background: Some(Background::Color(background)),
            text_color,
            border: Border {
                color: palette::divider(),
                width: 1.0,
                radius: [8.0, 8.0, 0.0, 0.0].into(),
            },
            shadow_offset: if self.active {
                Vector::new(0.0, 0.0)
            } else {
                Vector::new(0.0, 1.0)
            },
            ..iced::widget::button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let mut appearance = self.active(style);
        if !self.active {
            appearance.background = Some(Background::Color(lift(palette::background(), 0.05)));
        }
        appearance
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ActionButtonStyle {
    pub(crate) fill: Color,
    pub(crate) text: Color,
}

impl ActionButtonStyle {
    pub(crate) fn primary() -> Self {
        Self {
            fill: palette::primary(),
            text: palette::secondary(),
        }
    }

    pub(crate) fn upload() -> Self {
        Self {
            fill: Color::from_rgb8(0x25, 0x63, 0xeb),
            text: Color::WHITE,
        }
    }

    pub(crate) fn tile() -> Self {
        Self {
            fill: palette::surface(),
            text: palette::text(),
        }
    }

    pub(crate) fn ghost() -> Self {
        Self {
            fill: Color::TRANSPARENT,
            text: palette::text_muted(),
        }
    }
}

impl iced::widget::button::StyleSheet for ActionButtonStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> iced::widget::button::Appearance {
        iced::widget::button::Appearance {
            background: Some(Background::Color(self.fill)),
            text_color: self.text,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 14.0.into(),
            },
            ..iced::widget::button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let mut appearance = self.active(style);
        appearance.background = Some(Background::Color(lift(self.fill, 0.06)));
        appearance
    }

    fn disabled(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let mut appearance = self.active(style);
        appearance.background = Some(Background::Color(Color {
            a: 0.4,
            ..self.fill
        }));
        appearance.text_color = Color {
            a: 0.5,
            ..self.text
        };
        appearance
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CardStyle {
    pub(crate) background: Color,
    pub(crate) border: Color,
}

impl CardStyle {
    pub(crate) fn surface() -> Self {
        Self {
            background: palette::surface(),
            border: Color::from_rgba8(0xff, 0xff, 0xff, 0.05),
        }
    }

    pub(crate) fn credits() -> Self {
        Self {
            background: Color::from_rgb8(0x05, 0x96, 0x69),
            border: Color::TRANSPARENT,
        }
    }

    pub(crate) fn deposit() -> Self {
        Self {
            background: Color::from_rgba8(0x10, 0xb9, 0x81, 0.1),
            border: Color::from_rgba8(0x10, 0xb9, 0x81, 0.3),
        }
    }

    pub(crate) fn info() -> Self {
        Self {
            background: Color::from_rgba8(0x38, 0xbd, 0xf8, 0.1),
            border: Color::TRANSPARENT,
        }
    }

    pub(crate) fn code() -> Self {
        Self {
            background: Color::WHITE,
            border: Color::TRANSPARENT,
        }
    }

    pub(crate) fn banner(kind: BannerKind) -> Self {
        match kind {
            BannerKind::Success => Self {
                background: Color::from_rgb8(0x06, 0x4e, 0x3b),
                border: Color::from_rgb8(0x4a, 0xde, 0x80),
            },
            BannerKind::Failure => Self {
                background: Color::from_rgb8(0x4c, 0x1d, 0x1d),
                border: Color::from_rgb8(0xe0, 0x4f, 0x4f),
            },
        }
    }
}

impl iced::widget::container::StyleSheet for CardStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::container::Appearance {
        iced::widget::container::Appearance {
            text_color: None,
            background: Some(Background::Color(self.background)),
            border: Border {
                color: self.border,
                width: 1.0,
                radius: 20.0.into(),
            },
            ..iced::widget::container::Appearance::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PageStyle {
    pub(crate) background: Color,
}

impl iced::widget::container::StyleSheet for PageStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::container::Appearance {
        iced::widget::container::Appearance {
            text_color: Some(palette::text()),
            background: Some(Background::Color(self.background)),
            ..iced::widget::container::Appearance::default()
        }
    }
}

fn lift(color: Color, amount: f32) -> Color {
    Color {
        r: (color.r + amount).min(1.0),
        g: (color.g + amount).min(1.0),
        b: (color.b + amount).min(1.0),
        a: color.a,
    }
}
