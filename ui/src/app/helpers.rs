use iced::Color;

use bottleprint_core::StageMarker;

pub(crate) mod palette {
    use iced::Color;

    pub(crate) fn background() -> Color {
        Color::from_rgb8(0x0f, 0x17, 0x2a)
    }

    pub(crate) fn surface() -> Color {
        Color::from_rgb8(0x1e, 0x29, 0x3b)
    }

    pub(crate) fn divider() -> Color {
        Color::from_rgb8(0x33, 0x41, 0x55)
    }

    pub(crate) fn primary() -> Color {
        Color::from_rgb8(0x10, 0xb9, 0x81)
    }

    pub(crate) fn secondary() -> Color {
        Color::from_rgb8(0x06, 0x4e, 0x3b)
    }

    pub(crate) fn accent() -> Color {
        Color::from_rgb8(0x38, 0xbd, 0xf8)
    }

    pub(crate) fn text() -> Color {
        Color::from_rgb8(0xf8, 0xfa, 0xfc)
    }

    pub(crate) fn text_muted() -> Color {
        Color::from_rgb8(0x94, 0xa3, 0xb8)
    }

    pub(crate) fn ink() -> Color {
        Color::from_rgb8(0x0f, 0x17, 0x2a)
    }
}

pub(crate) fn level_color(level: tracing::Level) -> Color {
    match level {
        tracing::Level::ERROR => Color::from_rgb8(0xe0, 0x4f, 0x4f),
        tracing::Level::WARN => Color::from_rgb8(0xe0, 0xb0, 0x4f),
        tracing::Level::INFO => Color::from_rgb8(0x38, 0xbd, 0xf8),
        tracing::Level::DEBUG => Color::from_rgb8(0x4a, 0xde, 0x80),
        tracing::Level::TRACE => Color::from_rgb8(0x94, 0xa3, 0xb8),
    }
}

pub(crate) fn marker_glyph(marker: StageMarker) -> &'static str {
    match marker {
        StageMarker::Link => "((o))",
        StageMarker::Scan => "[|||]",
        StageMarker::Scale => "[kg]",
        StageMarker::Success => "[ok]",
    }
}

pub(crate) fn marker_color(marker: StageMarker) -> Color {
    match marker {
        StageMarker::Success => palette::primary(),
        StageMarker::Link | StageMarker::Scan | StageMarker::Scale => palette::accent(),
    }
}

/// Weight as shown on the job summary, e.g. `48.0 g`.
pub(crate) fn format_weight(grams: f64) -> String {
    format!("{grams:.1} g")
}

pub(crate) fn format_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

pub(crate) fn bottles_label(count: u32) -> String {
    if count == 1 {
        "1 Bottle".to_string()
    } else {
        format!("{count} Bottles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_250), "1,250");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn weight_has_one_decimal() {
        assert_eq!(format_weight(47.9964), "48.0 g");
        assert_eq!(format_weight(12.0), "12.0 g");
    }

    #[test]
    fn bottle_label_pluralises() {
        assert_eq!(bottles_label(1), "1 Bottle");
        assert_eq!(bottles_label(4), "4 Bottles");
    }
}
