//! The colour palette shared by every dashboard chart.

/// The named chart colours.
///
/// Not every name the charts ask for is in here, `warningLight` in
/// particular. Callers use [color_or] with a hard-coded fallback for those.
const CHART_COLORS: &[(&str, &str)] = &[
    ("primary", "#3498db"),
    ("secondary", "#2c3e50"),
    ("success", SUCCESS),
    ("danger", DANGER),
    ("warning", "#f39c12"),
    ("info", "#1abc9c"),
    ("light", "#ecf0f1"),
    ("dark", "#34495e"),
    ("primaryLight", "rgba(52, 152, 219, 0.2)"),
    ("dangerLight", DANGER_LIGHT),
    ("successLight", SUCCESS_LIGHT),
];

const SUCCESS: &str = "#2ecc71";
const SUCCESS_LIGHT: &str = "rgba(46, 204, 113, 0.2)";
const DANGER: &str = "#e74c3c";
const DANGER_LIGHT: &str = "rgba(231, 76, 60, 0.2)";

pub(super) const WARNING_FALLBACK: &str = "#f39c12";
pub(super) const WARNING_LIGHT_FALLBACK: &str = "rgba(243, 156, 18, 0.2)";

/// Look up a named chart colour.
pub(super) fn color(name: &str) -> Option<&'static str> {
    CHART_COLORS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

/// Look up a named chart colour, using `fallback` if the palette does not have it.
pub(super) fn color_or(name: &str, fallback: &'static str) -> &'static str {
    color(name).unwrap_or(fallback)
}

/// The fill and border colour of one bar or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ColorPair {
    pub fill: &'static str,
    pub border: &'static str,
}

/// The colours for successful recognitions.
pub(super) fn success_colors() -> ColorPair {
    ColorPair {
        fill: SUCCESS_LIGHT,
        border: SUCCESS,
    }
}

/// The colours for middling success rates.
pub(super) fn warning_colors() -> ColorPair {
    ColorPair {
        fill: color_or("warningLight", WARNING_LIGHT_FALLBACK),
        border: color_or("warning", WARNING_FALLBACK),
    }
}

/// The colours for failed recognitions.
pub(super) fn danger_colors() -> ColorPair {
    ColorPair {
        fill: DANGER_LIGHT,
        border: DANGER,
    }
}

#[cfg(test)]
mod palette_tests {
    use super::{WARNING_LIGHT_FALLBACK, color, color_or, warning_colors};

    #[test]
    fn known_names_resolve() {
        assert_eq!(color("success"), Some("#2ecc71"));
        assert_eq!(color("dangerLight"), Some("rgba(231, 76, 60, 0.2)"));
    }

    #[test]
    fn warning_light_is_not_in_the_palette() {
        assert_eq!(color("warningLight"), None);
        assert_eq!(
            color_or("warningLight", WARNING_LIGHT_FALLBACK),
            "rgba(243, 156, 18, 0.2)"
        );
    }

    #[test]
    fn warning_colors_use_fallback_fill() {
        let colors = warning_colors();

        assert_eq!(colors.fill, "rgba(243, 156, 18, 0.2)");
        assert_eq!(colors.border, "#f39c12");
    }
}
