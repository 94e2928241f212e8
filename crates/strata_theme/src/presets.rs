//! Built-in starter registry
//!
//! A ready-made light/dark registry with sub-scheme accents and component
//! sub-themes, so hosts can render something sensible before loading their own
//! definitions and tests have a realistic fixture.

use crate::registry::{ThemeRegistry, TokenTable};
use crate::tokens::TokenValue;

fn theme(pairs: &[(&str, TokenValue)]) -> TokenTable {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn color(hex: &str) -> TokenValue {
    TokenValue::from(hex)
}

/// Build the built-in starter registry.
///
/// Contains `light` and `dark` base themes, `blue` sub-scheme accents, and
/// `Button` component sub-themes for each, wired so that every resolution path
/// (prefix composition, component narrowing, inversion) has somewhere to land.
pub fn starter_registry() -> ThemeRegistry {
    ThemeRegistry::new()
        .with_theme(
            "light",
            theme(&[
                ("background", color("#ffffff")),
                ("background_hover", color("#f4f4f5")),
                ("color", color("#1a1a2e")),
                ("color_muted", color("#71717a")),
                ("border_color", color("#e4e4e7")),
                ("accent", color("#3366cc")),
                ("radius", TokenValue::Number(8.0)),
            ]),
        )
        .with_theme(
            "dark",
            theme(&[
                ("background", color("#09090b")),
                ("background_hover", color("#18181b")),
                ("color", color("#fafafa")),
                ("color_muted", color("#a1a1aa")),
                ("border_color", color("#27272a")),
                ("accent", color("#5588ee")),
                ("radius", TokenValue::Number(8.0)),
            ]),
        )
        .with_theme(
            "light_blue",
            theme(&[
                ("background", color("#eef3fb")),
                ("accent", color("#1d4ed8")),
            ]),
        )
        .with_theme(
            "dark_blue",
            theme(&[
                ("background", color("#0b1220")),
                ("accent", color("#60a5fa")),
            ]),
        )
        .with_theme(
            "light_Button",
            theme(&[
                ("background", color("#eeeeee")),
                ("background_hover", color("#e0e0e3")),
            ]),
        )
        .with_theme(
            "dark_Button",
            theme(&[
                ("background", color("#222226")),
                ("background_hover", color("#2c2c31")),
            ]),
        )
        .with_theme(
            "light_blue_Button",
            theme(&[("background", color("#dbe7fa"))]),
        )
}
