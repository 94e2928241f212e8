//! Theme name composition helpers
//!
//! Theme names are `_`-joined segment chains (`dark_blue_Button`). A name is a
//! descendant of another when it extends its prefix chain. These helpers are
//! pure string functions; the resolver in [`crate::resolve`] drives them.

/// Separator between theme name segments.
pub const THEME_SEPARATOR: &str = "_";

/// Prefix applied when deriving a CSS-class-like identifier from a theme name.
pub const CLASSNAME_PREFIX: &str = "t_";

const LIGHT: &str = "light";
const DARK: &str = "dark";

/// Every prefix of `name`, most specific first.
///
/// `"dark_blue"` yields `["dark_blue", "dark"]`. An empty name yields nothing.
pub(crate) fn prefix_chain(name: &str) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }
    let parts: Vec<&str> = name.split(THEME_SEPARATOR).collect();
    let mut prefixes: Vec<String> = (0..parts.len())
        .map(|i| parts[..=i].join(THEME_SEPARATOR))
        .collect();
    prefixes.reverse();
    prefixes
}

/// Join non-empty name segments with the theme separator.
pub(crate) fn join_segments(segments: &[&str]) -> String {
    segments.join(THEME_SEPARATOR)
}

/// Strip trailing `_Capitalized` component segments from a theme name.
///
/// Component sub-theme names end in one or more capitalized segments
/// (`dark_Button`, `dark_Input_Label`). Stripping is idempotent, so names
/// produced by a previous component composition round-trip cleanly.
pub(crate) fn strip_component_suffix(name: &str) -> &str {
    let mut end = name.len();
    while let Some(idx) = name[..end].rfind(THEME_SEPARATOR) {
        let segment = &name[idx + THEME_SEPARATOR.len()..end];
        let mut chars = segment.chars();
        let capitalized = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphabetic())
            && segment.len() >= 2;
        if !capitalized {
            break;
        }
        end = idx;
    }
    &name[..end]
}

/// Swap the leading `light`/`dark` scheme segment of a theme name.
///
/// Names that do not start with a scheme segment are returned unchanged.
pub fn invert_scheme(name: &str) -> String {
    let (scheme, flipped) = if name == LIGHT || name.starts_with("light_") {
        (LIGHT, DARK)
    } else if name == DARK || name.starts_with("dark_") {
        (DARK, LIGHT)
    } else {
        return name.to_string();
    };
    format!("{flipped}{}", &name[scheme.len()..])
}

/// Derive the CSS-class-like identifier for a resolved theme name.
///
/// The leading scheme segment is stripped so that toggling light/dark does not
/// churn class names, except when `keep_scheme` is set (inverse scopes keep
/// their scheme visible).
pub(crate) fn class_name_for(name: &str, keep_scheme: bool) -> String {
    let class = format!("{CLASSNAME_PREFIX}{name}");
    if keep_scheme {
        return class;
    }
    class.replacen("light_", "", 1).replacen("dark_", "", 1)
}
