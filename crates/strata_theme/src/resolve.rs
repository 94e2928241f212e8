//! Candidate-name generation and theme resolution
//!
//! Resolution is a pure function from a configuration request, the parent
//! scope's resolved name, and a registry to a new resolved state. It works like
//! a CSS cascade: every prefix of the parent's name is combined with the
//! requested name and component hint, most specific combination first, and the
//! first candidate present in the registry wins.

use crate::name::{
    class_name_for, invert_scheme, join_segments, prefix_chain, strip_component_suffix,
    THEME_SEPARATOR,
};
use crate::registry::{ThemeRegistry, TokenTable};
use smallvec::SmallVec;
use std::sync::Arc;

/// Configuration request describing what a scope wants from resolution.
///
/// Immutable per resolution attempt. Unset fields inherit from the scope chain.
#[derive(Clone, Debug, Default)]
pub struct ThemeRequest {
    /// Requested theme name, composed against the parent's prefix chain.
    pub name: Option<String>,
    /// Component-type hint narrowing the selection (`"Button"`).
    pub component: Option<String>,
    /// Swap the light/dark scheme segment of every candidate.
    pub inverse: bool,
    /// Resolve `name` directly, escaping the inherited scope chain.
    pub reset: bool,
    /// Explicit token table that bypasses name resolution entirely.
    pub explicit_table: Option<Arc<TokenTable>>,
}

impl ThemeRequest {
    /// Request a named theme.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Narrow the selection with a component-type hint.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Invert the inherited light/dark scheme.
    pub fn inverted(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// Escape the inherited scope chain and resolve the name directly.
    pub fn with_reset(mut self) -> Self {
        self.reset = true;
        self
    }

    /// Supply a token table directly, bypassing the resolver.
    pub fn with_table(mut self, table: Arc<TokenTable>) -> Self {
        self.explicit_table = Some(table);
        self
    }
}

/// Snapshot of the parent-scope inputs resolution depends on.
#[derive(Clone, Debug)]
pub struct ParentScope {
    /// The parent's resolved theme name.
    pub name: String,
    /// Whether the parent's own request asked for a reset.
    pub requested_reset: bool,
}

/// State produced by resolution.
///
/// `table` is `None` only in the transient no-match case; a scope node never
/// commits such a state and keeps its previous one instead.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedState {
    /// Winning theme name.
    pub name: String,
    /// Token table the name maps to, shared with the registry.
    pub table: Option<Arc<TokenTable>>,
    /// CSS-class-like identifier derived from the name.
    pub class_name: String,
}

impl ResolvedState {
    /// The pre-resolution sentinel state.
    pub(crate) fn empty() -> Self {
        Self {
            name: "-".to_string(),
            table: None,
            class_name: String::new(),
        }
    }
}

/// The base name candidates are composed from.
///
/// A parent that requested reset pins its descendants to its *resolved* name.
/// An inverse request without an explicit name flips the inherited name, so
/// the parent's resolved name participates there too.
fn base_name<'a>(request: &'a ThemeRequest, parent: Option<&'a ParentScope>) -> &'a str {
    let parent_name = parent.map(|p| p.name.as_str()).unwrap_or("");
    if parent.is_some_and(|p| p.requested_reset) {
        return parent_name;
    }
    if let Some(name) = request.name.as_deref() {
        return name;
    }
    if request.inverse {
        return parent_name;
    }
    ""
}

/// Generate the prioritized candidate-name list for a request.
///
/// For each prefix of the parent's resolved name (most specific first) the
/// combinations `prefix_name_component`, `prefix_name`, and `prefix_component`
/// are emitted in that order; the bare base name is the final fallback. With
/// `inverse`, every candidate is scheme-swapped.
pub fn candidate_names(
    request: &ThemeRequest,
    parent: Option<&ParentScope>,
) -> SmallVec<[String; 8]> {
    let parent_name = parent.map(|p| p.name.as_str()).unwrap_or("");
    let next_name = base_name(request, parent);

    let component = request.component.as_deref().map(|component| {
        if next_name.is_empty() {
            component.to_string()
        } else {
            format!(
                "{}{}{}",
                strip_component_suffix(next_name),
                THEME_SEPARATOR,
                component
            )
        }
    });

    let mut candidates: SmallVec<[String; 8]> = SmallVec::new();
    for prefix in prefix_chain(parent_name) {
        if let Some(component) = component.as_deref() {
            if !next_name.is_empty() {
                candidates.push(join_segments(&[&prefix, next_name, component]));
            }
        }
        if !next_name.is_empty() {
            candidates.push(join_segments(&[&prefix, next_name]));
        }
        if let Some(component) = component.as_deref() {
            candidates.push(join_segments(&[&prefix, component]));
        }
    }
    candidates.push(next_name.to_string());

    if request.inverse {
        for candidate in candidates.iter_mut() {
            *candidate = invert_scheme(candidate);
        }
    }
    candidates
}

/// Resolve a request against a parent snapshot and a registry.
///
/// Pure: repeated calls with the same inputs produce value-equal states. A miss
/// everywhere falls back to whatever the bare base name maps to, which may be
/// nothing; committing (or not) that state is the scope node's decision.
pub fn resolve(
    request: &ThemeRequest,
    parent: Option<&ParentScope>,
    registry: &ThemeRegistry,
) -> ResolvedState {
    // A reset escapes the inherited chain entirely.
    if request.reset {
        if let Some(name) = request.name.as_deref() {
            return ResolvedState {
                name: name.to_string(),
                table: registry.get(name).cloned(),
                class_name: class_name_for(name, false),
            };
        }
    }

    let candidates = candidate_names(request, parent);
    let mut winner = base_name(request, parent).to_string();
    for candidate in &candidates {
        if !candidate.is_empty() && registry.contains(candidate) {
            winner = candidate.clone();
            break;
        }
    }
    tracing::trace!(
        winner = %winner,
        tried = candidates.len(),
        "theme name resolved"
    );

    ResolvedState {
        table: registry.get(&winner).cloned(),
        class_name: class_name_for(&winner, request.inverse),
        name: winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenValue;

    fn table(pairs: &[(&str, &str)]) -> TokenTable {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), TokenValue::from(*value)))
            .collect()
    }

    fn registry() -> ThemeRegistry {
        ThemeRegistry::new()
            .with_theme("light", table(&[("bg", "#fff")]))
            .with_theme("dark", table(&[("bg", "#000")]))
            .with_theme("light_Button", table(&[("bg", "#eee")]))
            .with_theme("light_blue", table(&[("bg", "#cce")]))
    }

    fn under(name: &str) -> ParentScope {
        ParentScope {
            name: name.to_string(),
            requested_reset: false,
        }
    }

    #[test]
    fn reset_ignores_parent_chain() {
        let registry = registry();
        let request = ThemeRequest::named("dark").with_reset();
        let state = resolve(&request, Some(&under("light_blue")), &registry);
        assert_eq!(state.name, "dark");
        assert_eq!(state.table.as_deref(), registry.get("dark").map(Arc::as_ref));
    }

    #[test]
    fn candidates_run_most_specific_first() {
        let request = ThemeRequest::named("blue").with_component("Button");
        let candidates = candidate_names(&request, Some(&under("dark_alt")));
        assert_eq!(
            candidates.as_slice(),
            [
                "dark_alt_blue_blue_Button",
                "dark_alt_blue",
                "dark_alt_blue_Button",
                "dark_blue_blue_Button",
                "dark_blue",
                "dark_blue_Button",
                "blue",
            ]
        );
        // bare requested name is always the final fallback
        assert_eq!(candidates.last().map(String::as_str), Some("blue"));
    }

    #[test]
    fn component_hint_narrows_inherited_scope() {
        let registry = registry();
        let request = ThemeRequest::default().with_component("Button");
        let state = resolve(&request, Some(&under("light")), &registry);
        assert_eq!(state.name, "light_Button");
        assert_eq!(state.class_name, "t_Button");
    }

    #[test]
    fn inversion_flips_inherited_scheme() {
        let registry = registry();
        let request = ThemeRequest::default().inverted();
        let state = resolve(&request, Some(&under("light")), &registry);
        assert_eq!(state.name, "dark");
        assert_eq!(state.class_name, "t_dark");
    }

    #[test]
    fn inversion_keeps_subtheme_segments() {
        let registry = registry()
            .with_theme("dark_blue", table(&[("bg", "#113")]));
        let request = ThemeRequest::default().inverted();
        let state = resolve(&request, Some(&under("light_blue")), &registry);
        assert_eq!(state.name, "dark_blue");
    }

    #[test]
    fn parent_reset_pins_descendants_to_resolved_name() {
        let registry = registry();
        let parent = ParentScope {
            name: "dark".to_string(),
            requested_reset: true,
        };
        let request = ThemeRequest::default().with_component("Button");
        let candidates = candidate_names(&request, Some(&parent));
        assert_eq!(candidates.first().map(String::as_str), Some("dark_dark_dark_Button"));
        // the resolver still lands on the parent's theme when nothing narrower exists
        let state = resolve(&request, Some(&parent), &registry);
        assert_eq!(state.name, "dark");
    }

    #[test]
    fn resolution_is_idempotent() {
        let registry = registry();
        let request = ThemeRequest::named("blue").with_component("Button");
        let first = resolve(&request, Some(&under("light")), &registry);
        let second = resolve(&request, Some(&under("light")), &registry);
        assert_eq!(first, second);
    }

    #[test]
    fn miss_everywhere_keeps_base_name_without_table() {
        let registry = registry();
        let request = ThemeRequest::named("nonexistent");
        let state = resolve(&request, Some(&under("light")), &registry);
        assert_eq!(state.name, "nonexistent");
        assert!(state.table.is_none());
    }

    #[test]
    fn empty_request_without_parent_degenerates() {
        let registry = registry();
        let state = resolve(&ThemeRequest::default(), None, &registry);
        assert_eq!(state.name, "");
        assert!(state.table.is_none());
    }
}
