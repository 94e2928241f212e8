//! Theme registry: named token tables
//!
//! The registry is a flat mapping from theme name to token table. It is a pure
//! value during a render pass: hosts swap it wholesale (see [`install`]) and
//! never mutate it in place, so any number of scopes may read it concurrently.
//!
//! The resolver always receives a registry as an explicit parameter; the
//! process-wide [`current`] registry is a host convenience only.

use crate::error::ThemeError;
use crate::tokens::TokenValue;
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Flat mapping from token key to opaque token value.
pub type TokenTable = FxHashMap<String, TokenValue>;

/// Immutable-at-read-time mapping from theme name to token table.
///
/// Tables are shared via `Arc` so resolved scope states can alias them without
/// copying; table identity (`Arc::ptr_eq`) is what lets a child scope detect
/// that it resolved to exactly its parent's table.
#[derive(Clone, Debug, Default)]
pub struct ThemeRegistry {
    themes: FxHashMap<String, Arc<TokenTable>>,
}

impl ThemeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from a TOML document.
    ///
    /// Each top-level table is a theme; keys hold numbers, hex colors, or text:
    ///
    /// ```toml
    /// [light]
    /// background = "#ffffff"
    /// color = "#1a1a2e"
    ///
    /// [light_Button]
    /// background = "#eeeeee"
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self, ThemeError> {
        let themes: FxHashMap<String, TokenTable> = toml::from_str(document)?;
        let mut registry = Self::new();
        for (name, table) in themes {
            registry.insert(name, table);
        }
        Ok(registry)
    }

    /// Add or replace a theme.
    pub fn insert(&mut self, name: impl Into<String>, table: TokenTable) {
        self.themes.insert(name.into(), Arc::new(table));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_theme(mut self, name: impl Into<String>, table: TokenTable) -> Self {
        self.insert(name, table);
        self
    }

    /// Look up a theme's token table.
    pub fn get(&self, name: &str) -> Option<&Arc<TokenTable>> {
        self.themes.get(name)
    }

    /// Look up a theme's token table, erroring when absent.
    pub fn require(&self, name: &str) -> Result<&Arc<TokenTable>, ThemeError> {
        self.get(name)
            .ok_or_else(|| ThemeError::UnknownTheme(name.to_string()))
    }

    /// Whether a theme with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Iterate over registered theme names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Number of registered themes.
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Whether the registry holds no themes.
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Process-wide current registry, swapped wholesale by [`install`].
static CURRENT: RwLock<Option<Arc<ThemeRegistry>>> = RwLock::new(None);

/// Install a registry as the process-wide current one, replacing any previous.
///
/// Returns the shared handle so the caller can keep resolving against the same
/// snapshot it installed.
pub fn install(registry: ThemeRegistry) -> Arc<ThemeRegistry> {
    let shared = Arc::new(registry);
    *CURRENT.write().unwrap() = Some(Arc::clone(&shared));
    tracing::debug!(themes = shared.len(), "theme registry installed");
    shared
}

/// The process-wide current registry, if one has been installed.
pub fn current() -> Option<Arc<ThemeRegistry>> {
    CURRENT.read().unwrap().clone()
}
