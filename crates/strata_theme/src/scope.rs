//! Scope nodes: the theme manager tree
//!
//! Each node in a component tree that introduces a theme scope owns one
//! [`ScopeNode`]. Nodes hold upward references only (children point at
//! parents, never the reverse), so the tree cannot form reference cycles; the
//! host component tree governs structure and lifetime.
//!
//! A node's mutable state is written exclusively by its own
//! [`update_state`](ScopeNode::update_state), invoked synchronously from the
//! host's render pass; the registry itself is read-only and shared freely.

use crate::error::ThemeError;
use crate::registry::ThemeRegistry;
use crate::resolve::{resolve, ParentScope, ResolvedState, ThemeRequest};
use crate::tokens::TokenValue;
use crate::tracking::{changed_keys, ConsumerId, DependencyTracker, ListenerId, ThemeCallback};
use rustc_hash::FxHashSet;
use std::sync::{Arc, OnceLock, RwLock};

/// Parent slot for a new scope node.
pub enum ScopeParent {
    /// Top of the tree: resolve unconditionally and never delegate upward.
    Root,
    /// No enclosing scope.
    Detached,
    /// Nested under an existing scope.
    Node(Arc<ScopeNode>),
}

impl From<Arc<ScopeNode>> for ScopeParent {
    fn from(node: Arc<ScopeNode>) -> Self {
        Self::Node(node)
    }
}

impl From<&Arc<ScopeNode>> for ScopeParent {
    fn from(node: &Arc<ScopeNode>) -> Self {
        Self::Node(Arc::clone(node))
    }
}

/// A node in the theme scope tree.
///
/// Holds the committed [`ResolvedState`], an upward parent reference, the
/// memoized composite key and transitive key set, and per-consumer dependency
/// bookkeeping. Unresolved token lookups walk the ancestor chain.
pub struct ScopeNode {
    /// The configuration request this node was constructed with.
    request: Option<ThemeRequest>,
    /// Live parent, replaceable via [`set_parent`](Self::set_parent).
    parent: RwLock<Option<Arc<ScopeNode>>>,
    /// Parent captured at construction; survives later re-parenting and feeds
    /// [`all_keys`](Self::all_keys).
    original_parent: Option<Arc<ScopeNode>>,
    state: RwLock<ResolvedState>,
    /// Composite key, computed once per request instance.
    key: OnceLock<String>,
    /// Transitive key set, computed once on first access.
    all_keys: OnceLock<FxHashSet<String>>,
    tracker: DependencyTracker,
}

impl ScopeNode {
    /// Construct a scope node and resolve its initial state.
    ///
    /// When the resolution changes nothing relative to an existing parent, the
    /// parent itself is returned instead of a redundant node: nested scopes
    /// that add nothing collapse into their enclosing scope. Callers must not
    /// assume the returned node is a fresh allocation.
    pub fn new(
        parent: ScopeParent,
        request: Option<ThemeRequest>,
        registry: &ThemeRegistry,
    ) -> Arc<Self> {
        let (live_parent, original_parent, is_root) = match parent {
            ScopeParent::Root => (None, None, true),
            ScopeParent::Detached => (None, None, false),
            ScopeParent::Node(node) => (Some(Arc::clone(&node)), Some(node), false),
        };

        let node = Arc::new(Self {
            request,
            parent: RwLock::new(live_parent),
            original_parent,
            state: RwLock::new(ResolvedState::empty()),
            key: OnceLock::new(),
            all_keys: OnceLock::new(),
            tracker: DependencyTracker::default(),
        });

        let changed = node.update_state(None, false, false, registry);
        if is_root {
            return node;
        }
        if !changed {
            if let Some(parent) = node.original_parent.as_ref() {
                return Arc::clone(parent);
            }
        }
        node
    }

    /// Re-resolve this node's state, committing and notifying on change.
    ///
    /// Re-resolution is attempted when forced, when the node has no parent, or
    /// when the composite key of the effective request disagrees with the
    /// parent's key or this node's own memoized key; otherwise the expensive
    /// resolve is skipped. A request carrying an explicit table always wins
    /// and bypasses the resolver entirely.
    ///
    /// Returns whether the committed state changed.
    pub fn update_state(
        &self,
        request: Option<&ThemeRequest>,
        force: bool,
        should_notify: bool,
        registry: &ThemeRegistry,
    ) -> bool {
        let request = request.or(self.request.as_ref());

        if let Some(table) = request.and_then(|r| r.explicit_table.as_ref()) {
            let name = request
                .and_then(|r| r.name.clone())
                .unwrap_or_default();
            let changed = {
                let mut state = self.state.write().unwrap();
                let changed = changed_keys(state.table.as_deref(), Some(table.as_ref()));
                state.table = Some(Arc::clone(table));
                state.name = name.clone();
                changed
            };
            tracing::debug!(scope = %name, "explicit table committed");
            if should_notify {
                self.tracker.notify(&changed, &name, self);
            }
            return true;
        }

        let parent = self.parent.read().unwrap().clone();
        let mut should_try = force || parent.is_none();
        if !should_try {
            if let (Some(request), Some(parent)) = (request, parent.as_ref()) {
                let next_key = composite_key(request);
                if next_key != parent.key() || self.key() != next_key {
                    should_try = true;
                }
            } else {
                should_try = true;
            }
        }
        if !should_try {
            return false;
        }

        let Some(next) = self.preview_state(request, registry) else {
            return false;
        };
        let (changed, name) = {
            let mut state = self.state.write().unwrap();
            let changed = changed_keys(state.table.as_deref(), next.table.as_deref());
            tracing::debug!(from = %state.name, to = %next.name, "scope state committed");
            let name = next.name.clone();
            *state = next;
            (changed, name)
        };
        if should_notify {
            self.tracker.notify(&changed, &name, self);
        }
        true
    }

    /// Preview the state a resolution would produce, without committing it.
    ///
    /// `None` when there is no effective request, when the resolved table is
    /// empty or absent, or when the table is referentially identical to the
    /// parent's current table (an unchanged inherited table never needs its
    /// own scope).
    pub fn preview_state(
        &self,
        request: Option<&ThemeRequest>,
        registry: &ThemeRegistry,
    ) -> Option<ResolvedState> {
        let request = request.or(self.request.as_ref())?;
        let parent = self.parent.read().unwrap().clone();
        let parent_scope = parent.as_ref().map(|parent| ParentScope {
            name: parent.state.read().unwrap().name.clone(),
            requested_reset: parent
                .request
                .as_ref()
                .is_some_and(|request| request.reset),
        });

        let next = resolve(request, parent_scope.as_ref(), registry);
        let table = next.table.as_ref()?;
        if table.is_empty() {
            return None;
        }
        if let Some(parent) = parent.as_ref() {
            if let Some(parent_table) = parent.state.read().unwrap().table.as_ref() {
                if Arc::ptr_eq(table, parent_table) {
                    return None;
                }
            }
        }
        Some(next)
    }

    /// Look up a token value, walking to ancestors on miss.
    ///
    /// A key absent throughout the chain is `None`, never an error.
    pub fn get_value(&self, key: &str) -> Option<TokenValue> {
        {
            let state = self.state.read().unwrap();
            let table = state.table.as_ref()?;
            if let Some(value) = table.get(key) {
                return Some(value.clone());
            }
        }
        let mut current = self.parent.read().unwrap().clone();
        while let Some(node) = current {
            let next = {
                let state = node.state.read().unwrap();
                let table = match state.table.as_ref() {
                    Some(table) => table,
                    None => return None,
                };
                if let Some(value) = table.get(key) {
                    return Some(value.clone());
                }
                drop(state);
                node.parent.read().unwrap().clone()
            };
            current = next;
        }
        None
    }

    /// The composite key fingerprinting this node's request.
    ///
    /// Computed once per request instance and cached for the node's lifetime;
    /// a cheap comparison of keys short-circuits re-resolution. Asking for the
    /// key of a node that has no request is developer misuse: fatal in debug
    /// builds, an empty key in release builds.
    pub fn key(&self) -> &str {
        self.key.get_or_init(|| match self.request.as_ref() {
            Some(request) => composite_key(request),
            None => {
                debug_assert!(false, "{}", ThemeError::MissingRequest);
                tracing::warn!("composite key requested on a scope with no request");
                String::new()
            }
        })
    }

    /// Union of this node's table keys and the *original* parent's key set.
    ///
    /// Memoized on first access; later re-parenting does not change it.
    pub fn all_keys(&self) -> &FxHashSet<String> {
        self.all_keys.get_or_init(|| {
            let mut keys = self
                .original_parent
                .as_ref()
                .map(|parent| parent.all_keys().clone())
                .unwrap_or_default();
            if let Some(table) = self.state.read().unwrap().table.as_ref() {
                keys.extend(table.keys().cloned());
            }
            keys
        })
    }

    /// Snapshot of the committed resolved state.
    pub fn resolved(&self) -> ResolvedState {
        self.state.read().unwrap().clone()
    }

    /// The resolved theme name, falling back to the requested name.
    pub fn full_name(&self) -> String {
        let name = self.state.read().unwrap().name.clone();
        if !name.is_empty() {
            return name;
        }
        self.request
            .as_ref()
            .and_then(|request| request.name.clone())
            .unwrap_or_default()
    }

    /// The derived CSS-class-like identifier.
    pub fn class_name(&self) -> String {
        self.state.read().unwrap().class_name.clone()
    }

    /// The live parent's resolved name, if any.
    pub fn parent_name(&self) -> Option<String> {
        let parent = self.parent.read().unwrap().clone();
        parent.map(|parent| parent.state.read().unwrap().name.clone())
    }

    /// Replace the live parent reference.
    ///
    /// The original parent captured at construction is unaffected and keeps
    /// feeding [`all_keys`](Self::all_keys); passing `None` detaches the node,
    /// turning it into a root for value lookups.
    pub fn set_parent(&self, parent: Option<Arc<ScopeNode>>) {
        *self.parent.write().unwrap() = parent;
    }

    // ========== Dependency tracking ==========

    /// Record the token keys a consumer read, replacing any previous set.
    ///
    /// No-op while the node has no resolved name (no active scope to depend
    /// on).
    pub fn track<I>(&self, consumer: ConsumerId, keys: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.state.read().unwrap().name.is_empty() {
            return;
        }
        self.tracker
            .track(consumer, keys.into_iter().map(Into::into).collect());
    }

    /// Drop all bookkeeping for an unmounted consumer.
    pub fn untrack(&self, consumer: ConsumerId) {
        self.tracker.untrack(consumer);
    }

    /// Whether a non-empty key set is tracked for this consumer.
    pub fn is_tracking(&self, consumer: ConsumerId) -> bool {
        self.tracker.is_tracking(consumer)
    }

    /// Register the change callback for a tracked consumer.
    ///
    /// The callback fires only when a committed change touches a key the
    /// consumer tracks.
    pub fn listen<F>(&self, consumer: ConsumerId, callback: F)
    where
        F: Fn(&str, &ScopeNode) + Send + Sync + 'static,
    {
        self.tracker.listen(consumer, Arc::new(callback) as ThemeCallback);
    }

    /// Subscribe to structural theme changes (name / class-name swaps).
    ///
    /// Fires after per-consumer callbacks whenever a committed change affected
    /// at least one tracked consumer. Remove with
    /// [`remove_theme_listener`](Self::remove_theme_listener).
    pub fn on_change_theme<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&str, &ScopeNode) + Send + Sync + 'static,
    {
        self.tracker.subscribe(Arc::new(callback) as ThemeCallback)
    }

    /// Remove a structural subscriber registered via
    /// [`on_change_theme`](Self::on_change_theme).
    pub fn remove_theme_listener(&self, id: ListenerId) {
        self.tracker.unsubscribe(id);
    }
}

/// Build the composite key for a request.
///
/// Unset fields get a fixed placeholder so the key is always defined and
/// order-stable.
fn composite_key(request: &ThemeRequest) -> String {
    format!(
        "{}{}{}{}",
        request.name.as_deref().unwrap_or("0"),
        if request.inverse { "1" } else { "0" },
        if request.reset { "1" } else { "0" },
        request.component.as_deref().unwrap_or("0"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TokenTable;

    fn table(pairs: &[(&str, &str)]) -> TokenTable {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), TokenValue::from(*value)))
            .collect()
    }

    fn registry() -> ThemeRegistry {
        ThemeRegistry::new()
            .with_theme("light", table(&[("bg", "#fff"), ("color", "#111")]))
            .with_theme("dark", table(&[("bg", "#000"), ("color", "#eee")]))
            .with_theme("light_Button", table(&[("bg", "#eee")]))
            .with_theme("dark_blue", table(&[("bg", "#113"), ("accent", "#36c")]))
    }

    fn root(registry: &ThemeRegistry, name: &str) -> Arc<ScopeNode> {
        ScopeNode::new(
            ScopeParent::Root,
            Some(ThemeRequest::named(name)),
            registry,
        )
    }

    #[test]
    fn root_resolves_unconditionally() {
        let registry = registry();
        let node = root(&registry, "light");
        assert_eq!(node.full_name(), "light");
        assert_eq!(node.class_name(), "t_light");
        assert!(node.parent_name().is_none());
    }

    #[test]
    fn value_lookup_walks_ancestors() {
        let registry = registry();
        let parent = root(&registry, "light");
        let child = ScopeNode::new(
            ScopeParent::from(&parent),
            Some(ThemeRequest::default().with_component("Button")),
            &registry,
        );
        assert_eq!(child.full_name(), "light_Button");
        // own table
        assert_eq!(child.get_value("bg"), Some(TokenValue::from("#eee")));
        // inherited from the parent scope
        assert_eq!(child.get_value("color"), Some(TokenValue::from("#111")));
        // missing everywhere
        assert_eq!(child.get_value("nope"), None);
    }

    #[test]
    fn identical_child_collapses_into_parent() {
        let registry = registry();
        let parent = root(&registry, "light");
        let child = ScopeNode::new(
            ScopeParent::from(&parent),
            Some(ThemeRequest::named("light")),
            &registry,
        );
        assert!(Arc::ptr_eq(&parent, &child));
    }

    #[test]
    fn child_without_request_collapses_into_parent() {
        let registry = registry();
        let parent = root(&registry, "light");
        let child = ScopeNode::new(ScopeParent::from(&parent), None, &registry);
        assert!(Arc::ptr_eq(&parent, &child));
    }

    #[test]
    fn inverse_child_resolves_opposite_scheme() {
        let registry = registry();
        let parent = root(&registry, "light");
        let child = ScopeNode::new(
            ScopeParent::from(&parent),
            Some(ThemeRequest::default().inverted()),
            &registry,
        );
        assert_eq!(child.full_name(), "dark");
        assert_eq!(child.get_value("bg"), Some(TokenValue::from("#000")));
    }

    #[test]
    fn explicit_table_bypasses_resolution() {
        let registry = registry();
        let node = root(&registry, "light");
        let custom = Arc::new(table(&[("bg", "#abc")]));
        let request = ThemeRequest::named("custom").with_table(Arc::clone(&custom));
        assert!(node.update_state(Some(&request), false, false, &registry));
        assert_eq!(node.full_name(), "custom");
        assert_eq!(node.get_value("bg"), Some(TokenValue::from("#abc")));
    }

    #[test]
    fn preview_matches_committed_state_for_same_request() {
        let registry = registry();
        let parent = root(&registry, "light");
        let child = ScopeNode::new(
            ScopeParent::from(&parent),
            Some(ThemeRequest::default().with_component("Button")),
            &registry,
        );
        // same request against unchanged parent state resolves value-equal,
        // and an equal table means nothing to commit
        let preview = child.preview_state(None, &registry).unwrap();
        assert_eq!(preview, child.resolved());
    }

    #[test]
    fn all_keys_unions_original_ancestor_chain() {
        let registry = registry();
        let parent = root(&registry, "dark_blue");
        let child = ScopeNode::new(
            ScopeParent::from(&parent),
            Some(ThemeRequest::named("dark")),
            &registry,
        );
        let mut keys: Vec<&str> = child.all_keys().iter().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["accent", "bg", "color"]);
    }

    #[test]
    fn all_keys_survive_reparenting() {
        let registry = registry();
        let original = root(&registry, "dark_blue");
        let child = ScopeNode::new(
            ScopeParent::from(&original),
            Some(ThemeRequest::named("dark")),
            &registry,
        );
        let other = root(&registry, "light");
        child.set_parent(Some(Arc::clone(&other)));
        // live lookups now go through the new parent
        assert_eq!(child.parent_name().as_deref(), Some("light"));
        // but the transitive key set still reflects the original chain
        assert!(child.all_keys().contains("accent"));
    }

    #[test]
    fn detached_node_resolves_alone() {
        let registry = registry();
        let node = ScopeNode::new(
            ScopeParent::Detached,
            Some(ThemeRequest::named("dark")),
            &registry,
        );
        assert_eq!(node.full_name(), "dark");
        assert!(node.parent_name().is_none());
    }

    #[test]
    fn unresolvable_detached_node_keeps_empty_sentinel() {
        let registry = registry();
        let node = ScopeNode::new(
            ScopeParent::Detached,
            Some(ThemeRequest::named("missing")),
            &registry,
        );
        assert_eq!(node.resolved().name, "-");
        assert_eq!(node.get_value("bg"), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no theme request")]
    fn key_without_request_is_fatal_in_debug() {
        let registry = registry();
        let node = ScopeNode::new(ScopeParent::Root, None, &registry);
        let _ = node.key();
    }
}
