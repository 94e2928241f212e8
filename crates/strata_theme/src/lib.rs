//! Strata Theme System
//!
//! Scoped theme resolution for component trees: named token tables, a
//! CSS-cascade-like name resolver, a tree of theme scopes, and fine-grained
//! per-consumer change tracking.
//!
//! # Overview
//!
//! A [`ThemeRegistry`] maps theme names (`light`, `dark_blue`,
//! `light_Button`) to flat token tables. Components that introduce a theme
//! scope own a [`ScopeNode`]; nested scopes compose their requested name
//! against the parent's prefix chain, optionally narrowed by a component-type
//! hint or flipped to the opposite light/dark scheme. Token lookups walk the
//! scope chain upward, and each scope records which keys each consumer read so
//! a later theme change only notifies the consumers it actually affects.
//!
//! # Quick Start
//!
//! ```rust
//! use strata_theme::{starter_registry, ScopeNode, ScopeParent, ThemeRequest};
//!
//! let registry = starter_registry();
//!
//! // The app root picks a theme.
//! let root = ScopeNode::new(
//!     ScopeParent::Root,
//!     Some(ThemeRequest::named("light")),
//!     &registry,
//! );
//!
//! // A button deeper in the tree narrows the scope by component type.
//! let button = ScopeNode::new(
//!     ScopeParent::from(&root),
//!     Some(ThemeRequest::default().with_component("Button")),
//!     &registry,
//! );
//! assert_eq!(button.full_name(), "light_Button");
//!
//! // Unresolved keys fall through to ancestor scopes.
//! assert!(button.get_value("color").is_some());
//! ```
//!
//! # Architecture
//!
//! - **Resolution is pure**: [`resolve`](resolve()) is a function of the
//!   request, the parent's resolved name, and the registry. The registry is
//!   swapped wholesale, never mutated, so reads need no coordination.
//! - **Scopes collapse**: a nested scope whose resolution changes nothing
//!   yields its parent instead of allocating a redundant node.
//! - **Invalidation is fine-grained**: a committed change computes the
//!   changed-key set between old and new tables and notifies only consumers
//!   whose tracked keys intersect it.
//!
//! # Loading themes
//!
//! Registries deserialize from TOML ([`ThemeRegistry::from_toml_str`]); a
//! built-in [`starter_registry`] covers bootstrapping and tests.

pub mod error;
pub mod name;
pub mod presets;
pub mod registry;
pub mod resolve;
pub mod scope;
pub mod tokens;
pub mod tracking;

// Re-export commonly used types
pub use error::ThemeError;
pub use name::{invert_scheme, CLASSNAME_PREFIX, THEME_SEPARATOR};
pub use presets::starter_registry;
pub use registry::{current, install, ThemeRegistry, TokenTable};
pub use resolve::{candidate_names, resolve, ParentScope, ResolvedState, ThemeRequest};
pub use scope::{ScopeNode, ScopeParent};
pub use tokens::{Rgba, TokenValue};
pub use tracking::{ConsumerId, ListenerId, ThemeCallback};
