//! # Styleforge Core - Design-Token Stylesheet Compiler
//!
//! `styleforge-core` is the compiler core of a design-token authoring tool.
//! Configuration code describes tokens, selectors, at-rules, utilities and
//! recipes through the builder API, assembling an in-memory IR under one
//! [`StyleSheet`] instance; the generator then walks the finished tree once
//! per build and emits deterministic stylesheet text.
//!
//! The core is synchronous and single-threaded, performs no I/O, and never
//! parses existing CSS: its only contract is deterministic text generation
//! from a tree built via the builder API. One instance per compile;
//! concurrent compiles use separate instances.
//!
//! ## Quick Start
//!
//! ```rust
//! use styleforge_core::{generate_default, Selector, StyleSheet};
//!
//! let mut sheet = StyleSheet::new();
//! let primary = sheet.token("colors.primary", "#336").unwrap();
//! sheet
//!     .selector(Selector::new(".btn").decl("backgroundColor", primary))
//!     .unwrap();
//!
//! let css = generate_default(sheet.root()).unwrap();
//! assert!(css.contains("--colors--primary: #336;"));
//! assert!(css.contains("background-color: var(--colors--primary);"));
//! ```
//!
//! ## Utilities and Modifiers
//!
//! Utility registration is two-phase: register a family to get a handle,
//! then expand it against a value-key mapping, optionally cross-multiplied
//! with modifier groups (at most one key per group per combination):
//!
//! ```rust
//! use std::sync::Arc;
//! use styleforge_core::{DeclarationBlock, Modifier, StyleSheet};
//!
//! let mut sheet = StyleSheet::new();
//! let bg = sheet
//!     .utility("bg", Arc::new(|value| {
//!         DeclarationBlock::new().decl("backgroundColor", value.clone())
//!     }))
//!     .unwrap();
//! let hover = Modifier::nest(&["hover"], |key| format!("&:{}", key));
//! let classes = sheet
//!     .expand(&bg, &[("red", "#f00".into())], &[hover])
//!     .unwrap();
//! assert_eq!(classes, ["bg:red", "bg:red:hover"]);
//! ```
//!
//! ## Recipes
//!
//! Recipes resolve a caller's partial selection against base declarations,
//! variant axes, defaults and compound variants:
//!
//! ```rust
//! use styleforge_core::{DeclarationBlock, Recipe, StyleSheet};
//!
//! let mut sheet = StyleSheet::new();
//! let button = sheet
//!     .recipe(
//!         Recipe::new("button")
//!             .base(DeclarationBlock::new().decl("display", "inline-flex"))
//!             .variant("size", "sm", DeclarationBlock::new().decl("padding", "4px"))
//!             .variant("size", "lg", DeclarationBlock::new().decl("padding", "12px"))
//!             .default_variant("size", "sm"),
//!     )
//!     .unwrap();
//!
//! let instance = sheet.resolve_recipe(&button, &[("size", "lg")]).unwrap();
//! assert_eq!(instance.class_name, "button:size:lg");
//! ```

pub mod builder;
pub mod combine;
mod error;
pub mod generate;
pub mod ir;
pub mod recipe;
pub mod resolver;
pub mod utility;

// Error type
pub use error::CompileError;

// Builder exports
pub use builder::{RecipeHandle, StyleSheet, UtilityHandle};

// IR exports
pub use ir::{
    AtRule, AtRuleKind, CompoundVariant, DeclEntry, DeclFn, DeclarationBlock, Fragment,
    FragmentPart, Keyframes, Modifier, Node, Recipe, Reference, Root, Selector, ThemeDef,
    TokenValue, TransformFn, Utility, Variable,
};

// Combination engine exports
pub use combine::combinations;

// Recipe resolver exports
pub use recipe::RecipeInstance;

// Reference resolver exports
pub use resolver::Resolver;

// Generator exports
pub use generate::{
    dash_case, default_variable_name, escape_class, generate, generate_default, GenerateOptions,
    NameFn, UtilityNameFn,
};
