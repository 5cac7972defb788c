//! # Styleforge - Design-Token Stylesheet Compiler
//!
//! `styleforge` wraps the compiler core with the entry point bundler-plugin
//! collaborators consume: load configuration onto one [`StyleSheet`]
//! instance, then [`compile`] it into named text artifacts: the stylesheet
//! itself, or a companion runtime script exposing recipe/utility class-name
//! functions.
//!
//! The library performs no I/O and owns no persisted state; its only
//! contract is deterministic text generation from the in-memory IR.
//!
//! ## Quick Start
//!
//! ```rust
//! use styleforge::{compile, ArtifactKind, Selector, StyleSheet};
//!
//! let mut sheet = StyleSheet::new();
//! let primary = sheet.token("colors.primary", "#336").unwrap();
//! sheet
//!     .selector(Selector::new(".btn").decl("backgroundColor", primary))
//!     .unwrap();
//!
//! let artifacts = compile(&sheet, ArtifactKind::Stylesheet).unwrap();
//! assert_eq!(artifacts[0].name, "styleforge.css");
//! assert!(artifacts[0].source.contains("background-color"));
//! ```

mod compile;

// Compile entry point
pub use compile::{compile, compile_with_options, Artifact, ArtifactKind};

// Core re-exports (the full builder and generation surface)
pub use styleforge_core::{
    combinations, dash_case, default_variable_name, escape_class, generate, generate_default,
    AtRule, AtRuleKind, CompileError, CompoundVariant, DeclEntry, DeclFn, DeclarationBlock,
    Fragment, FragmentPart, GenerateOptions, Keyframes, Modifier, NameFn, Node, Recipe,
    RecipeHandle, RecipeInstance, Reference, Resolver, Root, Selector, StyleSheet, ThemeDef,
    TokenValue, TransformFn, Utility, UtilityHandle, UtilityNameFn, Variable,
};
