//! Error types for IR construction and code generation.
//!
//! All errors are detected synchronously at the offending call and surfaced
//! to the immediate caller. Nothing is batched or deferred: a builder call
//! that would violate an invariant fails immediately, and the generator
//! aborts the whole compile rather than emitting partial output.

use thiserror::Error;

/// Error type for all compiler operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Two sibling nodes share a name in one scope.
    #[error("duplicate name '{name}' in {scope}")]
    DuplicateName { name: String, scope: String },

    /// A builder constructor was given an empty required name.
    #[error("{kind} requires a non-empty name")]
    EmptyName { kind: &'static str },

    /// A token reference named a variable that exists in no enclosing scope
    /// and carried no fallback.
    #[error("unresolved reference '{name}'")]
    UnresolvedReference { name: String },

    /// A variable's value refers back to itself, directly or through a chain
    /// of other variables.
    #[error("circular reference: {}", path.join(" -> "))]
    CircularReference { path: Vec<String> },

    /// A recipe selection (or default, or compound match value) named a key
    /// the axis never declared.
    #[error("unknown variant key '{key}' for axis '{axis}' of recipe '{recipe}'")]
    UnknownVariantKey {
        recipe: String,
        axis: String,
        key: String,
    },

    /// A compound variant entry matches on an axis the recipe never declared.
    #[error("compound variant on recipe '{recipe}' references undeclared axis '{axis}'")]
    InvalidCompoundVariant { recipe: String, axis: String },

    /// A handle was used against an instance that never registered it.
    #[error("unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },

    /// A numeric token value is NaN or infinite and has no stylesheet form.
    #[error("non-finite number has no stylesheet form")]
    NonFiniteNumber,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_display() {
        let err = CompileError::DuplicateName {
            name: "colors.primary".to_string(),
            scope: "root".to_string(),
        };
        assert!(err.to_string().contains("colors.primary"));
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn test_circular_reference_display_joins_path() {
        let err = CompileError::CircularReference {
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "circular reference: a -> b -> a");
    }

    #[test]
    fn test_unknown_variant_key_display() {
        let err = CompileError::UnknownVariantKey {
            recipe: "button".to_string(),
            axis: "size".to_string(),
            key: "xxl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("button"));
        assert!(msg.contains("size"));
        assert!(msg.contains("xxl"));
    }
}
