//! Recipe variant resolution.
//!
//! A recipe resolves in two phases. Definition time ([`validate`]) checks
//! the stored tables: every default and every compound-variant match must
//! name a declared axis and a declared key. Instantiation time ([`resolve`])
//! takes a caller's partial selection and computes the final declarations
//! and class name. Both the compile-time resolver here and the companion
//! runtime script derive class names the same way; they must never drift.

use indexmap::IndexMap;

use crate::error::CompileError;
use crate::ir::{DeclarationBlock, Recipe};

/// Ephemeral result of instantiating a recipe: derived strings and merged
/// declarations, not new IR nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeInstance {
    pub class_name: String,
    pub declarations: DeclarationBlock,
}

/// Validates a recipe's tables at definition time.
///
/// # Errors
///
/// [`CompileError::UnknownVariantKey`] when a default names an undeclared
/// axis or key, or a compound match value names an undeclared key;
/// [`CompileError::InvalidCompoundVariant`] when a compound match names an
/// axis the recipe never declared.
pub fn validate(recipe: &Recipe) -> Result<(), CompileError> {
    for (axis, key) in &recipe.defaults {
        let keys = recipe
            .variants
            .get(axis)
            .ok_or_else(|| CompileError::UnknownVariantKey {
                recipe: recipe.name.clone(),
                axis: axis.clone(),
                key: key.clone(),
            })?;
        if !keys.contains_key(key) {
            return Err(CompileError::UnknownVariantKey {
                recipe: recipe.name.clone(),
                axis: axis.clone(),
                key: key.clone(),
            });
        }
    }

    for compound in &recipe.compounds {
        for (axis, value) in &compound.matches {
            let keys = recipe.variants.get(axis).ok_or_else(|| {
                CompileError::InvalidCompoundVariant {
                    recipe: recipe.name.clone(),
                    axis: axis.clone(),
                }
            })?;
            if !keys.contains_key(value) {
                return Err(CompileError::UnknownVariantKey {
                    recipe: recipe.name.clone(),
                    axis: axis.clone(),
                    key: value.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Resolves a caller's partial selection against a recipe.
///
/// Starting from the base block: axes absent from the selection substitute
/// their declared default (axes with neither are skipped); every resolved
/// axis merges its block in axis-declaration order, later axes overriding
/// earlier on conflicting properties; compound entries then apply in
/// declaration order when every matched axis equals its resolved value,
/// unmentioned axes acting as wildcards.
///
/// The class name is the recipe name plus an `axis:value` token for every
/// resolved axis whose value differs from its declared default (which
/// includes every resolved axis of a recipe without defaults), in
/// axis-declaration order. Unresolved axes are omitted, not an error.
///
/// # Errors
///
/// [`CompileError::UnknownVariantKey`] when the selection names an axis or
/// key the recipe never declared.
pub fn resolve(recipe: &Recipe, selection: &[(&str, &str)]) -> Result<RecipeInstance, CompileError> {
    for (axis, key) in selection {
        let keys = recipe
            .variants
            .get(*axis)
            .ok_or_else(|| CompileError::UnknownVariantKey {
                recipe: recipe.name.clone(),
                axis: axis.to_string(),
                key: key.to_string(),
            })?;
        if !keys.contains_key(*key) {
            return Err(CompileError::UnknownVariantKey {
                recipe: recipe.name.clone(),
                axis: axis.to_string(),
                key: key.to_string(),
            });
        }
    }

    let chosen: IndexMap<&str, &str> = selection.iter().copied().collect();

    // Resolve each axis in declaration order: explicit selection, else
    // declared default, else skipped.
    let mut resolved: IndexMap<&str, &str> = IndexMap::new();
    for axis in recipe.variants.keys() {
        let value = chosen
            .get(axis.as_str())
            .copied()
            .or_else(|| recipe.defaults.get(axis).map(String::as_str));
        if let Some(value) = value {
            resolved.insert(axis.as_str(), value);
        }
    }

    let mut block = recipe.base.clone();
    for (axis, value) in &resolved {
        if let Some(variant) = recipe.variants.get(*axis).and_then(|keys| keys.get(*value)) {
            block.merge(variant.clone());
        }
    }

    for compound in &recipe.compounds {
        let applies = compound
            .matches
            .iter()
            .all(|(axis, value)| resolved.get(axis.as_str()) == Some(&value.as_str()));
        if applies {
            block.merge(compound.declarations.clone());
        }
    }

    let mut class_name = recipe.name.clone();
    for (axis, value) in &resolved {
        let is_default = recipe.defaults.get(*axis).map(String::as_str) == Some(*value);
        if !is_default {
            class_name.push(':');
            class_name.push_str(axis);
            class_name.push(':');
            class_name.push_str(value);
        }
    }

    Ok(RecipeInstance {
        class_name,
        declarations: block,
    })
}
