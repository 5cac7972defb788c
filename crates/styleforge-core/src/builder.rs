//! The builder API.
//!
//! A [`StyleSheet`] is one explicit compile instance: every constructor
//! takes `&mut StyleSheet` and mutates only its owned collections. There is
//! no ambient shared instance; a caller wiring several authoring files to
//! one compile passes the same instance to each (or uses [`StyleSheet::merge`]).
//!
//! Utility and recipe registration are two-phase. Registration returns an
//! explicit handle; instantiation is a separate call taking the handle, so
//! the two steps carry no hidden captured state and test independently:
//!
//! ```rust
//! use std::sync::Arc;
//! use styleforge_core::builder::StyleSheet;
//! use styleforge_core::ir::DeclarationBlock;
//!
//! let mut sheet = StyleSheet::new();
//! let bg = sheet
//!     .utility("bg", Arc::new(|value| {
//!         DeclarationBlock::new().decl("backgroundColor", value.clone())
//!     }))
//!     .unwrap();
//! let classes = sheet.expand(&bg, &[("red", "#f00".into())], &[]).unwrap();
//! assert_eq!(classes, ["bg:red"]);
//! ```

use indexmap::IndexMap;

use crate::error::CompileError;
use crate::ir::{
    AtRule, DeclFn, Keyframes, Modifier, Node, Recipe, Reference, Root, Selector, ThemeDef,
    TokenValue, TransformFn, Variable,
};
use crate::recipe::{self, RecipeInstance};
use crate::utility;

/// Handle returned by utility registration; pass it to
/// [`StyleSheet::expand`] to instantiate the family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityHandle {
    family: String,
}

impl UtilityHandle {
    pub fn family(&self) -> &str {
        &self.family
    }
}

/// Handle returned by recipe registration; pass it to
/// [`StyleSheet::resolve_recipe`] to instantiate a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeHandle {
    name: String,
}

impl RecipeHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct UtilityFamily {
    build: DeclFn,
}

/// One compile instance: the IR root plus the registries that never reach
/// the emitted tree (modifier transforms, utility declaration functions).
///
/// The contract is one instance per compile; concurrent compiles use
/// separate instances.
#[derive(Default)]
pub struct StyleSheet {
    root: Root,
    modifiers: IndexMap<String, Modifier>,
    families: IndexMap<String, UtilityFamily>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed IR, ready for the generator.
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// Registers a root-level token and returns a reference handle to it.
    ///
    /// # Errors
    ///
    /// [`CompileError::EmptyName`] for an empty name;
    /// [`CompileError::DuplicateName`] when a root variable already uses it.
    pub fn token(
        &mut self,
        name: impl Into<String>,
        value: impl Into<TokenValue>,
    ) -> Result<Reference, CompileError> {
        let name = name.into();
        require_name(&name, "token")?;
        if self.root.variables.iter().any(|v| v.name == name) {
            return Err(CompileError::DuplicateName {
                name,
                scope: "root".to_string(),
            });
        }
        self.root.variables.push(Variable::new(name.clone(), value));
        Ok(Reference::new(name))
    }

    /// Appends a selector tree to the root.
    ///
    /// # Errors
    ///
    /// [`CompileError::DuplicateName`] when two variables in the selector
    /// (or in any nested container) share a name within one scope.
    pub fn selector(&mut self, selector: Selector) -> Result<(), CompileError> {
        require_name(&selector.selector, "selector")?;
        check_scope_variables(&selector.selector, &selector.variables, &selector.children)?;
        self.root.children.push(Node::Selector(selector));
        Ok(())
    }

    /// Appends an at-rule container to the root. The condition passes
    /// through verbatim and may be empty (e.g. a bare `@layer`).
    pub fn at_rule(&mut self, at_rule: AtRule) -> Result<(), CompileError> {
        let scope = format!("@{}", at_rule.kind);
        check_scope_variables(&scope, &at_rule.variables, &at_rule.children)?;
        self.root.children.push(Node::AtRule(at_rule));
        Ok(())
    }

    /// Registers a named animation.
    pub fn keyframes(&mut self, keyframes: Keyframes) -> Result<(), CompileError> {
        require_name(&keyframes.name, "keyframes")?;
        let duplicate = self.root.children.iter().any(|node| {
            matches!(node, Node::Keyframes(existing) if existing.name == keyframes.name)
        });
        if duplicate {
            return Err(CompileError::DuplicateName {
                name: keyframes.name,
                scope: "keyframes".to_string(),
            });
        }
        self.root.children.push(Node::Keyframes(keyframes));
        Ok(())
    }

    /// Registers a modifier group and returns it for use with
    /// [`expand`](Self::expand).
    ///
    /// # Errors
    ///
    /// [`CompileError::DuplicateName`] when any key is already claimed by a
    /// previously registered modifier.
    pub fn modifier(
        &mut self,
        keys: &[&str],
        transform: TransformFn,
    ) -> Result<Modifier, CompileError> {
        if keys.is_empty() || keys.iter().any(|k| k.is_empty()) {
            return Err(CompileError::EmptyName { kind: "modifier" });
        }
        for key in keys {
            if self.modifiers.contains_key(*key) {
                return Err(CompileError::DuplicateName {
                    name: key.to_string(),
                    scope: "modifiers".to_string(),
                });
            }
        }
        let modifier = Modifier::new(keys, transform);
        for key in keys {
            self.modifiers.insert(key.to_string(), modifier.clone());
        }
        Ok(modifier)
    }

    /// Looks up a previously registered modifier by key.
    pub fn modifier_for(&self, key: &str) -> Option<&Modifier> {
        self.modifiers.get(key)
    }

    /// Registers a utility family.
    ///
    /// The declaration function runs once per value key at expansion time,
    /// receiving the raw token value; its result is stored verbatim.
    pub fn utility(
        &mut self,
        family: impl Into<String>,
        build: DeclFn,
    ) -> Result<UtilityHandle, CompileError> {
        let family = family.into();
        require_name(&family, "utility")?;
        if self.families.contains_key(&family) {
            return Err(CompileError::DuplicateName {
                name: family,
                scope: "utilities".to_string(),
            });
        }
        self.families
            .insert(family.clone(), UtilityFamily { build });
        Ok(UtilityHandle { family })
    }

    /// Instantiates a registered family against a value-key mapping,
    /// cross-multiplied with the given modifiers.
    ///
    /// Returns the derived class names in expansion order. An empty value
    /// mapping is allowed and produces nothing. A family may be expanded
    /// repeatedly with different value sets.
    pub fn expand(
        &mut self,
        handle: &UtilityHandle,
        values: &[(&str, TokenValue)],
        modifiers: &[Modifier],
    ) -> Result<Vec<String>, CompileError> {
        let family = self
            .families
            .get(&handle.family)
            .ok_or_else(|| CompileError::UnknownName {
                kind: "utility",
                name: handle.family.clone(),
            })?;

        let values: IndexMap<String, TokenValue> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        let expanded = utility::expand(&handle.family, &family.build, &values, modifiers);
        let names = expanded.iter().map(|u| u.class_name.clone()).collect();
        self.root.utilities.extend(expanded);
        Ok(names)
    }

    /// Registers a recipe, validating its tables.
    pub fn recipe(&mut self, recipe: Recipe) -> Result<RecipeHandle, CompileError> {
        require_name(&recipe.name, "recipe")?;
        if self.root.recipes.contains_key(&recipe.name) {
            return Err(CompileError::DuplicateName {
                name: recipe.name,
                scope: "recipes".to_string(),
            });
        }
        recipe::validate(&recipe)?;
        let handle = RecipeHandle {
            name: recipe.name.clone(),
        };
        self.root.recipes.insert(recipe.name.clone(), recipe);
        Ok(handle)
    }

    /// Resolves a caller's selection against a registered recipe.
    pub fn resolve_recipe(
        &self,
        handle: &RecipeHandle,
        selection: &[(&str, &str)],
    ) -> Result<RecipeInstance, CompileError> {
        let recipe = self
            .root
            .recipes
            .get(&handle.name)
            .ok_or_else(|| CompileError::UnknownName {
                kind: "recipe",
                name: handle.name.clone(),
            })?;
        recipe::resolve(recipe, selection)
    }

    /// Registers a theme. Theme names are unique per instance, and the
    /// theme's own variables (and any nested container's) must be unique
    /// within their scope.
    pub fn theme(&mut self, theme: ThemeDef) -> Result<(), CompileError> {
        require_name(&theme.name, "theme")?;
        check_scope_variables(&theme.name, &theme.variables, &theme.children)?;
        if self.root.themes.contains_key(&theme.name) {
            return Err(CompileError::DuplicateName {
                name: theme.name,
                scope: "themes".to_string(),
            });
        }
        self.root.themes.insert(theme.name.clone(), theme);
        Ok(())
    }

    /// Merges another instance into this one, preserving this instance's
    /// content first. This is how several authoring files are wired onto
    /// one compile.
    ///
    /// # Errors
    ///
    /// [`CompileError::DuplicateName`] on any name collision between the
    /// two instances.
    pub fn merge(mut self, other: StyleSheet) -> Result<StyleSheet, CompileError> {
        for variable in other.root.variables {
            if self.root.variables.iter().any(|v| v.name == variable.name) {
                return Err(CompileError::DuplicateName {
                    name: variable.name,
                    scope: "root".to_string(),
                });
            }
            self.root.variables.push(variable);
        }
        self.root.children.extend(other.root.children);
        self.root.utilities.extend(other.root.utilities);
        for (name, recipe) in other.root.recipes {
            if self.root.recipes.contains_key(&name) {
                return Err(CompileError::DuplicateName {
                    name,
                    scope: "recipes".to_string(),
                });
            }
            self.root.recipes.insert(name, recipe);
        }
        for (name, theme) in other.root.themes {
            if self.root.themes.contains_key(&name) {
                return Err(CompileError::DuplicateName {
                    name,
                    scope: "themes".to_string(),
                });
            }
            self.root.themes.insert(name, theme);
        }
        for (key, modifier) in other.modifiers {
            if self.modifiers.contains_key(&key) {
                return Err(CompileError::DuplicateName {
                    name: key,
                    scope: "modifiers".to_string(),
                });
            }
            self.modifiers.insert(key, modifier);
        }
        for (name, family) in other.families {
            if self.families.contains_key(&name) {
                return Err(CompileError::DuplicateName {
                    name,
                    scope: "utilities".to_string(),
                });
            }
            self.families.insert(name, family);
        }
        Ok(self)
    }
}

fn require_name(name: &str, kind: &'static str) -> Result<(), CompileError> {
    if name.is_empty() {
        Err(CompileError::EmptyName { kind })
    } else {
        Ok(())
    }
}

/// Rejects sibling variables sharing a name within one container scope,
/// recursing through nested containers. Shadowing a name from an enclosing
/// scope stays legal; only same-scope twins are an error.
fn check_scope_variables(
    scope: &str,
    variables: &[Variable],
    children: &[Node],
) -> Result<(), CompileError> {
    for (i, variable) in variables.iter().enumerate() {
        if variables[..i].iter().any(|v| v.name == variable.name) {
            return Err(CompileError::DuplicateName {
                name: variable.name.clone(),
                scope: scope.to_string(),
            });
        }
    }
    for child in children {
        match child {
            Node::Selector(s) => check_scope_variables(&s.selector, &s.variables, &s.children)?,
            Node::AtRule(a) => {
                let scope = format!("@{}", a.kind);
                check_scope_variables(&scope, &a.variables, &a.children)?;
            }
            Node::Keyframes(_) => {}
        }
    }
    Ok(())
}
