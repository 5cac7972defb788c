//! Reference resolution.
//!
//! A [`Resolver`] serializes token values against a scope chain: innermost
//! local container variables first, then the active theme's overrides, then
//! the root. References emit as `var(--name)` when the name resolves; the
//! chain behind the name is still walked so unresolved links and cycles are
//! caught at compile time instead of surfacing as broken custom properties.
//!
//! Cycle detection uses a per-walk visited set keyed by variable name, the
//! same shape as alias-cycle validation elsewhere: a repeated name aborts
//! the walk with the full path.

use crate::error::CompileError;
use crate::ir::{fmt_number, FragmentPart, Root, ThemeDef, TokenValue, Variable};

/// Maps a variable's dash-path name to its emitted custom-property name.
pub type VariableNameFn = dyn Fn(&str) -> String;

/// Scope-chain resolver for one generation walk.
pub struct Resolver<'a> {
    root: &'a Root,
    theme: Option<&'a ThemeDef>,
    locals: Vec<&'a [Variable]>,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Root) -> Self {
        Self {
            root,
            theme: None,
            locals: Vec::new(),
        }
    }

    /// Returns a resolver that consults the given theme's overrides before
    /// the root. Themes may introduce root-unseen variables.
    pub fn with_theme(root: &'a Root, theme: &'a ThemeDef) -> Self {
        Self {
            root,
            theme: Some(theme),
            locals: Vec::new(),
        }
    }

    /// Pushes a container's variables onto the scope chain.
    pub fn push_scope(&mut self, variables: &'a [Variable]) {
        self.locals.push(variables);
    }

    pub fn pop_scope(&mut self) {
        self.locals.pop();
    }

    /// Looks a name up through the scope chain: nearest enclosing container,
    /// then theme override, then root.
    pub fn lookup(&self, name: &str) -> Option<&'a Variable> {
        for scope in self.locals.iter().rev() {
            if let Some(v) = scope.iter().find(|v| v.name == name) {
                return Some(v);
            }
        }
        if let Some(theme) = self.theme {
            if let Some(v) = theme.variables.iter().find(|v| v.name == name) {
                return Some(v);
            }
        }
        self.root.variables.iter().find(|v| v.name == name)
    }

    /// Serializes a token value to stylesheet text.
    ///
    /// # Errors
    ///
    /// [`CompileError::UnresolvedReference`] when a reference resolves
    /// nowhere and carries no fallback (fallbacks recurse, so a chained
    /// fallback only fails once the whole chain is exhausted);
    /// [`CompileError::CircularReference`] when a variable's value leads
    /// back to itself;
    /// [`CompileError::NonFiniteNumber`] for a NaN or infinite numeric
    /// value, which has no stylesheet text form.
    pub fn serialize(
        &self,
        value: &TokenValue,
        variable_name: &VariableNameFn,
    ) -> Result<String, CompileError> {
        let mut visited = Vec::new();
        self.serialize_inner(value, variable_name, &mut visited)
    }

    fn serialize_inner(
        &self,
        value: &TokenValue,
        variable_name: &VariableNameFn,
        visited: &mut Vec<String>,
    ) -> Result<String, CompileError> {
        match value {
            TokenValue::Str(s) => Ok(s.clone()),
            TokenValue::Num(n) => {
                if !n.is_finite() {
                    return Err(CompileError::NonFiniteNumber);
                }
                Ok(fmt_number(*n))
            }
            TokenValue::List(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.serialize_inner(item, variable_name, visited))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(", "))
            }
            TokenValue::Fragment(fragment) => {
                let mut out = String::new();
                for part in &fragment.parts {
                    match part {
                        FragmentPart::Lit(text) => out.push_str(text),
                        FragmentPart::Ref(reference) => {
                            let rendered = self.serialize_inner(
                                &TokenValue::Ref(reference.clone()),
                                variable_name,
                                visited,
                            )?;
                            out.push_str(&rendered);
                        }
                    }
                }
                Ok(out)
            }
            TokenValue::Ref(reference) => {
                if visited.iter().any(|n| n == &reference.name) {
                    let mut path = visited.clone();
                    path.push(reference.name.clone());
                    return Err(CompileError::CircularReference { path });
                }
                if let Some(variable) = self.lookup(&reference.name) {
                    // Chase the chain behind the variable so unresolved
                    // links and cycles fail the compile, then emit the
                    // custom-property form.
                    visited.push(reference.name.clone());
                    self.serialize_inner(&variable.value, variable_name, visited)?;
                    visited.pop();
                    return Ok(format!("var({})", variable_name(&reference.name)));
                }
                match &reference.fallback {
                    Some(fallback) => self.serialize_inner(fallback, variable_name, visited),
                    None => Err(CompileError::UnresolvedReference {
                        name: reference.name.clone(),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Fragment, Reference};

    fn var_name(name: &str) -> String {
        format!("--{}", name.replace('.', "--"))
    }

    fn root_with(vars: &[(&str, TokenValue)]) -> Root {
        let mut root = Root::new();
        for (name, value) in vars {
            root.variables.push(Variable::new(*name, value.clone()));
        }
        root
    }

    #[test]
    fn test_literal_and_number() {
        let root = Root::new();
        let r = Resolver::new(&root);
        assert_eq!(r.serialize(&"red".into(), &var_name).unwrap(), "red");
        assert_eq!(r.serialize(&4.into(), &var_name).unwrap(), "4");
    }

    #[test]
    fn test_resolved_reference_emits_var() {
        let root = root_with(&[("colors.primary", "#336".into())]);
        let r = Resolver::new(&root);
        let out = r
            .serialize(&Reference::new("colors.primary").into(), &var_name)
            .unwrap();
        assert_eq!(out, "var(--colors--primary)");
    }

    #[test]
    fn test_unresolved_with_fallback_serializes_fallback() {
        let root = Root::new();
        let r = Resolver::new(&root);
        let out = r
            .serialize(&Reference::new("spacing.gap").or("0").into(), &var_name)
            .unwrap();
        assert_eq!(out, "0");
    }

    #[test]
    fn test_unresolved_without_fallback_errors() {
        let root = Root::new();
        let r = Resolver::new(&root);
        let err = r
            .serialize(&Reference::new("spacing.gap").into(), &var_name)
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                name: "spacing.gap".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let root = Root::new();
        let r = Resolver::new(&root);
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = r.serialize(&TokenValue::Num(n), &var_name).unwrap_err();
            assert_eq!(err, CompileError::NonFiniteNumber);
        }
    }

    #[test]
    fn test_chained_fallback_recurses() {
        let root = root_with(&[("b", "2px".into())]);
        let r = Resolver::new(&root);
        // a is missing; its fallback references b, which resolves.
        let value = Reference::new("a").or(Reference::new("b")).into();
        assert_eq!(r.serialize(&value, &var_name).unwrap(), "var(--b)");
    }

    #[test]
    fn test_chained_fallback_exhausted_errors() {
        let root = Root::new();
        let r = Resolver::new(&root);
        let value = Reference::new("a").or(Reference::new("b")).into();
        let err = r.serialize(&value, &var_name).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn test_direct_cycle_detected() {
        let root = root_with(&[("a", Reference::new("a").into())]);
        let r = Resolver::new(&root);
        let err = r
            .serialize(&Reference::new("a").into(), &var_name)
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::CircularReference {
                path: vec!["a".to_string(), "a".to_string()]
            }
        );
    }

    #[test]
    fn test_indirect_cycle_detected() {
        let root = root_with(&[
            ("a", Reference::new("b").into()),
            ("b", Reference::new("a").into()),
        ]);
        let r = Resolver::new(&root);
        let err = r
            .serialize(&Reference::new("a").into(), &var_name)
            .unwrap_err();
        assert!(matches!(err, CompileError::CircularReference { path } if path.len() == 3));
    }

    #[test]
    fn test_fragment_concatenates_in_order() {
        let root = root_with(&[("colors.border", "#ccc".into())]);
        let r = Resolver::new(&root);
        let value = Fragment::new()
            .lit("1px solid ")
            .var(Reference::new("colors.border"))
            .into();
        assert_eq!(
            r.serialize(&value, &var_name).unwrap(),
            "1px solid var(--colors--border)"
        );
    }

    #[test]
    fn test_list_joined_with_commas() {
        let root = Root::new();
        let r = Resolver::new(&root);
        let value = TokenValue::List(vec!["serif".into(), "sans-serif".into()]);
        assert_eq!(r.serialize(&value, &var_name).unwrap(), "serif, sans-serif");
    }

    #[test]
    fn test_local_scope_shadows_root() {
        let root = root_with(&[("gap", "8px".into())]);
        let locals = [Variable::new("gap", "4px")];
        let mut r = Resolver::new(&root);
        r.push_scope(&locals);
        // Still emits var(); the point is that the local definition
        // satisfies resolution even if the root lacked it.
        assert!(r.lookup("gap").is_some());
        assert_eq!(r.lookup("gap").unwrap().value, TokenValue::Str("4px".to_string()));
        r.pop_scope();
        assert_eq!(r.lookup("gap").unwrap().value, TokenValue::Str("8px".to_string()));
    }

    #[test]
    fn test_theme_override_consulted_before_root() {
        let root = root_with(&[("colors.bg", "white".into())]);
        let theme = ThemeDef::new("dark").var(Variable::new("colors.bg", "black"));
        let r = Resolver::with_theme(&root, &theme);
        assert_eq!(
            r.lookup("colors.bg").unwrap().value,
            TokenValue::Str("black".to_string())
        );
    }

    #[test]
    fn test_theme_may_introduce_root_unseen_variable() {
        let root = Root::new();
        let theme = ThemeDef::new("dark").var(Variable::new("colors.glow", "#0ff"));
        let r = Resolver::with_theme(&root, &theme);
        let out = r
            .serialize(&Reference::new("colors.glow").into(), &var_name)
            .unwrap();
        assert_eq!(out, "var(--colors--glow)");
    }
}
