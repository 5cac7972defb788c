//! The compile entry point for bundler-plugin collaborators.
//!
//! A collaborator wires one or more authoring files onto a single
//! [`StyleSheet`] instance (the loader side, not owned here), then asks for
//! a target artifact kind. Compilation returns named text artifacts; this
//! module owns no file I/O and persists nothing.
//!
//! Two artifact kinds exist: the stylesheet text itself, and a companion
//! runtime script exposing the recipe/utility class-name functions. The
//! script embeds the recipe tables as JSON and derives class names with the
//! exact rules of the compile-time resolver, so the two paths cannot drift
//! apart on naming.

use indexmap::IndexMap;
use serde::Serialize;

use styleforge_core::{generate, CompileError, GenerateOptions, StyleSheet};

/// Which artifact a compile produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The generated stylesheet text.
    Stylesheet,
    /// A companion script exposing recipe/utility class-name functions.
    Runtime,
}

/// One named text artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub source: String,
}

/// Compiles an instance into the requested artifact with default options.
pub fn compile(sheet: &StyleSheet, kind: ArtifactKind) -> Result<Vec<Artifact>, CompileError> {
    compile_with_options(sheet, kind, &GenerateOptions::default())
}

/// Compiles an instance into the requested artifact.
pub fn compile_with_options(
    sheet: &StyleSheet,
    kind: ArtifactKind,
    opts: &GenerateOptions,
) -> Result<Vec<Artifact>, CompileError> {
    log::debug!("compiling {:?} artifact", kind);
    match kind {
        ArtifactKind::Stylesheet => {
            let source = generate(sheet.root(), opts)?;
            Ok(vec![Artifact {
                name: "styleforge.css".to_string(),
                source,
            }])
        }
        ArtifactKind::Runtime => Ok(vec![Artifact {
            name: "styleforge.js".to_string(),
            source: runtime_script(sheet),
        }]),
    }
}

#[derive(Serialize)]
struct AxisTable {
    keys: Vec<String>,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    default_key: Option<String>,
}

#[derive(Serialize)]
struct RecipeTable {
    axes: IndexMap<String, AxisTable>,
}

#[derive(Serialize)]
struct RuntimeTables {
    recipes: IndexMap<String, RecipeTable>,
    utilities: Vec<String>,
}

fn runtime_tables(sheet: &StyleSheet) -> RuntimeTables {
    let recipes = sheet
        .root()
        .recipes
        .values()
        .map(|recipe| {
            let axes = recipe
                .variants
                .iter()
                .map(|(axis, keys)| {
                    let table = AxisTable {
                        keys: keys.keys().cloned().collect(),
                        default_key: recipe.defaults.get(axis).cloned(),
                    };
                    (axis.clone(), table)
                })
                .collect();
            (recipe.name.clone(), RecipeTable { axes })
        })
        .collect();

    let utilities = sheet
        .root()
        .utilities
        .iter()
        .map(|u| u.class_name.clone())
        .collect();

    RuntimeTables { recipes, utilities }
}

/// Builds the companion runtime script.
///
/// The class-name derivation mirrors the compile-time resolver: explicit
/// selection, else declared default, else the axis is omitted; an
/// `axis:value` token appends for every resolved axis differing from its
/// default, in axis-declaration order.
fn runtime_script(sheet: &StyleSheet) -> String {
    let tables = runtime_tables(sheet);
    // Serialization cannot fail: the tables are strings all the way down.
    let json = serde_json::to_string_pretty(&tables).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"// Generated by styleforge. Do not edit.
const tables = {json};

export function recipeClass(name, selection = {{}}) {{
  const table = tables.recipes[name];
  if (!table) {{
    throw new Error(`unknown recipe: ${{name}}`);
  }}
  for (const axis of Object.keys(selection)) {{
    if (!table.axes[axis]) {{
      throw new Error(`unknown variant axis '${{axis}}' of recipe '${{name}}'`);
    }}
  }}
  let out = name;
  for (const [axis, info] of Object.entries(table.axes)) {{
    const value = selection[axis] !== undefined ? selection[axis] : info.default;
    if (value === undefined) {{
      continue;
    }}
    if (!info.keys.includes(value)) {{
      throw new Error(`unknown variant key '${{value}}' for axis '${{axis}}' of recipe '${{name}}'`);
    }}
    if (value !== info.default) {{
      out += `:${{axis}}:${{value}}`;
    }}
  }}
  return out;
}}

export function utilityClasses() {{
  return tables.utilities.slice();
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use styleforge_core::{DeclarationBlock, Recipe, Selector, TokenValue};

    fn sheet_with_recipe() -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.token("colors.primary", "#336").unwrap();
        sheet
            .selector(Selector::new(".btn").decl("display", "inline-flex"))
            .unwrap();
        sheet
            .recipe(
                Recipe::new("button")
                    .variant("size", "sm", DeclarationBlock::new().decl("padding", "4px"))
                    .variant("size", "lg", DeclarationBlock::new().decl("padding", "12px"))
                    .default_variant("size", "sm"),
            )
            .unwrap();
        sheet
    }

    #[test]
    fn test_stylesheet_artifact_named_and_nonempty() {
        let artifacts = compile(&sheet_with_recipe(), ArtifactKind::Stylesheet).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name, "styleforge.css");
        assert!(artifacts[0].source.contains(".btn {"));
    }

    #[test]
    fn test_runtime_artifact_embeds_recipe_tables() {
        let artifacts = compile(&sheet_with_recipe(), ArtifactKind::Runtime).unwrap();
        assert_eq!(artifacts[0].name, "styleforge.js");
        let js = &artifacts[0].source;
        assert!(js.contains("\"button\""));
        assert!(js.contains("\"default\": \"sm\""));
        assert!(js.contains("export function recipeClass"));
    }

    #[test]
    fn test_runtime_artifact_lists_utility_classes() {
        let mut sheet = sheet_with_recipe();
        let bg = sheet
            .utility(
                "bg",
                Arc::new(|value: &TokenValue| {
                    DeclarationBlock::new().decl("backgroundColor", value.clone())
                }),
            )
            .unwrap();
        sheet.expand(&bg, &[("red", "#f00".into())], &[]).unwrap();

        let artifacts = compile(&sheet, ArtifactKind::Runtime).unwrap();
        assert!(artifacts[0].source.contains("\"bg:red\""));
    }

    #[test]
    fn test_generation_errors_propagate_through_compile() {
        let mut sheet = StyleSheet::new();
        sheet
            .selector(
                Selector::new(".btn")
                    .decl("color", styleforge_core::Reference::new("colors.missing")),
            )
            .unwrap();
        let err = compile(&sheet, ArtifactKind::Stylesheet).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedReference { .. }));
    }
}
