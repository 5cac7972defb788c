//! The code generator.
//!
//! One depth-first walk over a finished [`Root`], producing the stylesheet
//! text. The walk preserves insertion order everywhere; compiling the same
//! IR twice yields byte-identical output. Resolution errors found while
//! serializing values abort the whole generation; partial, invalid text is
//! never emitted.
//!
//! Property names arrive in the builder's camelCase convention and are
//! converted to dash-case on the way out; names already containing a
//! custom-property prefix pass through unchanged. Utility class names are
//! backslash-escaped when used as selectors; declaration values are never
//! escaped.

use std::sync::Arc;

use crate::error::CompileError;
use crate::ir::{AtRule, DeclEntry, DeclarationBlock, Keyframes, Node, Root, Selector, ThemeDef, Utility, Variable};
use crate::resolver::{Resolver, VariableNameFn};

/// Maps a name to its emitted form.
pub type NameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Maps (family, value key, modifier combination) to a utility class name.
pub type UtilityNameFn = Arc<dyn Fn(&str, &str, &[String]) -> String + Send + Sync>;

/// Options for one generation run.
///
/// ```rust
/// use styleforge_core::generate::GenerateOptions;
///
/// let opts = GenerateOptions::new()
///     .with_indent("    ")
///     .with_theme_selector(|name| format!(".theme-{}", name));
/// assert_eq!(opts.indent(), "    ");
/// ```
#[derive(Clone)]
pub struct GenerateOptions {
    indent: String,
    variable_name: NameFn,
    utility_selector: Option<UtilityNameFn>,
    theme_selector: NameFn,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation unit (default two spaces).
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Overrides how variable dash-paths map to custom-property names.
    pub fn with_variable_name(
        mut self,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.variable_name = Arc::new(f);
        self
    }

    /// Overrides how utility class names are derived at emission; the
    /// default uses the name stored on the node at expansion time.
    pub fn with_utility_selector(
        mut self,
        f: impl Fn(&str, &str, &[String]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.utility_selector = Some(Arc::new(f));
        self
    }

    /// Overrides the selector a theme scope is emitted under
    /// (default `[data-theme="name"]`).
    pub fn with_theme_selector(
        mut self,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.theme_selector = Arc::new(f);
        self
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            variable_name: Arc::new(default_variable_name),
            utility_selector: None,
            theme_selector: Arc::new(|name| format!("[data-theme=\"{}\"]", name)),
        }
    }
}

/// Default custom-property naming: dash-path segments joined by a double
/// dash under a `--` prefix; names already prefixed pass through.
pub fn default_variable_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        format!("--{}", name.replace('.', "--"))
    }
}

/// Converts a camelCase property name to dash-case. Custom-property names
/// (leading `--`) pass through unchanged.
pub fn dash_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Backslash-escapes selector-significant characters so a derived class
/// name (`bg:red:hover`) is a valid class selector. An identifier cannot
/// start with a digit, so a leading digit becomes a hex escape (`2xl`
/// emits as `\32 xl`).
pub fn escape_class(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, c) in name.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            out.push_str("\\3");
            out.push(c);
            out.push(' ');
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Generates stylesheet text for the whole root with default options.
pub fn generate_default(root: &Root) -> Result<String, CompileError> {
    generate(root, &GenerateOptions::default())
}

/// Generates stylesheet text for the whole root.
pub fn generate(root: &Root, opts: &GenerateOptions) -> Result<String, CompileError> {
    let mut emitter = Emitter {
        opts,
        out: String::new(),
        depth: 0,
    };

    let mut resolver = Resolver::new(root);

    if !root.variables.is_empty() {
        emitter.open(":root");
        emitter.variables(&resolver, &root.variables)?;
        emitter.close();
    }

    for node in &root.children {
        emitter.node(&mut resolver, node)?;
    }

    for utility in &root.utilities {
        emitter.utility(&resolver, utility)?;
    }

    for theme in root.themes.values() {
        let mut themed = Resolver::with_theme(root, theme);
        emitter.theme(&mut themed, theme)?;
    }

    log::debug!("generated {} bytes of stylesheet text", emitter.out.len());
    Ok(emitter.out)
}

struct Emitter<'a> {
    opts: &'a GenerateOptions,
    out: String,
    depth: usize,
}

impl<'a> Emitter<'a> {
    fn name_fn(&self) -> &VariableNameFn {
        &*self.opts.variable_name
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(&self.opts.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{} {{", header));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth -= 1;
        self.line("}");
    }

    fn variables(
        &mut self,
        resolver: &Resolver<'_>,
        variables: &[Variable],
    ) -> Result<(), CompileError> {
        for variable in variables {
            let name = (self.opts.variable_name)(&variable.name);
            let value = resolver.serialize(&variable.value, self.name_fn())?;
            self.line(&format!("{}: {};", name, value));
        }
        Ok(())
    }

    fn block(
        &mut self,
        resolver: &Resolver<'_>,
        block: &DeclarationBlock,
    ) -> Result<(), CompileError> {
        for (key, entry) in block.iter() {
            match entry {
                DeclEntry::Value(value) => {
                    let rendered = resolver.serialize(value, self.name_fn())?;
                    self.line(&format!("{}: {};", dash_case(key), rendered));
                }
                DeclEntry::Nested(inner) => {
                    // Nested keys carry their selector (or inline at-rule)
                    // text verbatim.
                    self.open(key);
                    self.block(resolver, inner)?;
                    self.close();
                }
            }
        }
        Ok(())
    }

    fn node(&mut self, resolver: &mut Resolver<'a>, node: &'a Node) -> Result<(), CompileError> {
        match node {
            Node::Selector(selector) => self.selector(resolver, selector),
            Node::AtRule(at_rule) => self.at_rule(resolver, at_rule),
            Node::Keyframes(keyframes) => self.keyframes(resolver, keyframes),
        }
    }

    fn selector(
        &mut self,
        resolver: &mut Resolver<'a>,
        selector: &'a Selector,
    ) -> Result<(), CompileError> {
        self.open(&selector.selector);
        resolver.push_scope(&selector.variables);
        let result: Result<(), CompileError> = (|| {
            self.variables(resolver, &selector.variables)?;
            self.block(resolver, &selector.block)?;
            for child in &selector.children {
                self.node(resolver, child)?;
            }
            Ok(())
        })();
        resolver.pop_scope();
        result?;
        self.close();
        Ok(())
    }

    fn at_rule(
        &mut self,
        resolver: &mut Resolver<'a>,
        at_rule: &'a AtRule,
    ) -> Result<(), CompileError> {
        // Keyword and condition joined by a single space, even when the
        // condition is empty; the condition is never parsed or trimmed.
        self.open(&format!("@{} {}", at_rule.kind, at_rule.condition));
        resolver.push_scope(&at_rule.variables);
        let result: Result<(), CompileError> = (|| {
            self.variables(resolver, &at_rule.variables)?;
            self.block(resolver, &at_rule.block)?;
            for child in &at_rule.children {
                self.node(resolver, child)?;
            }
            Ok(())
        })();
        resolver.pop_scope();
        result?;
        self.close();
        Ok(())
    }

    fn keyframes(
        &mut self,
        resolver: &Resolver<'_>,
        keyframes: &Keyframes,
    ) -> Result<(), CompileError> {
        self.open(&format!("@keyframes {}", keyframes.name));
        for (offset, block) in &keyframes.frames {
            self.open(offset);
            self.block(resolver, block)?;
            self.close();
        }
        self.close();
        Ok(())
    }

    fn utility(
        &mut self,
        resolver: &Resolver<'_>,
        utility: &Utility,
    ) -> Result<(), CompileError> {
        let name = match &self.opts.utility_selector {
            Some(f) => f(&utility.family, &utility.key, &utility.modifiers),
            None => utility.class_name.clone(),
        };
        self.open(&format!(".{}", escape_class(&name)));
        self.block(resolver, &utility.declarations)?;
        self.close();
        Ok(())
    }

    fn theme(
        &mut self,
        resolver: &mut Resolver<'a>,
        theme: &'a ThemeDef,
    ) -> Result<(), CompileError> {
        // A theme scope holds only that theme's overrides; root content is
        // never re-emitted here.
        self.open(&(self.opts.theme_selector)(&theme.name));
        self.variables(resolver, &theme.variables)?;
        for child in &theme.children {
            self.node(resolver, child)?;
        }
        self.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StyleSheet;
    use crate::ir::{AtRule, DeclarationBlock, Keyframes, Reference, Selector, ThemeDef, Variable};
    use proptest::prelude::*;

    #[test]
    fn test_dash_case_camel() {
        assert_eq!(dash_case("backgroundColor"), "background-color");
        assert_eq!(dash_case("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(dash_case("color"), "color");
    }

    #[test]
    fn test_dash_case_custom_property_passthrough() {
        assert_eq!(dash_case("--alreadyDashed"), "--alreadyDashed");
    }

    #[test]
    fn test_escape_class() {
        assert_eq!(escape_class("bg:red:hover"), "bg\\:red\\:hover");
        assert_eq!(escape_class("w:1/2"), "w\\:1\\/2");
        assert_eq!(escape_class("p:0.5"), "p\\:0\\.5");
        assert_eq!(escape_class("plain-name"), "plain-name");
    }

    #[test]
    fn test_escape_class_leading_digit() {
        assert_eq!(escape_class("2xl"), "\\32 xl");
        assert_eq!(escape_class("9:hover"), "\\39 \\:hover");
        // Only the leading position needs the hex form.
        assert_eq!(escape_class("w2"), "w2");
    }

    #[test]
    fn test_default_variable_name() {
        assert_eq!(default_variable_name("colors.primary"), "--colors--primary");
        assert_eq!(default_variable_name("--raw"), "--raw");
    }

    #[test]
    fn test_root_variables_in_root_scope() {
        let mut sheet = StyleSheet::new();
        sheet.token("colors.primary", "#336").unwrap();
        sheet.token("spacing.sm", "4px").unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            ":root {\n  --colors--primary: #336;\n  --spacing--sm: 4px;\n}\n"
        );
    }

    #[test]
    fn test_selector_with_nested_block() {
        let mut sheet = StyleSheet::new();
        sheet
            .selector(
                Selector::new(".card")
                    .decl("backgroundColor", "white")
                    .nested("&:hover", DeclarationBlock::new().decl("backgroundColor", "gray")),
            )
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            ".card {\n  background-color: white;\n  &:hover {\n    background-color: gray;\n  }\n}\n"
        );
    }

    #[test]
    fn test_at_rule_with_condition() {
        let mut sheet = StyleSheet::new();
        sheet
            .at_rule(
                AtRule::media("(min-width: 768px)")
                    .child(Selector::new(".card").decl("padding", "2rem")),
            )
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            "@media (min-width: 768px) {\n  .card {\n    padding: 2rem;\n  }\n}\n"
        );
    }

    #[test]
    fn test_at_rule_with_empty_condition_keeps_the_joining_space() {
        let mut sheet = StyleSheet::new();
        sheet.at_rule(AtRule::layer("")).unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(css, "@layer  {\n}\n");
    }

    #[test]
    fn test_keyframes_emission() {
        let mut sheet = StyleSheet::new();
        sheet
            .keyframes(
                Keyframes::new("spin")
                    .frame("from", DeclarationBlock::new().decl("transform", "rotate(0deg)"))
                    .frame("to", DeclarationBlock::new().decl("transform", "rotate(360deg)")),
            )
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            "@keyframes spin {\n  from {\n    transform: rotate(0deg);\n  }\n  to {\n    transform: rotate(360deg);\n  }\n}\n"
        );
    }

    #[test]
    fn test_utility_selector_escaped_but_values_untouched() {
        let mut sheet = StyleSheet::new();
        let bg = sheet
            .utility("bg", std::sync::Arc::new(|v: &crate::ir::TokenValue| {
                DeclarationBlock::new().decl("backgroundColor", v.clone())
            }))
            .unwrap();
        sheet
            .expand(&bg, &[("red", "url(img.png) #f00".into())], &[])
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            ".bg\\:red {\n  background-color: url(img.png) #f00;\n}\n"
        );
    }

    #[test]
    fn test_theme_emits_only_its_overrides() {
        let mut sheet = StyleSheet::new();
        sheet.token("colors.bg", "white").unwrap();
        sheet
            .theme(ThemeDef::new("dark").var(Variable::new("colors.bg", "black")))
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            ":root {\n  --colors--bg: white;\n}\n[data-theme=\"dark\"] {\n  --colors--bg: black;\n}\n"
        );
    }

    #[test]
    fn test_theme_children_emit_inside_theme_scope() {
        let mut sheet = StyleSheet::new();
        sheet
            .theme(
                ThemeDef::new("dark")
                    .var(Variable::new("colors.glow", "#0ff"))
                    .child(
                        Selector::new(".card")
                            .decl("outlineColor", Reference::new("colors.glow")),
                    ),
            )
            .unwrap();

        // The nested selector sits inside the theme block, and its
        // reference resolves against the theme's own variables even though
        // the root never declared the name.
        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            "[data-theme=\"dark\"] {\n  --colors--glow: #0ff;\n  .card {\n    outline-color: var(--colors--glow);\n  }\n}\n"
        );
    }

    #[test]
    fn test_reference_value_emits_var() {
        let mut sheet = StyleSheet::new();
        let primary = sheet.token("colors.primary", "#336").unwrap();
        sheet
            .selector(Selector::new(".btn").decl("color", primary))
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert!(css.contains("color: var(--colors--primary);"));
    }

    #[test]
    fn test_unresolved_reference_fails_whole_generation() {
        let mut sheet = StyleSheet::new();
        sheet
            .selector(Selector::new(".btn").decl("color", Reference::new("colors.missing")))
            .unwrap();

        let err = generate_default(sheet.root()).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_local_variable_emitted_and_scoped() {
        let mut sheet = StyleSheet::new();
        sheet
            .selector(
                Selector::new(".card")
                    .var(Variable::new("gap", "4px"))
                    .decl("columnGap", Reference::new("gap")),
            )
            .unwrap();

        let css = generate_default(sheet.root()).unwrap();
        assert_eq!(
            css,
            ".card {\n  --gap: 4px;\n  column-gap: var(--gap);\n}\n"
        );
    }

    #[test]
    fn test_custom_options() {
        let mut sheet = StyleSheet::new();
        sheet.token("colors.bg", "white").unwrap();
        sheet.theme(ThemeDef::new("dark")).unwrap();

        let opts = GenerateOptions::new()
            .with_indent("\t")
            .with_variable_name(|name| format!("--x-{}", name.replace('.', "-")))
            .with_theme_selector(|name| format!(".theme-{}", name));
        let css = generate(sheet.root(), &opts).unwrap();
        assert_eq!(css, ":root {\n\t--x-colors-bg: white;\n}\n.theme-dark {\n}\n");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut sheet = StyleSheet::new();
        sheet.token("colors.primary", "#336").unwrap();
        sheet
            .selector(Selector::new(".card").decl("color", Reference::new("colors.primary")))
            .unwrap();
        sheet
            .theme(ThemeDef::new("dark").var(Variable::new("colors.primary", "#aac")))
            .unwrap();

        let first = generate_default(sheet.root()).unwrap();
        let second = generate_default(sheet.root()).unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        // Every camelCase property name is recoverable as valid dash-case.
        #[test]
        fn prop_casing_round_trip(segments in proptest::collection::vec("[a-z]{1,6}", 1..4)) {
            let mut camel = segments[0].clone();
            for segment in &segments[1..] {
                let mut chars = segment.chars();
                if let Some(first) = chars.next() {
                    camel.push(first.to_ascii_uppercase());
                    camel.extend(chars);
                }
            }
            let dashed = dash_case(&camel);
            prop_assert_eq!(dashed, segments.join("-"));
        }
    }
}
