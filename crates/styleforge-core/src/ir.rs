//! The in-memory intermediate representation.
//!
//! Every node here is a plain record created once during authoring and read
//! by the code generator; nothing holds a back-reference to its owner. The
//! [`Root`] owns the whole tree transitively. The only non-serializable node
//! is [`Modifier`], which carries a transform closure; utilities store their
//! *resolved* declarations, so the emitted tree stays plain data.
//!
//! Declaration blocks are open-shaped: an entry under a string key is either
//! a value or a nested block keyed by its selector text, recursively. See
//! [`DeclEntry`].
//!
//! # Example
//!
//! ```rust
//! use styleforge_core::ir::{DeclarationBlock, Reference, Selector};
//!
//! let card = Selector::new(".card")
//!     .decl("backgroundColor", Reference::new("colors.surface"))
//!     .decl("padding", "1rem")
//!     .nested(
//!         "&:hover",
//!         DeclarationBlock::new().decl("backgroundColor", Reference::new("colors.hover")),
//!     );
//! assert_eq!(card.selector, ".card");
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

/// Transform applied by a [`Modifier`]: receives the matched key and the
/// declarations to wrap, returns the transformed block.
pub type TransformFn = Arc<dyn Fn(&str, DeclarationBlock) -> DeclarationBlock + Send + Sync>;

/// Declaration function of a utility family: receives the raw token value
/// for one key and produces the base declarations.
pub type DeclFn = Arc<dyn Fn(&TokenValue) -> DeclarationBlock + Send + Sync>;

/// A design-token value.
///
/// Values are stored verbatim at construction time; references are resolved
/// lazily during generation, never during authoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    /// A literal string value, passed through unchanged.
    Str(String),
    /// A numeric value, formatted without a trailing `.0` for whole numbers.
    Num(f64),
    /// A reference to a named variable, with an optional fallback.
    Ref(Reference),
    /// A raw value built from interleaved literal and reference parts.
    Fragment(Fragment),
    /// A comma-joined list of values.
    List(Vec<TokenValue>),
}

impl From<&str> for TokenValue {
    fn from(s: &str) -> Self {
        TokenValue::Str(s.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(s: String) -> Self {
        TokenValue::Str(s)
    }
}

impl From<f64> for TokenValue {
    fn from(n: f64) -> Self {
        TokenValue::Num(n)
    }
}

impl From<i32> for TokenValue {
    fn from(n: i32) -> Self {
        TokenValue::Num(n as f64)
    }
}

impl From<Reference> for TokenValue {
    fn from(r: Reference) -> Self {
        TokenValue::Ref(r)
    }
}

impl From<Fragment> for TokenValue {
    fn from(f: Fragment) -> Self {
        TokenValue::Fragment(f)
    }
}

impl From<Vec<TokenValue>> for TokenValue {
    fn from(vs: Vec<TokenValue>) -> Self {
        TokenValue::List(vs)
    }
}

/// Formats a numeric token value.
///
/// Whole numbers drop the fractional part (`4.0` becomes `4`) so generated
/// stylesheets stay stable regardless of how the number was written.
pub(crate) fn fmt_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A pointer to a variable by dash-path name, with an optional fallback.
///
/// The fallback is used only when the name resolves in no enclosing scope.
/// It may itself be a reference or fragment, resolved recursively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub name: String,
    pub fallback: Option<Box<TokenValue>>,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fallback: None,
        }
    }

    /// Attaches a fallback, returning the reference for chaining.
    pub fn or(mut self, fallback: impl Into<TokenValue>) -> Self {
        self.fallback = Some(Box::new(fallback.into()));
        self
    }
}

/// One part of a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FragmentPart {
    Lit(String),
    Ref(Reference),
}

/// A raw value assembled from literal text and references, concatenated in
/// order at generation time.
///
/// # Example
///
/// ```rust
/// use styleforge_core::ir::{Fragment, Reference};
///
/// let border = Fragment::new()
///     .lit("1px solid ")
///     .var(Reference::new("colors.border"));
/// assert_eq!(border.parts.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Fragment {
    pub parts: Vec<FragmentPart>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a literal part.
    pub fn lit(mut self, text: impl Into<String>) -> Self {
        self.parts.push(FragmentPart::Lit(text.into()));
        self
    }

    /// Appends a reference part.
    pub fn var(mut self, reference: Reference) -> Self {
        self.parts.push(FragmentPart::Ref(reference));
        self
    }
}

/// One entry of a declaration block: a property value, or a nested block
/// keyed by its selector text (which may use `&` for the parent, or start
/// with `@` for an inline at-rule).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DeclEntry {
    Value(TokenValue),
    Nested(DeclarationBlock),
}

/// An insertion-ordered set of declarations.
///
/// Property names use the builder's camelCase convention and are converted
/// to dash-case at generation time; keys already containing `--` pass
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(transparent)]
pub struct DeclarationBlock {
    entries: IndexMap<String, DeclEntry>,
}

impl DeclarationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property declaration, returning the block for chaining.
    pub fn decl(mut self, property: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        self.entries
            .insert(property.into(), DeclEntry::Value(value.into()));
        self
    }

    /// Adds a nested block under the given selector text, returning the
    /// block for chaining.
    pub fn nested(mut self, selector: impl Into<String>, block: DeclarationBlock) -> Self {
        self.entries
            .insert(selector.into(), DeclEntry::Nested(block));
        self
    }

    /// Inserts an entry, replacing any previous entry under the same key.
    pub fn set(&mut self, key: impl Into<String>, entry: DeclEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Merges `other` into this block; `other` wins on conflicting keys.
    ///
    /// When both sides hold a nested block under the same key the blocks are
    /// merged recursively; any other collision replaces the earlier entry.
    pub fn merge(&mut self, other: DeclarationBlock) {
        for (key, entry) in other.entries {
            match (self.entries.get_mut(&key), entry) {
                (Some(DeclEntry::Nested(existing)), DeclEntry::Nested(incoming)) => {
                    existing.merge(incoming);
                }
                (_, entry) => {
                    self.entries.insert(key, entry);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&DeclEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeclEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A named token value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Dash-path name, namespaced with `.` (e.g. `colors.primary`).
    pub name: String,
    pub value: TokenValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A nested rule scope. Children form an unbounded-depth tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector {
    /// Selector text, passed through verbatim; `&` refers to the parent.
    pub selector: String,
    pub variables: Vec<Variable>,
    pub block: DeclarationBlock,
    pub children: Vec<Node>,
}

impl Selector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            variables: Vec::new(),
            block: DeclarationBlock::new(),
            children: Vec::new(),
        }
    }

    pub fn decl(mut self, property: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        self.block = self.block.decl(property, value);
        self
    }

    pub fn nested(mut self, selector: impl Into<String>, block: DeclarationBlock) -> Self {
        self.block = self.block.nested(selector, block);
        self
    }

    pub fn var(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// The at-rule keywords the generator knows how to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AtRuleKind {
    Media,
    Supports,
    Container,
    Layer,
}

impl AtRuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtRuleKind::Media => "media",
            AtRuleKind::Supports => "supports",
            AtRuleKind::Container => "container",
            AtRuleKind::Layer => "layer",
        }
    }
}

impl fmt::Display for AtRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conditional or grouping scope (`@media`, `@supports`, `@container`,
/// `@layer`). The condition is opaque text, passed through verbatim and
/// never parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtRule {
    pub kind: AtRuleKind,
    pub condition: String,
    pub variables: Vec<Variable>,
    pub block: DeclarationBlock,
    pub children: Vec<Node>,
}

impl AtRule {
    pub fn new(kind: AtRuleKind, condition: impl Into<String>) -> Self {
        Self {
            kind,
            condition: condition.into(),
            variables: Vec::new(),
            block: DeclarationBlock::new(),
            children: Vec::new(),
        }
    }

    pub fn media(condition: impl Into<String>) -> Self {
        Self::new(AtRuleKind::Media, condition)
    }

    pub fn supports(condition: impl Into<String>) -> Self {
        Self::new(AtRuleKind::Supports, condition)
    }

    pub fn container(condition: impl Into<String>) -> Self {
        Self::new(AtRuleKind::Container, condition)
    }

    pub fn layer(condition: impl Into<String>) -> Self {
        Self::new(AtRuleKind::Layer, condition)
    }

    pub fn decl(mut self, property: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        self.block = self.block.decl(property, value);
        self
    }

    pub fn var(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// A named animation: mapping of offset keyword (`from`, `to`, `50%`) to a
/// declaration block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyframes {
    pub name: String,
    pub frames: IndexMap<String, DeclarationBlock>,
}

impl Keyframes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: IndexMap::new(),
        }
    }

    pub fn frame(mut self, offset: impl Into<String>, block: DeclarationBlock) -> Self {
        self.frames.insert(offset.into(), block);
        self
    }
}

/// A container node in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Selector(Selector),
    AtRule(AtRule),
    Keyframes(Keyframes),
}

impl From<Selector> for Node {
    fn from(s: Selector) -> Self {
        Node::Selector(s)
    }
}

impl From<AtRule> for Node {
    fn from(a: AtRule) -> Self {
        Node::AtRule(a)
    }
}

impl From<Keyframes> for Node {
    fn from(k: Keyframes) -> Self {
        Node::Keyframes(k)
    }
}

/// One generated utility rule: immutable, one node per (value key ×
/// modifier combination) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utility {
    /// Family name the utility was expanded from.
    pub family: String,
    /// Value key used (`"default"` yields the bare family name).
    pub key: String,
    /// Modifier combination applied, in combination order; empty for the
    /// unmodified rule.
    pub modifiers: Vec<String>,
    /// Derived class name, unescaped; escaping happens at generation.
    pub class_name: String,
    /// Resolved declarations after folding the modifier transforms.
    pub declarations: DeclarationBlock,
}

/// A reusable declaration transform, combined combinatorially with utility
/// values.
///
/// One modifier declares a *group* of alternative keys; at most one key of a
/// group ever appears in a combination. The transform receives the matched
/// key so a group like `["sm", "md"]` can wrap per-key.
#[derive(Clone)]
pub struct Modifier {
    pub keys: Vec<String>,
    pub transform: TransformFn,
}

impl Modifier {
    pub fn new(keys: &[&str], transform: TransformFn) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            transform,
        }
    }

    /// Builds a modifier that nests declarations under a selector derived
    /// from the matched key (e.g. `&:hover`).
    pub fn nest(keys: &[&str], selector: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::new(
            keys,
            Arc::new(move |key, block| {
                DeclarationBlock::new().nested(selector(key), block)
            }),
        )
    }

    /// Applies this modifier's transform for the given key.
    pub fn apply(&self, key: &str, block: DeclarationBlock) -> DeclarationBlock {
        (self.transform)(key, block)
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier").field("keys", &self.keys).finish()
    }
}

/// A compound-variant entry: overrides applying only when every matched
/// axis resolves to the given value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundVariant {
    pub matches: IndexMap<String, String>,
    pub declarations: DeclarationBlock,
}

/// A parametrized declaration family selected by named variant axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub name: String,
    pub base: DeclarationBlock,
    /// Axis name → variant key → declarations, both levels in declaration
    /// order.
    pub variants: IndexMap<String, IndexMap<String, DeclarationBlock>>,
    pub defaults: IndexMap<String, String>,
    pub compounds: Vec<CompoundVariant>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: DeclarationBlock::new(),
            variants: IndexMap::new(),
            defaults: IndexMap::new(),
            compounds: Vec::new(),
        }
    }

    pub fn base(mut self, block: DeclarationBlock) -> Self {
        self.base = block;
        self
    }

    /// Declares one variant key on an axis, creating the axis on first use.
    pub fn variant(
        mut self,
        axis: impl Into<String>,
        key: impl Into<String>,
        block: DeclarationBlock,
    ) -> Self {
        self.variants
            .entry(axis.into())
            .or_default()
            .insert(key.into(), block);
        self
    }

    pub fn default_variant(mut self, axis: impl Into<String>, key: impl Into<String>) -> Self {
        self.defaults.insert(axis.into(), key.into());
        self
    }

    /// Appends a compound-variant entry; entries apply in declaration order.
    pub fn compound(mut self, matches: &[(&str, &str)], block: DeclarationBlock) -> Self {
        self.compounds.push(CompoundVariant {
            matches: matches
                .iter()
                .map(|(a, v)| (a.to_string(), v.to_string()))
                .collect(),
            declarations: block,
        });
        self
    }
}

/// A named alternate value set, emitted as its own top-level scope.
///
/// Themes may introduce variables the root never declared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeDef {
    pub name: String,
    pub variables: Vec<Variable>,
    /// Nested container overrides, emitted inside the theme scope.
    pub children: Vec<Node>,
}

impl ThemeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn var(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// The whole document: one per compile unit.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Root {
    /// Root-level variables, emitted into a `:root` scope.
    pub variables: Vec<Variable>,
    /// Selectors, at-rules and keyframes, in insertion order.
    pub children: Vec<Node>,
    /// Expanded utility rules, in expansion order.
    pub utilities: Vec<Utility>,
    /// Registered recipes, keyed by name.
    pub recipes: IndexMap<String, Recipe>,
    /// Registered themes, keyed by name.
    pub themes: IndexMap<String, ThemeDef>,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }
}
