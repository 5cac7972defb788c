//! Utility expansion.
//!
//! Cross-multiplies a family's value-key mapping with modifier combinations,
//! producing one immutable [`Utility`] node per (value key × modifier
//! combination) pair. The declaration function receives the raw token value
//! (possibly a reference) and its result is stored verbatim; resolution
//! and name escaping both happen later, at generation time.

use indexmap::IndexMap;

use crate::combine::combinations;
use crate::ir::{DeclFn, Modifier, TokenValue, Utility};

/// The value key that yields the bare family name with no `:key` suffix.
pub const DEFAULT_KEY: &str = "default";

/// Expands one utility family.
///
/// Per value key, emits the unmodified rule first, then one rule per
/// modifier combination in combination order. An empty value mapping yields
/// zero nodes; that is not an error.
pub fn expand(
    family: &str,
    build: &DeclFn,
    values: &IndexMap<String, TokenValue>,
    modifiers: &[Modifier],
) -> Vec<Utility> {
    let groups: Vec<Vec<String>> = modifiers.iter().map(|m| m.keys.clone()).collect();
    let combos = if modifiers.is_empty() {
        Vec::new()
    } else {
        combinations(&groups)
    };

    let mut out = Vec::new();
    for (key, value) in values {
        let base_name = class_name(family, key, &[]);
        let base_block = build(value);

        out.push(Utility {
            family: family.to_string(),
            key: key.clone(),
            modifiers: Vec::new(),
            class_name: base_name.clone(),
            declarations: base_block.clone(),
        });

        for combo in &combos {
            let mut block = base_block.clone();
            for combo_key in combo {
                // The first modifier declaring the key owns it; shared
                // spellings were already deduplicated by the combiner.
                if let Some(modifier) = modifiers.iter().find(|m| m.keys.iter().any(|k| k == combo_key)) {
                    block = modifier.apply(combo_key, block);
                }
            }
            out.push(Utility {
                family: family.to_string(),
                key: key.clone(),
                modifiers: combo.clone(),
                class_name: class_name(family, key, combo),
                declarations: block,
            });
        }
    }

    log::debug!("expanded {} rules for utility family '{}'", out.len(), family);
    out
}

/// Derives the (unescaped) class name for a family, value key and modifier
/// combination: `family[:key][:mod…]`, with the `"default"` key omitting
/// the `:key` segment.
pub fn class_name(family: &str, key: &str, modifiers: &[String]) -> String {
    let mut name = family.to_string();
    if key != DEFAULT_KEY {
        name.push(':');
        name.push_str(key);
    }
    for modifier in modifiers {
        name.push(':');
        name.push_str(modifier);
    }
    name
}
