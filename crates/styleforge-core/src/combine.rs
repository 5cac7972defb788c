//! Modifier combination engine.
//!
//! Given N groups of alternative keys, produces every valid combination
//! choosing at most one key per group. This is a bounded cross-product over
//! groups, not a powerset of individual keys: two keys of the same group
//! never co-occur. For group sizes `g1..gn` the output holds
//! `∏(gi + 1) − 1` combinations (the all-empty choice is dropped), fewer
//! when groups share spellings.

use std::collections::BTreeSet;

/// Produces every non-empty combination of the given key groups.
///
/// Guarantees:
/// - at most one key per group per combination;
/// - keys within a combination sorted alphabetically;
/// - combinations sorted by size ascending, then alphabetically by their
///   joined key sequence;
/// - no duplicate combinations, even across groups with shared spellings.
///
/// # Example
///
/// ```rust
/// use styleforge_core::combine::combinations;
///
/// let combos = combinations(&[
///     vec!["hover".to_string()],
///     vec!["sm".to_string(), "md".to_string()],
/// ]);
/// assert_eq!(
///     combos,
///     vec![
///         vec!["hover".to_string()],
///         vec!["md".to_string()],
///         vec!["sm".to_string()],
///         vec!["hover".to_string(), "md".to_string()],
///         vec!["hover".to_string(), "sm".to_string()],
///     ]
/// );
/// ```
pub fn combinations(groups: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut current: Vec<String> = Vec::new();
    collect(groups, 0, &mut current, &mut seen);

    let mut out: Vec<Vec<String>> = seen.into_iter().collect();
    out.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| a.join(":").cmp(&b.join(":")))
    });
    out
}

fn collect(
    groups: &[Vec<String>],
    index: usize,
    current: &mut Vec<String>,
    seen: &mut BTreeSet<Vec<String>>,
) {
    if index == groups.len() {
        if !current.is_empty() {
            let mut combo = current.clone();
            combo.sort();
            combo.dedup();
            seen.insert(combo);
        }
        return;
    }

    // Skip this group entirely.
    collect(groups, index + 1, current, seen);

    // Or pick exactly one of its keys.
    for key in &groups[index] {
        current.push(key.clone());
        collect(groups, index + 1, current, seen);
        current.pop();
    }
}
