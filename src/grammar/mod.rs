//! Grammar description and FIRST/FOLLOW sets
//!
//! The grammar here is a fixed table kept apart from the parser. It describes the
//! textbook form of the language (left-recursive `E` and `T`, `F` limited to
//! parentheses and identifiers), so it is informational and does not track every
//! literal the parser accepts. No production derives the empty string.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::sync::OnceLock;

use log::debug;
use serde::Serialize;

/// Nonterminal or terminal name -> set of terminals
pub type SymbolSets = BTreeMap<String, BTreeSet<String>>;

/// A context-free grammar without epsilon productions
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    pub start: &'static str,
    /// Appended to FOLLOW of the start symbol
    pub end_marker: &'static str,
    /// Each nonterminal with its alternatives, in declaration order
    pub productions: &'static [(&'static str, &'static [&'static [&'static str]])],
}

/// S -> if ( E ) S else S | id = E
/// E -> E + T | E - T | T
/// T -> T * F | T / F | F
/// F -> ( E ) | id
pub const CONDITIONAL_GRAMMAR: Grammar = Grammar {
    start: "S",
    end_marker: "$",
    productions: &[
        ("S", &[&["if", "(", "E", ")", "S", "else", "S"], &["id", "=", "E"]]),
        ("E", &[&["E", "+", "T"], &["E", "-", "T"], &["T"]]),
        ("T", &[&["T", "*", "F"], &["T", "/", "F"], &["F"]]),
        ("F", &[&["(", "E", ")"], &["id"]]),
    ],
};

impl Grammar {
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.productions.iter().any(|(lhs, _)| *lhs == symbol)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.productions.iter().map(|(lhs, _)| *lhs)
    }

    /// Every (lhs, alternative) pair
    fn alternatives(&self) -> impl Iterator<Item = (&'static str, &'static [&'static str])> + '_ {
        self.productions
            .iter()
            .flat_map(|(lhs, alts)| alts.iter().map(move |alt| (*lhs, *alt)))
    }
}

/// Computed FIRST and FOLLOW sets. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstFollow {
    first: SymbolSets,
    follow: SymbolSets,
}

impl FirstFollow {
    /// Compute both sets for `grammar` by fixed-point iteration
    pub fn compute(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        debug!(
            "computed FIRST/FOLLOW for {} nonterminal(s)",
            grammar.productions.len()
        );
        Self { first, follow }
    }

    /// Sets for the conditional command grammar, computed on first use
    pub fn shared() -> &'static FirstFollow {
        static SETS: OnceLock<FirstFollow> = OnceLock::new();
        SETS.get_or_init(|| FirstFollow::compute(&CONDITIONAL_GRAMMAR))
    }

    pub fn first_sets(&self) -> &SymbolSets {
        &self.first
    }

    pub fn follow_sets(&self) -> &SymbolSets {
        &self.follow
    }

    /// Two-column table, one row per nonterminal
    pub fn render_table(&self) -> String {
        let rows: Vec<(&str, String, String)> = self
            .first
            .keys()
            .map(|nt| {
                (
                    nt.as_str(),
                    format_set(self.first.get(nt)),
                    format_set(self.follow.get(nt)),
                )
            })
            .collect();

        let nt_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(2);
        let first_width = rows
            .iter()
            .map(|r| r.1.chars().count())
            .max()
            .unwrap_or(0)
            .max("FIRST".len());

        let mut out = String::new();
        let _ = writeln!(out, "{:<nt_width$}  {:<first_width$}  FOLLOW", "NT", "FIRST");
        for (nt, first, follow) in rows {
            let _ = writeln!(out, "{:<nt_width$}  {:<first_width$}  {}", nt, first, follow);
        }
        out
    }
}

fn format_set(set: Option<&BTreeSet<String>>) -> String {
    let items: Vec<&str> = set.into_iter().flatten().map(String::as_str).collect();
    format!("{{ {} }}", items.join(", "))
}

/// Union `items` into `target`, reporting whether anything was added
fn union_into<'a>(target: &mut BTreeSet<String>, items: impl IntoIterator<Item = &'a String>) -> bool {
    let before = target.len();
    target.extend(items.into_iter().cloned());
    target.len() > before
}

fn empty_sets(grammar: &Grammar) -> SymbolSets {
    grammar
        .nonterminals()
        .map(|nt| (nt.to_string(), BTreeSet::new()))
        .collect()
}

/// Only the first symbol of each alternative contributes, since nothing derives epsilon
fn compute_first(grammar: &Grammar) -> SymbolSets {
    let mut first = empty_sets(grammar);

    let mut changed = true;
    while changed {
        changed = false;
        for (lhs, alt) in grammar.alternatives() {
            let Some(&head) = alt.first() else {
                continue;
            };
            let additions: Vec<String> = if grammar.is_nonterminal(head) {
                first.get(head).into_iter().flatten().cloned().collect()
            } else {
                vec![head.to_string()]
            };
            if let Some(set) = first.get_mut(lhs) {
                changed |= union_into(set, &additions);
            }
        }
    }

    first
}

/// For `A -> α B β`: FIRST of the head of β, or FOLLOW(A) when β is empty
fn compute_follow(grammar: &Grammar, first: &SymbolSets) -> SymbolSets {
    let mut follow = empty_sets(grammar);
    if let Some(set) = follow.get_mut(grammar.start) {
        set.insert(grammar.end_marker.to_string());
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (lhs, alt) in grammar.alternatives() {
            for (i, &symbol) in alt.iter().enumerate() {
                if !grammar.is_nonterminal(symbol) {
                    continue;
                }
                let additions: Vec<String> = match alt.get(i + 1) {
                    Some(&next) if grammar.is_nonterminal(next) => {
                        first.get(next).into_iter().flatten().cloned().collect()
                    }
                    Some(&next) => vec![next.to_string()],
                    None => follow.get(lhs).into_iter().flatten().cloned().collect(),
                };
                if let Some(set) = follow.get_mut(symbol) {
                    changed |= union_into(set, &additions);
                }
            }
        }
    }

    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_sets() {
        let sets = FirstFollow::shared();
        let first = sets.first_sets();
        assert_eq!(first.len(), 4);
        assert_eq!(first["S"], set(&["if", "id"]));
        assert_eq!(first["E"], set(&["(", "id"]));
        assert_eq!(first["T"], set(&["(", "id"]));
        assert_eq!(first["F"], set(&["(", "id"]));
    }

    #[test]
    fn test_follow_sets() {
        let sets = FirstFollow::shared();
        let follow = sets.follow_sets();
        assert_eq!(follow.len(), 4);
        assert_eq!(follow["S"], set(&["$", "else"]));
        assert_eq!(follow["E"], set(&["$", "else", ")", "+", "-"]));
        assert_eq!(follow["T"], set(&["$", "else", ")", "+", "-", "*", "/"]));
        assert_eq!(follow["F"], set(&["$", "else", ")", "+", "-", "*", "/"]));
    }

    #[test]
    fn test_shared_sets_are_computed_once() {
        assert!(std::ptr::eq(FirstFollow::shared(), FirstFollow::shared()));
        assert_eq!(*FirstFollow::shared(), FirstFollow::compute(&CONDITIONAL_GRAMMAR));
    }

    #[test]
    fn test_other_grammar() {
        // A -> B x | y ; B -> z A
        let grammar = Grammar {
            start: "A",
            end_marker: "#",
            productions: &[("A", &[&["B", "x"], &["y"]]), ("B", &[&["z", "A"]])],
        };
        let sets = FirstFollow::compute(&grammar);
        assert_eq!(sets.first_sets()["A"], set(&["y", "z"]));
        assert_eq!(sets.first_sets()["B"], set(&["z"]));
        assert_eq!(sets.follow_sets()["A"], set(&["#", "x"]));
        assert_eq!(sets.follow_sets()["B"], set(&["x"]));
    }

    #[test]
    fn test_render_table() {
        let table = FirstFollow::shared().render_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("NT"));
        let s_row = lines.iter().find(|l| l.starts_with("S ")).unwrap();
        assert!(s_row.contains("{ id, if }"), "{s_row}");
        assert!(s_row.contains("{ $, else }"), "{s_row}");
    }
}
