use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SymbolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Constant,
    Label,
    LocalLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub value: u32,
    pub hub: u32,
    pub defined_line: usize,
    pub references: BTreeSet<usize>,
    #[serde(skip)]
    pub resolved: bool,
}

/// Names are case-insensitive. Local labels (`.name`) live under the most
/// recent global label and are stored as `GLOBAL.name`.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
    scope: Option<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scope(&mut self, global: &str) {
        self.scope = Some(global.to_string());
    }

    pub fn clear_scope(&mut self) {
        self.scope = None;
    }

    fn qualified(&self, name: &str, local: bool) -> String {
        if local {
            format!("{}.{name}", self.scope.as_deref().unwrap_or(""))
        } else {
            name.to_string()
        }
    }

    fn key(&self, name: &str, local: bool) -> String {
        self.qualified(name, local).to_ascii_uppercase()
    }

    /// Defines a symbol. A second definition from another line is a
    /// duplicate even when the values agree; re-running the defining line in
    /// the next pass fills in a value pass 1 had to defer.
    pub fn define(
        &mut self,
        name: &str,
        kind: SymbolKind,
        value: u32,
        hub: u32,
        line: usize,
        resolved: bool,
    ) -> Result<&Symbol, SymbolError> {
        let local = kind == SymbolKind::LocalLabel;
        let key = self.key(name, local);
        let display = self.qualified(name, local);
        match self.symbols.entry(key) {
            Entry::Occupied(o) if o.get().defined_line != line => {
                let existing = o.get();
                Err(SymbolError::Duplicate {
                    name: display,
                    line,
                    value,
                    existing_line: existing.defined_line,
                    existing_value: existing.value,
                })
            }
            Entry::Occupied(o) => {
                let existing = o.into_mut();
                let changed = existing.resolved && resolved && existing.value != value;
                let old = existing.value;
                existing.value = value;
                existing.hub = hub;
                existing.resolved |= resolved;
                if changed {
                    return Err(SymbolError::PhaseMismatch { name: display, old, new: value });
                }
                Ok(existing)
            }
            Entry::Vacant(v) => Ok(v.insert(Symbol {
                name: display,
                kind,
                value,
                hub,
                defined_line: line,
                references: BTreeSet::new(),
                resolved,
            })),
        }
    }

    pub fn lookup(&self, name: &str, local: bool) -> Option<&Symbol> {
        self.symbols.get(&self.key(name, local))
    }

    pub fn reference(&mut self, name: &str, local: bool, line: usize) {
        let key = self.key(name, local);
        if let Some(sym) = self.symbols.get_mut(&key) {
            sym.references.insert(line);
        }
    }

    pub fn get(&self, qualified: &str) -> Option<&Symbol> {
        self.symbols.get(&qualified.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Running value of a CON enumeration (`#start, A, B[step], C`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    next: u32,
}

impl Enumeration {
    pub fn new(start: u32) -> Self {
        Self { next: start }
    }

    pub fn assign(&mut self, step: u32) -> u32 {
        let v = self.next;
        self.next = v.wrapping_add(step);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_names_both_lines() {
        let mut t = SymbolTable::new();
        t.define("FOO", SymbolKind::Constant, 1, 0, 5, true).unwrap();
        let err = t.define("foo", SymbolKind::Constant, 1, 0, 9, true).unwrap_err();
        assert_eq!(
            err,
            SymbolError::Duplicate { name: "foo".into(), line: 9, value: 1, existing_line: 5, existing_value: 1 }
        );
    }

    #[test]
    fn same_line_resolves_deferred_value() {
        let mut t = SymbolTable::new();
        t.define("A", SymbolKind::Constant, 0, 0, 3, false).unwrap();
        t.define("A", SymbolKind::Constant, 7, 0, 3, true).unwrap();
        assert_eq!(t.lookup("a", false).map(|s| s.value), Some(7));
    }

    #[test]
    fn value_changing_between_passes_is_reported() {
        let mut t = SymbolTable::new();
        t.define("A", SymbolKind::Label, 2, 8, 4, true).unwrap();
        let err = t.define("a", SymbolKind::Label, 3, 12, 4, true).unwrap_err();
        assert_eq!(err, SymbolError::PhaseMismatch { name: "a".into(), old: 2, new: 3 });
        assert_eq!(t.lookup("A", false).map(|s| (s.value, s.hub)), Some((3, 12)));
    }

    #[test]
    fn locals_follow_the_last_global() {
        let mut t = SymbolTable::new();
        t.set_scope("one");
        t.define("loop", SymbolKind::LocalLabel, 1, 4, 2, true).unwrap();
        t.set_scope("two");
        t.define("loop", SymbolKind::LocalLabel, 5, 20, 6, true).unwrap();
        assert_eq!(t.lookup("loop", true).map(|s| s.value), Some(5));
        assert_eq!(t.get("ONE.LOOP").map(|s| s.value), Some(1));
    }

    #[test]
    fn references_are_ordered_and_unique() {
        let mut t = SymbolTable::new();
        t.define("x", SymbolKind::Label, 0, 0, 1, true).unwrap();
        for line in [9, 3, 9] {
            t.reference("X", false, line);
        }
        let refs: Vec<usize> = t.lookup("x", false).unwrap().references.iter().copied().collect();
        assert_eq!(refs, vec![3, 9]);
    }

    #[test]
    fn enumeration_steps() {
        let mut e = Enumeration::new(0);
        assert_eq!((e.assign(1), e.assign(2), e.assign(1)), (0, 1, 3));
    }
}
