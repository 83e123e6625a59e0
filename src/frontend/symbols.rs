//! Scoped symbol table used by semantic analysis

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::frontend::semantic::SemanticType;
use crate::utils::Position;

/// Symbol information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub declared_type: SemanticType,
    /// Where the symbol was declared
    pub pos: Position,
}

impl Symbol {
    pub fn new(name: impl Into<String>, declared_type: SemanticType, pos: Position) -> Self {
        Self { name: name.into(), declared_type, pos }
    }
}

/// Symbol table with nested scopes. The global scope is always present.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: vec![HashMap::new()] }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Exit the current scope. The global scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare a symbol in the current scope. Returns false if the name is already
    /// declared in that scope; shadowing an outer scope is allowed.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(&symbol.name) {
            return false;
        }
        scope.insert(symbol.name.clone(), symbol);
        true
    }

    /// Look up a symbol, searching from the innermost scope outward
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Number of open scopes, including the global one
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
