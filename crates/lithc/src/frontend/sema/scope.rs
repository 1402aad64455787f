//! Scoped symbol table

use std::collections::HashMap;
use std::fmt;

use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::common::Position;
use crate::types::Type;

/// A declared name
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
    /// Where the name was declared
    pub position: Position,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type, is_const: bool, position: Position) -> Self {
        Self {
            name: name.into(),
            ty,
            is_const,
            position,
        }
    }
}

/// Stack of lexical scopes, innermost last
///
/// Names are interned once; each scope maps the interned key to its symbol.
/// The global scope exists from construction.
pub struct SymbolTable {
    scopes: Vec<HashMap<DefaultSymbol, Symbol>>,
    interner: DefaultStringInterner,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            interner: DefaultStringInterner::new(),
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope; does nothing when no scope is left
    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of open scopes, the global one included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declare `name` in the innermost scope.
    ///
    /// Returns `false` without touching the table if the innermost scope
    /// already holds `name` (or no scope is open). Outer declarations may be
    /// shadowed.
    pub fn declare_symbol(
        &mut self,
        name: &str,
        ty: Type,
        is_const: bool,
        position: Position,
    ) -> bool {
        let key = self.interner.get_or_intern(name);
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(&key) {
            return false;
        }
        scope.insert(key, Symbol::new(name, ty, is_const, position));
        true
    }

    /// Innermost visible declaration of `name`
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        let key = self.interner.get(name)?;
        self.scopes.iter().rev().find_map(|scope| scope.get(&key))
    }

    pub fn is_symbol_in_current_scope(&self, name: &str) -> bool {
        self.interner
            .get(name)
            .zip(self.scopes.last())
            .is_some_and(|(key, scope)| scope.contains_key(&key))
    }

    /// Replace the type of the innermost visible `name`
    pub fn refine_symbol(&mut self, name: &str, ty: Type) -> bool {
        let Some(key) = self.interner.get(name) else {
            return false;
        };
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&key))
        {
            Some(symbol) => {
                symbol.ty = ty;
                true
            }
            None => false,
        }
    }

    /// Symbols of the outermost scope in declaration order
    pub fn global_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self
            .scopes
            .first()
            .map(|scope| scope.values().collect())
            .unwrap_or_default();
        symbols.sort_by(|a, b| {
            (a.position.line, a.position.column, &a.name)
                .cmp(&(b.position.line, b.position.column, &b.name))
        });
        symbols
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scopes: Vec<Vec<&Symbol>> = self
            .scopes
            .iter()
            .map(|scope| scope.values().collect())
            .collect();
        f.debug_struct("SymbolTable").field("scopes", &scopes).finish()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;
    use std::sync::Arc;

    fn pos(line: usize) -> Position {
        Position::new(Arc::from("scope.li"), line, 1)
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut table = SymbolTable::new();
        assert!(table.declare_symbol("x", Type::int(), false, pos(1)));
        let sym = table.lookup_symbol("x").unwrap();
        assert_eq!(sym.ty, Type::int());
        assert!(!sym.is_const);
        assert!(table.lookup_symbol("y").is_none());
    }

    #[test]
    fn test_redeclaration_keeps_first() {
        let mut table = SymbolTable::new();
        assert!(table.declare_symbol("x", Type::int(), false, pos(1)));
        assert!(!table.declare_symbol("x", Type::string(), true, pos(2)));
        let sym = table.lookup_symbol("x").unwrap();
        assert_eq!(sym.ty, Type::int());
        assert_eq!(sym.position.line, 1);
    }

    #[test]
    fn test_shadowing_and_scope_exit() {
        let mut table = SymbolTable::new();
        table.declare_symbol("x", Type::int(), false, pos(1));

        table.enter_scope();
        assert!(!table.is_symbol_in_current_scope("x"));
        assert!(table.declare_symbol("x", Type::float(), false, pos(2)));
        assert_eq!(table.lookup_symbol("x").unwrap().ty, Type::float());
        assert_eq!(table.depth(), 2);

        table.exit_scope();
        assert_eq!(table.lookup_symbol("x").unwrap().ty, Type::int());
    }

    #[test]
    fn test_exit_scope_on_empty_table() {
        let mut table = SymbolTable::new();
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 0);
        assert!(!table.declare_symbol("x", Type::int(), false, pos(1)));
        assert!(table.lookup_symbol("x").is_none());
    }

    #[test]
    fn test_refine_symbol() {
        let mut table = SymbolTable::new();
        let sig = Type::function(vec![Type::int()], Type::inferred(PrimitiveType::Any));
        table.declare_symbol("f", sig, false, pos(1));
        table.enter_scope();
        assert!(table.refine_symbol("f", Type::function(vec![Type::int()], Type::int())));
        table.exit_scope();
        assert_eq!(table.lookup_symbol("f").unwrap().ty.to_string(), "fn(int) -> int");
        assert!(!table.refine_symbol("missing", Type::int()));
    }

    #[test]
    fn test_global_symbols_in_source_order() {
        let mut table = SymbolTable::new();
        table.declare_symbol("b", Type::int(), false, pos(2));
        table.declare_symbol("a", Type::int(), false, pos(1));
        table.enter_scope();
        table.declare_symbol("local", Type::int(), false, pos(3));
        let names: Vec<_> = table.global_symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
