use crate::index::ArenaIndex;
use std::collections::HashMap;

/// An interner which stores each distinct string once and hands out stable
/// typed indices for it.
///
/// One table instance is kept per index role so that e.g. a production name
/// id can never be used to look up a terminal body string.
pub struct SymbolTable<TId: ArenaIndex> {
    values: Vec<String>,
    indices: HashMap<String, TId>,
}

impl<TId: ArenaIndex> SymbolTable<TId> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            indices: HashMap::new(),
        }
    }

    /// Intern `value` and return its id together with whether a new entry
    /// was inserted.
    pub fn intern(&mut self, value: &str) -> (TId, bool) {
        debug_assert!(!value.is_empty());
        match self.indices.get(value) {
            Some(id) => (*id, false),
            None => {
                let id = TId::from_usize(self.values.len());
                self.values.push(value.to_string());
                self.indices.insert(value.to_string(), id);
                (id, true)
            }
        }
    }

    /// Id of an already interned string, or the invalid sentinel.
    pub fn get(&self, value: &str) -> TId {
        match self.indices.get(value) {
            Some(id) => *id,
            None => TId::invalid(),
        }
    }

    pub fn lookup(&self, id: TId) -> &str {
        debug_assert!(id.is_valid());
        &self.values[id.to_usize()]
    }
}
