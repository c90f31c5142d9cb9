use slab::Slab;

use crate::types::{Value, Var};

type Key = usize; // slot in |cells| holding the variable's value
type Index = fnv::FnvHashMap<Var, Key>;

/// Variable store. Variables come into existence on first write; reading
/// a name that was never written yields `None` and the engine turns that
/// into a read-access error.
#[derive(Debug, Default)]
pub struct Memory {
    cells: Slab<Value>,
    index: Index,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cells: Slab::new(),
            index: Index::default(),
        }
    }

    pub fn load(&self, name: &str) -> Option<&Value> {
        self.index.get(name).and_then(|&key| self.cells.get(key))
    }

    pub fn store(&mut self, name: &Var, value: Value) {
        match self.index.get(name) {
            Some(&key) => {
                if let Some(cell) = self.cells.get_mut(key) {
                    *cell = value;
                }
            }
            None => {
                let key = self.cells.insert(value);
                self.index.insert(name.clone(), key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
