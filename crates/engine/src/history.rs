use crate::store::PathStore;

/// Undo/redo stacks of whole path stores.
#[derive(Debug, Clone, PartialEq)]
pub struct PathHistory {
    undo_stack: Vec<PathStore>,
    redo_stack: Vec<PathStore>,
    limit: usize,
}

impl PathHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Records the store that a change just replaced.
    pub fn record(&mut self, previous: PathStore) {
        if self.limit == 0 {
            return;
        }
        if self.undo_stack.len() >= self.limit {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(previous);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: PathStore) -> Result<PathStore, PathStore> {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.redo_stack.push(current);
                Ok(previous)
            }
            None => Err(current),
        }
    }

    pub fn redo(&mut self, current: PathStore) -> Result<PathStore, PathStore> {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(current);
                Ok(next)
            }
            None => Err(current),
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
