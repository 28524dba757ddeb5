//! The stack of open menu levels.
//!
//! Levels are contiguous: level `i + 1` is open only while level `i`
//! highlights the item it was opened from. Anything that breaks this
//! closes the deeper levels, deepest first.

/// An open level.
#[derive(Debug)]
pub struct Entry<T> {
    /// What the owner keeps for the level.
    pub level: T,
    /// The highlighted item.
    pub highlight: Option<usize>,
    /// The index of the parent level.
    pub origin: Option<usize>,
}

/// The open levels of a menu session.
#[derive(Debug)]
pub struct Stack<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of open levels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no level is open.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an open level.
    pub fn get(&self, index: usize) -> Option<&Entry<T>> {
        self.entries.get(index)
    }

    /// Iterates over the open levels, outermost first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entry<T>> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Opens the first level, closing every other one.
    pub fn open_root(&mut self, level: T) -> Vec<T> {
        let closed = self.truncate(0);

        self.entries.push(Entry {
            level,
            highlight: None,
            origin: None,
        });

        closed
    }

    /// Opens a level from `item` of level `parent`.
    ///
    /// Levels deeper than `parent` are closed first and returned deepest
    /// first; the parent highlights `item`.
    pub fn open(&mut self, parent: usize, item: usize, level: T) -> Vec<T> {
        if parent >= self.entries.len() {
            return vec![level];
        }

        let closed = self.truncate(parent + 1);
        self.entries[parent].highlight = Some(item);

        self.entries.push(Entry {
            level,
            highlight: None,
            origin: Some(parent),
        });

        closed
    }

    /// Highlights an item of a level.
    ///
    /// A changed highlight closes the deeper levels, which were opened
    /// from the previous one.
    pub fn highlight(&mut self, index: usize, item: Option<usize>) -> Vec<T> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Vec::new();
        };

        if entry.highlight == item {
            return Vec::new();
        }

        entry.highlight = item;
        self.truncate(index + 1)
    }

    /// Keeps the first `len` levels, returning the others deepest first.
    pub fn truncate(&mut self, len: usize) -> Vec<T> {
        let mut closed = Vec::new();

        while self.entries.len() > len {
            if let Some(entry) = self.entries.pop() {
                closed.push(entry.level);
            }
        }

        closed
    }

    /// Closes every level, deepest first.
    pub fn clear(&mut self) -> Vec<T> {
        self.truncate(0)
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}
