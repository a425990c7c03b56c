//! Root snapshots. A call that allocates may run a collection, and a collection may move or
//! reclaim anything it can't see. Callers register every word they still need after the call in a
//! [Roots] value, pass it to the call, and read the words back from it afterwards. Words kept
//! anywhere else are not guaranteed to be valid after the call returns.

use crate::word::Word;

/// Position of a word inside a [Roots] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootIndex(usize);

#[derive(Debug, Clone, Default)]
pub struct Roots {
    slots: Vec<Word>,
}

impl Roots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Registers a live word, returns where to read it back from.
    pub fn push(&mut self, word: Word) -> RootIndex {
        self.slots.push(word);
        RootIndex(self.slots.len() - 1)
    }

    pub fn get(&self, index: RootIndex) -> Word {
        self.slots[index.0]
    }

    pub fn set(&mut self, index: RootIndex, word: Word) {
        self.slots[index.0] = word;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drops every root registered after the first `len`. Used to scope a group of roots to a
    /// single call.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.slots.iter()
    }

    /// Mutable access for the collector, which rewrites roots of moved objects in place.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Word> {
        self.slots.iter_mut()
    }
}

impl FromIterator<Word> for Roots {
    fn from_iter<T: IntoIterator<Item = Word>>(iter: T) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::make_unboxed;

    #[test]
    fn push_and_read_back() {
        let mut roots = Roots::new();
        let a = roots.push(make_unboxed(1));
        let b = roots.push(make_unboxed(2));

        assert_eq!(roots.len(), 2);
        assert_eq!(roots.get(a), make_unboxed(1));
        assert_eq!(roots.get(b), make_unboxed(2));

        roots.set(a, make_unboxed(3));
        assert_eq!(roots.get(a), make_unboxed(3));
    }

    #[test]
    fn rewritten_by_collector() {
        let mut roots: Roots = (0..4).map(make_unboxed).collect();
        for word in roots.iter_mut() {
            *word = make_unboxed(10);
        }

        assert!(roots.iter().all(|word| *word == make_unboxed(10)));
    }

    #[test]
    fn truncate_scopes_roots() {
        let mut roots = Roots::with_capacity(4);
        roots.push(make_unboxed(1));
        let mark = roots.len();
        roots.push(make_unboxed(2));
        roots.push(make_unboxed(3));
        roots.truncate(mark);

        assert_eq!(roots.len(), 1);
        assert!(!roots.is_empty());
    }
}
