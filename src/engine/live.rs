//! Tombstoned candidate list.
//!
//! Policies scan candidates by slot index while discarding some of them.
//! Removing an element leaves a tombstone in its slot instead of shifting
//! the rest, so slot indices stay valid for the whole scan and nothing is
//! ever skipped or visited twice because the list changed underneath.

/// An index-addressed list whose elements can be removed in place.
#[derive(Debug, Clone)]
pub struct LiveList<T> {
    slots: Vec<Option<T>>,
    live: usize,
}

impl<T> LiveList<T> {
    /// Create a list with every element live.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let live = items.len();
        Self {
            slots: items.into_iter().map(Some).collect(),
            live,
        }
    }

    /// Element in `slot`, unless it was removed.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Remove the element in `slot`, returning it if it was still live.
    pub fn remove(&mut self, slot: usize) -> Option<T> {
        let removed = self.slots.get_mut(slot).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// First live slot at or after `from`.
    #[must_use]
    pub fn next_live(&self, from: usize) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(slot, item)| item.as_ref().map(|_| slot))
    }

    /// Live elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if every element has been removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
