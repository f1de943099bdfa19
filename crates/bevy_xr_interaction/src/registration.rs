use std::hash::Hash;

use bevy::utils::HashSet;

/// An item read from [`RegistrationList::snapshot_entry`].
///
/// The entry remembers which flush it was read under, so it can only be checked with
/// [`RegistrationList::is_still_registered`] against the snapshot it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotEntry<T> {
    item: T,
    generation: u64,
}

impl<T: Copy> SnapshotEntry<T> {
    pub fn item(&self) -> T {
        self.item
    }
}

/// Buffered registration of items.
///
/// Membership changes take effect immediately for [`is_registered`](Self::is_registered), while
/// [`registered_snapshot`](Self::registered_snapshot) keeps its contents until the next
/// [`flush`](Self::flush). This lets callbacks register and unregister items while the snapshot
/// is being walked.
#[derive(Clone, Debug)]
pub struct RegistrationList<T> {
    registered_snapshot: Vec<T>,
    buffered_add: Vec<T>,
    buffered_remove: Vec<T>,
    unordered_buffered_add: HashSet<T>,
    unordered_buffered_remove: HashSet<T>,
    unordered_registered_snapshot: HashSet<T>,
    unordered_registered_items: HashSet<T>,
    generation: u64,
}

impl<T> Default for RegistrationList<T> {
    fn default() -> Self {
        Self {
            registered_snapshot: Vec::new(),
            buffered_add: Vec::new(),
            buffered_remove: Vec::new(),
            unordered_buffered_add: HashSet::default(),
            unordered_buffered_remove: HashSet::default(),
            unordered_registered_snapshot: HashSet::default(),
            unordered_registered_items: HashSet::default(),
            generation: 0,
        }
    }
}

impl<T: Copy + Eq + Hash> RegistrationList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The items as of the last flush, in registration order.
    pub fn registered_snapshot(&self) -> &[T] {
        &self.registered_snapshot
    }

    /// Reads the snapshot item at `index`, or `None` past the end.
    pub fn snapshot_entry(&self, index: usize) -> Option<SnapshotEntry<T>> {
        self.registered_snapshot
            .get(index)
            .map(|&item| SnapshotEntry {
                item,
                generation: self.generation,
            })
    }

    /// Whether `item` is registered, including changes that have not been flushed yet.
    pub fn is_registered(&self, item: &T) -> bool {
        self.unordered_registered_items.contains(item)
    }

    /// Fast registration check for an item read from the current snapshot.
    ///
    /// Only pending removals need checking since a snapshot item can't be pending an add
    /// without having been removed first.
    pub fn is_still_registered(&self, entry: &SnapshotEntry<T>) -> bool {
        debug_assert_eq!(
            entry.generation, self.generation,
            "snapshot entry was read before the last flush"
        );
        self.unordered_buffered_remove.is_empty()
            || !self.unordered_buffered_remove.contains(&entry.item)
    }

    /// Registers `item`, returning `true` if its membership changed.
    pub fn register(&mut self, item: T) -> bool {
        if self.unordered_buffered_add.contains(&item) {
            return false;
        }

        if self.unordered_buffered_remove.remove(&item)
            || !self.unordered_registered_snapshot.contains(&item)
        {
            self.buffered_remove.retain(|other| *other != item);
            self.buffered_add.push(item);
            self.unordered_buffered_add.insert(item);
            self.unordered_registered_items.insert(item);
            return true;
        }

        false
    }

    /// Unregisters `item`, returning `true` if its membership changed.
    pub fn unregister(&mut self, item: T) -> bool {
        if self.unordered_buffered_remove.contains(&item) {
            return false;
        }

        if self.unordered_buffered_add.remove(&item)
            || self.unordered_registered_snapshot.contains(&item)
        {
            self.buffered_add.retain(|other| *other != item);
            self.buffered_remove.push(item);
            self.unordered_buffered_remove.insert(item);
            self.unordered_registered_items.remove(&item);
            return true;
        }

        false
    }

    /// Applies the pending changes to the snapshot.
    pub fn flush(&mut self) {
        if !self.buffered_remove.is_empty() {
            for item in self.buffered_remove.drain(..) {
                if self.unordered_registered_snapshot.remove(&item) {
                    self.registered_snapshot.retain(|other| *other != item);
                }
            }
            self.unordered_buffered_remove.clear();
        }

        if !self.buffered_add.is_empty() {
            for item in self.buffered_add.drain(..) {
                if self.unordered_registered_snapshot.insert(item) {
                    self.registered_snapshot.push(item);
                }
            }
            self.unordered_buffered_add.clear();
        }

        self.generation = self.generation.wrapping_add(1);
    }

    /// The registered items including pending changes: the snapshot without pending removals,
    /// followed by pending additions.
    pub fn registered_items(&self) -> impl Iterator<Item = T> + '_ {
        self.registered_snapshot
            .iter()
            .filter(|item| !self.unordered_buffered_remove.contains(*item))
            .chain(self.buffered_add.iter())
            .copied()
    }

    /// Fills `results` with [`registered_items`](Self::registered_items), clearing it first.
    pub fn get_registered_items(&self, results: &mut Vec<T>) {
        results.clear();
        results.extend(self.registered_items());
    }

    /// Number of registered items including pending changes.
    pub fn len(&self) -> usize {
        self.unordered_registered_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unordered_registered_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_flush() {
        let mut list = RegistrationList::new();
        assert!(list.register(1));
        assert!(list.is_registered(&1));
        assert!(list.registered_snapshot().is_empty());

        list.flush();
        assert_eq!(list.registered_snapshot(), &[1]);
        assert!(list.is_registered(&1));
    }

    #[test]
    fn register_is_idempotent() {
        let mut list = RegistrationList::new();
        assert!(list.register(7));
        assert!(!list.register(7));
        list.flush();
        assert!(!list.register(7));
        assert_eq!(list.registered_snapshot(), &[7]);
    }

    #[test]
    fn unregister_is_immediate_but_snapshot_waits_for_flush() {
        let mut list = RegistrationList::new();
        list.register(1);
        list.register(2);
        list.flush();

        assert!(list.unregister(1));
        assert!(!list.unregister(1));
        assert!(!list.is_registered(&1));
        assert_eq!(list.registered_snapshot(), &[1, 2]);

        list.flush();
        assert_eq!(list.registered_snapshot(), &[2]);
    }

    #[test]
    fn unregister_unknown_item_does_nothing() {
        let mut list = RegistrationList::<u32>::new();
        assert!(!list.unregister(3));
        list.flush();
        assert!(list.registered_snapshot().is_empty());
    }

    #[test]
    fn register_unregister_register_across_flushes() {
        let mut list = RegistrationList::new();
        list.register(5);
        list.flush();
        assert_eq!(list.registered_snapshot(), &[5]);

        list.unregister(5);
        list.flush();
        assert!(list.registered_snapshot().is_empty());

        list.register(5);
        list.flush();
        assert_eq!(list.registered_snapshot(), &[5]);
        assert!(list.is_registered(&5));
    }

    #[test]
    fn re_register_before_flush_keeps_snapshot_order() {
        let mut list = RegistrationList::new();
        list.register(1);
        list.register(2);
        list.register(3);
        list.flush();

        list.unregister(1);
        list.register(1);
        list.flush();
        assert_eq!(list.registered_snapshot(), &[1, 2, 3]);
    }

    #[test]
    fn registered_items_include_pending_changes() {
        let mut list = RegistrationList::new();
        list.register(1);
        list.register(2);
        list.flush();

        list.unregister(1);
        list.register(3);

        let mut items = Vec::new();
        list.get_registered_items(&mut items);
        assert_eq!(items, vec![2, 3]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "snapshot entry was read before the last flush")]
    fn entry_from_older_snapshot_is_rejected() {
        let mut list = RegistrationList::new();
        list.register(1);
        list.flush();
        let entry = list.snapshot_entry(0).unwrap();

        list.flush();
        list.is_still_registered(&entry);
    }

    #[test]
    fn still_registered_during_iteration() {
        let mut list = RegistrationList::new();
        list.register(1);
        list.register(2);
        list.flush();

        let mut visited = Vec::new();
        let mut index = 0;
        while let Some(entry) = list.snapshot_entry(index) {
            index += 1;
            if !list.is_still_registered(&entry) {
                continue;
            }
            visited.push(entry.item());
            // Unregistering a later item while walking the snapshot skips it.
            list.unregister(2);
            list.register(4);
        }

        assert_eq!(visited, vec![1]);
        assert_eq!(list.registered_snapshot(), &[1, 2]);
        list.flush();
        assert_eq!(list.registered_snapshot(), &[1, 4]);
    }
}
