//! The registry of shown windows.
//!
//! Every shown window owns exactly one [`Record`]. Records live in an arena
//! and are referred to by generation-checked [`Handle`]s, so a stale handle
//! of a hidden window never reaches the record of a newer one.
use crate::core::Rectangle;
use crate::core::window;
use crate::native::NativeId;

/// A stable reference to a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

/// The native side of a shown window.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The toolkit window this record belongs to.
    pub window: window::Id,
    /// The native window, if the window owns one.
    ///
    /// Child windows are composited into their parent and never own one;
    /// neither does a window whose native creation failed.
    pub native: Option<NativeId>,
    /// The clip region of the window, if any.
    pub clip: Option<Rectangle>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<Record>,
}

/// An arena of [`Record`]s kept in stacking order.
///
/// The first record is the most recently shown (or raised) top-level
/// window. A child window is placed right after the first record.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<Handle>,
}

impl Registry {
    /// Creates an empty [`Registry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record, returning its handle.
    ///
    /// A window is registered at most once; registering it again returns
    /// its existing handle.
    pub fn insert(&mut self, record: Record, child: bool) -> Handle {
        if let Some(handle) = self.find(record.window) {
            log::warn!("window {} is already registered", record.window);
            return handle;
        }

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.record = Some(record);

                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });

                Handle {
                    index,
                    generation: 0,
                }
            }
        };

        if child && !self.order.is_empty() {
            self.order.insert(1, handle);
        } else {
            self.order.insert(0, handle);
        }

        handle
    }

    /// Unregisters a record, returning it.
    pub fn remove(&mut self, handle: Handle) -> Option<Record> {
        let slot = self.slots.get_mut(handle.index as usize)?;

        if slot.generation != handle.generation {
            return None;
        }

        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);

        self.free.push(handle.index);
        self.order.retain(|other| *other != handle);

        Some(record)
    }

    /// Returns the record of a handle, if it is still registered.
    pub fn get(&self, handle: Handle) -> Option<&Record> {
        let slot = self.slots.get(handle.index as usize)?;

        (slot.generation == handle.generation)
            .then_some(slot.record.as_ref())
            .flatten()
    }

    /// Returns the record of a handle, mutably.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Record> {
        let slot = self.slots.get_mut(handle.index as usize)?;

        if slot.generation == handle.generation {
            slot.record.as_mut()
        } else {
            None
        }
    }

    /// Returns the handle of a toolkit window.
    pub fn find(&self, window: window::Id) -> Option<Handle> {
        self.iter()
            .find(|(_, record)| record.window == window)
            .map(|(handle, _)| handle)
    }

    /// Returns the handle owning a native window.
    pub fn find_native(&self, native: NativeId) -> Option<Handle> {
        self.iter()
            .find(|(_, record)| record.native == Some(native))
            .map(|(handle, _)| handle)
    }

    /// Returns true if the toolkit window is registered.
    pub fn contains(&self, window: window::Id) -> bool {
        self.find(window).is_some()
    }

    /// Returns the first record.
    pub fn first(&self) -> Option<&Record> {
        self.order.first().and_then(|handle| self.get(*handle))
    }

    /// Moves a record to the front.
    pub fn raise(&mut self, handle: Handle) {
        if let Some(position) = self.order.iter().position(|other| *other == handle) {
            let handle = self.order.remove(position);
            self.order.insert(0, handle);
        }
    }

    /// Iterates over the records in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Record)> + '_ {
        self.order
            .iter()
            .filter_map(|handle| Some((*handle, self.get(*handle)?)))
    }

    /// Returns the toolkit windows in stacking order.
    pub fn windows(&self) -> Vec<window::Id> {
        self.iter().map(|(_, record)| record.window).collect()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no window is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(window: window::Id, native: Option<u64>) -> Record {
        Record {
            window,
            native: native.map(NativeId),
            clip: None,
        }
    }

    #[test]
    fn new_top_levels_go_first_and_children_second() {
        let (a, b, child) = (window::Id::unique(), window::Id::unique(), window::Id::unique());
        let mut registry = Registry::new();

        let _ = registry.insert(record(a, Some(1)), false);
        let _ = registry.insert(record(b, Some(2)), false);
        let _ = registry.insert(record(child, None), true);

        assert_eq!(registry.windows(), vec![b, child, a]);
        assert_eq!(registry.first().map(|record| record.window), Some(b));
    }

    #[test]
    fn stale_handles_do_not_reach_reused_slots() {
        let (a, b) = (window::Id::unique(), window::Id::unique());
        let mut registry = Registry::new();

        let old = registry.insert(record(a, Some(1)), false);
        assert!(registry.remove(old).is_some());

        let new = registry.insert(record(b, Some(2)), false);

        assert_eq!(old.index, new.index);
        assert!(registry.get(old).is_none());
        assert!(registry.remove(old).is_none());
        assert_eq!(registry.get(new).map(|record| record.window), Some(b));
    }

    #[test]
    fn windows_are_registered_once() {
        let a = window::Id::unique();
        let mut registry = Registry::new();

        let first = registry.insert(record(a, Some(1)), false);
        let second = registry.insert(record(a, Some(1)), false);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_native(NativeId(1)), Some(first));
    }
}
