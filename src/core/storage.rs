use std::fmt::Debug;
use crate::bodies::RigidBody;
use crate::constraints::Joint;
use crate::core::{BodyHandle, JointHandle};
use crate::error::PhysicsError;
use crate::Result;

/// A typed identifier handed out by a [`Storage`]
pub trait Handle: Copy + Ord + Debug {
    /// Builds a handle from its raw id
    fn from_raw(id: u32) -> Self;
}

/// Insertion-ordered storage for physics objects.
///
/// Items are kept in the order they were added, which is also handle order
/// since ids only ever increase. Iteration is therefore deterministic and
/// lookups are a binary search.
#[derive(Debug, Clone)]
pub struct Storage<H, T> {
    items: Vec<(H, T)>,
    next_id: u32,
}

/// Storage for rigid bodies
pub type BodyStorage = Storage<BodyHandle, RigidBody>;

/// Storage for joints
pub type JointStorage = Storage<JointHandle, Joint>;

impl<H: Handle, T> Storage<H, T> {
    /// Creates a new empty storage
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1, // Start at 1, so 0 can represent invalid handle
        }
    }

    /// Adds an item to the storage and returns its handle
    pub fn add(&mut self, item: T) -> H {
        let handle = H::from_raw(self.next_id);
        self.next_id += 1;
        self.items.push((handle, item));
        handle
    }

    fn index_of(&self, handle: H) -> Option<usize> {
        self.items.binary_search_by(|(h, _)| h.cmp(&handle)).ok()
    }

    /// Returns whether the handle refers to a stored item
    pub fn contains(&self, handle: H) -> bool {
        self.index_of(handle).is_some()
    }

    /// Gets a reference to an item by its handle
    pub fn get(&self, handle: H) -> Option<&T> {
        let i = self.index_of(handle)?;
        Some(&self.items[i].1)
    }

    /// Gets a mutable reference to an item by its handle
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let i = self.index_of(handle)?;
        Some(&mut self.items[i].1)
    }

    /// Gets an item by its handle, returning an error if not found
    pub fn fetch(&self, handle: H) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} not found", handle)))
    }

    /// Gets a mutable reference to an item by its handle, returning an error if not found
    pub fn fetch_mut(&mut self, handle: H) -> Result<&mut T> {
        self.get_mut(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} not found", handle)))
    }

    /// Gets mutable references to two distinct items at once
    pub fn fetch_pair_mut(&mut self, a: H, b: H) -> Result<(&mut T, &mut T)> {
        if a == b {
            return Err(PhysicsError::InvalidParameter(format!(
                "{:?} cannot be borrowed twice",
                a
            )));
        }

        let ia = self
            .index_of(a)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} not found", a)))?;
        let ib = self
            .index_of(b)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} not found", b)))?;

        if ia < ib {
            let (left, right) = self.items.split_at_mut(ib);
            Ok((&mut left[ia].1, &mut right[0].1))
        } else {
            let (left, right) = self.items.split_at_mut(ia);
            Ok((&mut right[0].1, &mut left[ib].1))
        }
    }

    /// Removes an item from the storage
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let i = self.index_of(handle)?;
        Some(self.items.remove(i).1)
    }

    /// Returns the number of items in the storage
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears all items from the storage. Handles are not reused afterwards.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns an iterator over all items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.items.iter().map(|(h, item)| (*h, item))
    }

    /// Returns a mutable iterator over all items in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.items.iter_mut().map(|(h, item)| (*h, item))
    }

    /// Keeps only the items for which the predicate returns true
    pub fn retain(&mut self, mut keep: impl FnMut(H, &T) -> bool) {
        self.items.retain(|(h, item)| keep(*h, item));
    }
}

impl<H: Handle, T> Default for Storage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
