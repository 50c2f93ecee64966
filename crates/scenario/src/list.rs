use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::object::{GameObject, ObjectId};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("an object with id {0} is already present")]
pub struct DuplicateId(pub ObjectId);

/// Insertion-ordered collection of one entity kind with O(1) lookup by id.
/// Iteration order equals file row order and is preserved across a
/// load→save round trip.
#[derive(Debug)]
pub struct GameObjectList<T> {
    items: Vec<Rc<RefCell<T>>>,
    by_id: HashMap<ObjectId, usize>,
}

impl<T: GameObject> GameObjectList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Appends an entity. Rejects a duplicate id and leaves the collection
    /// unchanged in that case.
    pub fn add(&mut self, object: T) -> Result<Rc<RefCell<T>>, DuplicateId> {
        let id = object.id();
        if self.by_id.contains_key(&id) {
            return Err(DuplicateId(id));
        }
        let cell = Rc::new(RefCell::new(object));
        self.by_id.insert(id, self.items.len());
        self.items.push(Rc::clone(&cell));
        Ok(cell)
    }

    pub(crate) fn add_shared(&mut self, cell: Rc<RefCell<T>>) -> Result<(), DuplicateId> {
        let id = cell.borrow().id();
        if self.by_id.contains_key(&id) {
            return Err(DuplicateId(id));
        }
        self.by_id.insert(id, self.items.len());
        self.items.push(cell);
        Ok(())
    }

    pub fn get_by_id(&self, id: ObjectId) -> Option<Rc<RefCell<T>>> {
        self.by_id.get(&id).map(|&index| Rc::clone(&self.items[index]))
    }

    /// Returns a new view over the entities matching `predicate`, sharing
    /// the underlying cells and preserving source order. The source is not
    /// touched; derived collections are recomputed on every call.
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> GameObjectList<T> {
        let mut view = GameObjectList::new();
        for cell in &self.items {
            if predicate(&cell.borrow()) {
                // ids are unique in the source, so re-adding cannot fail
                let _ = view.add_shared(Rc::clone(cell));
            }
        }
        view
    }

    /// Returns the element comparing greatest. Ties keep the earlier
    /// element, so comparators wanting a different tie-break must encode it.
    pub fn max_by(&self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Option<Rc<RefCell<T>>> {
        let mut best: Option<&Rc<RefCell<T>>> = None;
        for cell in &self.items {
            match best {
                None => best = Some(cell),
                Some(current) => {
                    if compare(&cell.borrow(), &current.borrow()) == Ordering::Greater {
                        best = Some(cell);
                    }
                }
            }
        }
        best.map(Rc::clone)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<RefCell<T>>> {
        self.items.iter()
    }
}

impl<T: GameObject> Default for GameObjectList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a GameObjectList<T> {
    type Item = &'a Rc<RefCell<T>>;
    type IntoIter = std::slice::Iter<'a, Rc<RefCell<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
