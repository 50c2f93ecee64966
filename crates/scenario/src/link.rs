use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::object::ObjectId;

/// Reserved id meaning "no reference" in link columns of the save files.
pub(crate) const NO_LINK: i32 = -1;

/// A cross-kind reference. Between load and resolution it is a raw id;
/// afterwards a live shared reference. Exactly one representation is valid
/// at a time, and only the resolution pass in `scenario` turns `Raw` into
/// `Live`.
pub enum Link<T> {
    None,
    Raw(ObjectId),
    Live {
        id: ObjectId,
        target: Rc<RefCell<T>>,
    },
}

impl<T> Link<T> {
    pub(crate) fn from_raw(raw: i32) -> Self {
        if raw == NO_LINK {
            Link::None
        } else {
            Link::Raw(ObjectId(raw))
        }
    }

    pub(crate) fn raw_id(&self) -> Option<ObjectId> {
        match self {
            Link::Raw(id) => Some(*id),
            _ => None,
        }
    }

    pub(crate) fn resolve(&mut self, id: ObjectId, target: Rc<RefCell<T>>) {
        *self = Link::Live { id, target };
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Link::None)
    }

    pub fn live(&self) -> Option<&Rc<RefCell<T>>> {
        match self {
            Link::Live { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Target id without borrowing the target. `None` unless resolved.
    pub fn linked_id(&self) -> Option<ObjectId> {
        match self {
            Link::Live { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// For references that are mandatory after resolution. Calling this on
    /// an unresolved link is a bug in the caller, not a recoverable state.
    pub fn expect_live(&self, what: &str) -> Rc<RefCell<T>> {
        match self {
            Link::Live { target, .. } => Rc::clone(target),
            _ => panic!("{what} accessed before resolution"),
        }
    }

    /// Save-file id for this link. A `Raw` link here means the resolution
    /// pass never ran over this entity; that invariant broke earlier.
    pub(crate) fn save_id(&self) -> i32 {
        match self {
            Link::None => NO_LINK,
            Link::Live { id, .. } => id.0,
            Link::Raw(id) => panic!("link to {id} was never resolved"),
        }
    }
}

impl<T> Default for Link<T> {
    fn default() -> Self {
        Link::None
    }
}

// Prints only the target id; following the shared reference would recurse
// through reference cycles (faction -> leader -> faction).
impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::None => write!(f, "Link::None"),
            Link::Raw(id) => write!(f, "Link::Raw({id})"),
            Link::Live { id, .. } => write!(f, "Link::Live({id})"),
        }
    }
}
