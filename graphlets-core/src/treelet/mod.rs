//! Treelet algebra used as the dynamic-programming key in color coding.
//!
//! A treelet is a rooted colored tree built by repeatedly merging a *master*
//! treelet with an *other* treelet whose root becomes the master root's last
//! child. Ordering rules in [`Treelet::is_mergeable`] make every tree reachable
//! through exactly one merge sequence, so counts are not duplicated.
//!
//! Treelets are only ever handled through [`TreeletRef`] handles returned by a
//! [`TreeletCache`]; two structurally equal treelets always share one handle
//! and one integer id.

mod cache;
mod colored;
mod set_colored;

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

pub use self::{cache::TreeletCache, colored::ColoredTreelet, set_colored::SetColoredTreelet};

/// Largest palette a treelet can carry.
pub const MAX_COLORS: usize = 32;

/// Set of colors stored as a 32-bit mask.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ColorSet(u32);

impl ColorSet {
    /// Set holding only `color`. Colors beyond [`MAX_COLORS`] are dropped.
    #[must_use]
    pub const fn singleton(color: u8) -> Self {
        if (color as usize) < MAX_COLORS {
            Self(1 << color)
        } else {
            Self(0)
        }
    }

    /// Union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the sets share no color.
    #[must_use]
    pub const fn is_disjoint(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    /// Whether `color` is in the set.
    #[must_use]
    pub const fn contains(self, color: u8) -> bool {
        (color as usize) < MAX_COLORS && self.0 >> color & 1 == 1
    }

    /// Number of colors in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// One flavor of treelet.
///
/// Implementations describe how two treelets combine and which key identifies
/// structurally equal results; the cache takes care of interning.
pub trait Treelet: Sized + Send + Sync + fmt::Debug + 'static {
    /// Value-equality key used for interning.
    type Key: Clone + Eq + Hash + Send + Sync + fmt::Debug;

    /// Singleton treelet whose root has `color`.
    fn singleton(color: u8) -> Self;

    /// Treelet with `other` attached as the last child of `master`'s root.
    ///
    /// Callers must check [`Self::is_mergeable`] first.
    fn merge(master: &TreeletRef<Self>, other: &TreeletRef<Self>) -> Self;

    /// Whether `other` may be attached to `self`.
    ///
    /// Requires disjoint colors and that `other` is not smaller than the
    /// current last child under the flavor's ordering.
    fn is_mergeable(&self, other: &Self) -> bool;

    /// Number of vertices.
    fn size(&self) -> usize;

    /// Colors used by the treelet.
    fn colors(&self) -> ColorSet;

    /// Interning key.
    fn key(&self) -> Self::Key;

    /// Number of root children interchangeable with the last one.
    ///
    /// Dynamic-programming counts for this treelet are divided by this value.
    fn multiplicity(&self) -> u32;
}

#[derive(Debug)]
struct Interned<T> {
    id: u32,
    treelet: T,
}

/// Shared handle to an interned treelet.
///
/// Equality, ordering, and hashing use the interning id only, which is sound because the
/// cache never hands out two handles for equal treelets.
#[derive(Debug)]
pub struct TreeletRef<T>(Arc<Interned<T>>);

impl<T> TreeletRef<T> {
    fn new(id: u32, treelet: T) -> Self {
        Self(Arc::new(Interned { id, treelet }))
    }

    /// Interning id, unique within one cache.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.0.id
    }
}

impl<T> Clone for TreeletRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for TreeletRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0.treelet
    }
}

impl<T> PartialEq for TreeletRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl<T> Eq for TreeletRef<T> {}

impl<T> Hash for TreeletRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl<T> Ord for TreeletRef<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl<T> PartialOrd for TreeletRef<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests;
