//! Treelets whose children are ordered by root color.

use super::{ColorSet, Treelet, TreeletRef};

/// Interning key of a [`ColoredTreelet`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ColoredKey {
    /// Single vertex of the given color.
    Singleton(u8),
    /// Ids of the master and the last-attached treelet.
    Merged(u32, u32),
}

/// Colored treelet; root children appear in strictly increasing root color.
///
/// Every colorful rooted tree has exactly one derivation, so counts never need
/// correcting and [`Treelet::multiplicity`] is always one.
#[derive(Clone, Debug)]
pub struct ColoredTreelet {
    size: usize,
    root_color: u8,
    colors: ColorSet,
    last_child_color: Option<u8>,
    key: ColoredKey,
}

impl ColoredTreelet {
    /// Color of the root vertex.
    #[must_use]
    pub const fn root_color(&self) -> u8 {
        self.root_color
    }
}

impl Treelet for ColoredTreelet {
    type Key = ColoredKey;

    fn singleton(color: u8) -> Self {
        Self {
            size: 1,
            root_color: color,
            colors: ColorSet::singleton(color),
            last_child_color: None,
            key: ColoredKey::Singleton(color),
        }
    }

    fn merge(master: &TreeletRef<Self>, other: &TreeletRef<Self>) -> Self {
        Self {
            size: master.size + other.size,
            root_color: master.root_color,
            colors: master.colors.union(other.colors),
            last_child_color: Some(other.root_color),
            key: ColoredKey::Merged(master.id(), other.id()),
        }
    }

    fn is_mergeable(&self, other: &Self) -> bool {
        self.colors.is_disjoint(other.colors)
            && self
                .last_child_color
                .is_none_or(|last| last < other.root_color)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn colors(&self) -> ColorSet {
        self.colors
    }

    fn key(&self) -> ColoredKey {
        self.key
    }

    fn multiplicity(&self) -> u32 {
        1
    }
}
