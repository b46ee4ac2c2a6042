//! Treelets keyed by rooted shape plus color set.
//!
//! Ignoring which vertex carries which color collapses every colorful
//! occurrence of a rooted shape into one table entry, which keeps the tables
//! small for larger motifs.

use std::cmp::Ordering;

use super::{ColorSet, Treelet, TreeletRef};

/// Rooted unordered tree shape in a canonical encoding.
///
/// The code is the depth-first traversal of the canonically ordered tree with
/// one bit per vertex entry and exit, dropping the final exit. Shapes order by
/// size first, then by code.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Shape {
    size: usize,
    code: u64,
}

impl Shape {
    const SINGLETON: Self = Self { size: 1, code: 1 };

    /// Appends `child` as the last subtree of the root.
    ///
    /// The child contributes its own code followed by its closing exit bit,
    /// so the result again omits only the root's exit.
    fn attach(self, child: Self) -> Self {
        Self {
            size: self.size + child.size,
            code: (self.code << (2 * child.size)) | (child.code << 1),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }
}

/// Set-colored treelet; root children appear in non-decreasing shape order.
#[derive(Clone, Debug)]
pub struct SetColoredTreelet {
    shape: Shape,
    colors: ColorSet,
    last_child: Option<Shape>,
    twins: u32,
}

impl SetColoredTreelet {
    /// Rooted shape of the treelet.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }
}

impl Treelet for SetColoredTreelet {
    type Key = (Shape, ColorSet);

    fn singleton(color: u8) -> Self {
        Self {
            shape: Shape::SINGLETON,
            colors: ColorSet::singleton(color),
            last_child: None,
            twins: 1,
        }
    }

    fn merge(master: &TreeletRef<Self>, other: &TreeletRef<Self>) -> Self {
        let twins = match master.last_child {
            Some(last) if last == other.shape => master.twins + 1,
            _ => 1,
        };
        Self {
            shape: master.shape.attach(other.shape),
            colors: master.colors.union(other.colors),
            last_child: Some(other.shape),
            twins,
        }
    }

    fn is_mergeable(&self, other: &Self) -> bool {
        self.colors.is_disjoint(other.colors)
            && self
                .last_child
                .is_none_or(|last| other.shape.cmp(&last) != Ordering::Less)
    }

    fn size(&self) -> usize {
        self.shape.size
    }

    fn colors(&self) -> ColorSet {
        self.colors
    }

    fn key(&self) -> (Shape, ColorSet) {
        (self.shape, self.colors)
    }

    fn multiplicity(&self) -> u32 {
        self.twins
    }
}
