//! Concurrent interning cache for treelets.

use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use super::{MAX_COLORS, Treelet, TreeletRef};
use crate::error::{GraphletError, Result};

type Split<T> = (TreeletRef<T>, TreeletRef<T>);

/// Interns treelets and remembers how each merged treelet was produced.
///
/// All maps use insert-if-absent semantics: when two workers race on the same
/// merge, the first inserted handle wins and the loser adopts it. Guards on
/// one map are always released before another map is touched.
///
/// # Examples
/// ```
/// use graphlets_core::{ColoredTreelet, TreeletCache, Treelet};
///
/// let cache = TreeletCache::<ColoredTreelet>::new(3)?;
/// let red = cache.singleton(0)?;
/// let blue = cache.singleton(1)?;
/// let pair = cache.merge_treelets(&red, &blue)?;
/// assert_eq!(pair.size(), 2);
/// assert_eq!(cache.merge_treelets(&red, &blue)?, pair);
/// assert_eq!(cache.split_treelet(&pair), vec![(red, blue)]);
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Debug)]
pub struct TreeletCache<T: Treelet> {
    singletons: Vec<TreeletRef<T>>,
    next_id: AtomicU32,
    interned: DashMap<T::Key, TreeletRef<T>>,
    merges: DashMap<(u32, u32), TreeletRef<T>>,
    splits: DashMap<u32, Vec<Split<T>>>,
}

impl<T: Treelet> TreeletCache<T> {
    /// Cache for a palette of `colors` colors.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] unless `colors` lies in
    /// `1..=MAX_COLORS`.
    pub fn new(colors: usize) -> Result<Self> {
        if colors == 0 || colors > MAX_COLORS {
            return Err(GraphletError::InvalidSize {
                size: colors,
                min: 1,
                max: MAX_COLORS,
            });
        }
        let cache = Self {
            singletons: Vec::with_capacity(colors),
            next_id: AtomicU32::new(0),
            interned: DashMap::new(),
            merges: DashMap::new(),
            splits: DashMap::new(),
        };
        let singletons = (0..colors)
            .filter_map(|color| u8::try_from(color).ok())
            .map(|color| cache.intern(T::singleton(color)))
            .collect();
        Ok(Self { singletons, ..cache })
    }

    /// Number of colors in the palette.
    #[must_use]
    pub fn palette(&self) -> usize {
        self.singletons.len()
    }

    /// Number of distinct treelets interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interned.len()
    }

    /// Whether nothing has been interned; never true after construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }

    /// Shared singleton of `color`.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidColoring`] for colors outside the
    /// palette.
    pub fn singleton(&self, color: u8) -> Result<TreeletRef<T>> {
        self.singletons
            .get(usize::from(color))
            .cloned()
            .ok_or_else(|| GraphletError::InvalidColoring {
                reason: format!("color {color} is outside a palette of {}", self.palette()).into(),
            })
    }

    fn intern(&self, treelet: T) -> TreeletRef<T> {
        self.interned
            .entry(treelet.key())
            .or_insert_with(|| TreeletRef::new(self.next_id.fetch_add(1, Ordering::Relaxed), treelet))
            .value()
            .clone()
    }

    /// Merges `other` into `master` and returns the interned result.
    ///
    /// Structurally equal results always come back as the same handle.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidParameter`] when the pair is not
    /// mergeable.
    pub fn merge_treelets(
        &self,
        master: &TreeletRef<T>,
        other: &TreeletRef<T>,
    ) -> Result<TreeletRef<T>> {
        let pair = (master.id(), other.id());
        if let Some(known) = self.merges.get(&pair) {
            return Ok(known.value().clone());
        }
        if !master.is_mergeable(other) {
            return Err(GraphletError::InvalidParameter {
                name: "other",
                reason: "treelets overlap in color or break the child ordering",
            });
        }
        let merged = self.intern(T::merge(master, other));
        let mut first = false;
        let winner = self
            .merges
            .entry(pair)
            .or_insert_with(|| {
                first = true;
                merged
            })
            .value()
            .clone();
        if first {
            self.splits
                .entry(winner.id())
                .or_default()
                .push((master.clone(), other.clone()));
        }
        Ok(winner)
    }

    /// Every `(master, other)` pair observed to merge into `treelet`.
    ///
    /// Singletons and treelets never produced by [`Self::merge_treelets`] have
    /// no splits.
    #[must_use]
    pub fn split_treelet(&self, treelet: &TreeletRef<T>) -> Vec<(TreeletRef<T>, TreeletRef<T>)> {
        self.splits
            .get(&treelet.id())
            .map(|splits| splits.value().clone())
            .unwrap_or_default()
    }
}
