//! Counts of canonical signatures.

use std::{collections::HashMap, fmt};

use crate::canon::Signature;

/// Occurrence counts per isomorphism class.
///
/// # Examples
/// ```
/// use graphlets_core::{Signature, SignatureHistogram};
///
/// let path = Signature::from_u64(3, 0b101)?;
/// let triangle = Signature::from_u64(3, 0b111)?;
/// let mut histogram = SignatureHistogram::new();
/// histogram.add(path.clone());
/// histogram.add(path);
/// histogram.add(triangle);
/// assert_eq!(histogram.total(), 3);
/// assert_eq!(histogram.to_string(), "5: 2 (66.67%)\n7: 1 (33.33%)\n");
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignatureHistogram {
    counts: HashMap<Signature, u64>,
    total: u64,
}

impl SignatureHistogram {
    /// Empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `signature`.
    pub fn add(&mut self, signature: Signature) {
        self.add_count(signature, 1);
    }

    /// Counts `count` occurrences of `signature`.
    pub fn add_count(&mut self, signature: Signature, count: u64) {
        if count == 0 {
            return;
        }
        *self.counts.entry(signature).or_insert(0) += count;
        self.total += count;
    }

    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (signature, count) in other.counts {
            self.add_count(signature, count);
        }
    }

    /// Number of occurrences counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count of `signature`.
    #[must_use]
    pub fn get(&self, signature: &Signature) -> u64 {
        self.counts.get(signature).copied().unwrap_or(0)
    }

    /// Entries by decreasing count, ties by increasing signature.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&Signature, u64)> {
        let mut entries: Vec<(&Signature, u64)> = self
            .counts
            .iter()
            .map(|(signature, &count)| (signature, count))
            .collect();
        entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
        entries
    }

    /// Share of all occurrences, in percent.
    #[must_use]
    pub fn percentage(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for SignatureHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (signature, count) in self.sorted() {
            writeln!(f, "{signature}: {count} ({:.2}%)", self.percentage(count))?;
        }
        Ok(())
    }
}

impl Extend<Signature> for SignatureHistogram {
    fn extend<I: IntoIterator<Item = Signature>>(&mut self, signatures: I) {
        for signature in signatures {
            self.add(signature);
        }
    }
}

impl FromIterator<Signature> for SignatureHistogram {
    fn from_iter<I: IntoIterator<Item = Signature>>(signatures: I) -> Self {
        let mut histogram = Self::new();
        histogram.extend(signatures);
        histogram
    }
}
