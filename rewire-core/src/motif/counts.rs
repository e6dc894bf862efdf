//! Dense pattern-count vectors.

use std::ops::Index;

use crate::error::{Result, RewireError};

/// Ordered pattern counts.
///
/// Whether the counts are induced or non-induced is a property of the
/// producing operation, not of the type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotifCounts(Vec<f64>);

impl MotifCounts {
    /// Wraps an existing vector.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// A vector of `len` zeroes.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the vector has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the entries.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Entry `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Iterates the entries.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Element-wise `self - earlier`.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] when the lengths differ.
    pub fn difference(&self, earlier: &Self) -> Result<Self> {
        self.zip_with(earlier, |after, before| after - before)
    }

    /// Element-wise `self + delta`.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] when the lengths differ.
    pub fn plus(&self, delta: &Self) -> Result<Self> {
        self.zip_with(delta, |base, step| base + step)
    }

    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.len() != other.len() {
            return Err(RewireError::CountLength {
                expected: self.len(),
                found: other.len(),
            });
        }
        Ok(Self(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(&left, &right)| op(left, right))
                .collect(),
        ))
    }
}

impl From<Vec<f64>> for MotifCounts {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl Index<usize> for MotifCounts {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_element_wise() {
        let before = MotifCounts::new(vec![4.0, 2.0, 1.0]);
        let after = MotifCounts::new(vec![5.0, 2.0, 0.0]);
        let delta = after.difference(&before).expect("same length");
        assert_eq!(delta.as_slice(), &[1.0, 0.0, -1.0]);
        assert_eq!(before.plus(&delta).expect("same length"), after);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let error = MotifCounts::zeros(4)
            .plus(&MotifCounts::zeros(15))
            .expect_err("lengths differ");
        assert!(matches!(
            error,
            RewireError::CountLength {
                expected: 4,
                found: 15
            }
        ));
    }
}
