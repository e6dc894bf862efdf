//! Motif catalogue, count vectors, conversion and oracles.

pub mod catalogue;
mod conversion;
mod counts;
mod external;
mod oracle;

use std::{fmt, ops::Range};

use crate::error::RewireError;

pub use self::{
    catalogue::{CATALOGUE_VERSION, Pattern, PatternCatalogue},
    conversion::{ConversionMatrix, InducedCountConverter},
    counts::MotifCounts,
    external::{ExternalOracle, parse_results},
    oracle::{ExactOracle, MotifOracle},
};

/// Number of vertices in the motifs under study.
///
/// A count vector for size `k` concatenates the pattern blocks of every size
/// from three up to `k`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MotifSize {
    /// Three-vertex patterns only.
    #[default]
    Three,
    /// Three- and four-vertex patterns.
    Four,
    /// Three-, four- and five-vertex patterns.
    Five,
}

impl MotifSize {
    /// All supported sizes in ascending order.
    pub const ALL: [Self; 3] = [Self::Three, Self::Four, Self::Five];

    /// Returns the number of vertices.
    #[must_use]
    pub const fn vertices(self) -> usize {
        match self {
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// Search depth used when re-counting around a switch.
    #[must_use]
    pub const fn depth(self) -> usize {
        self.vertices() - 2
    }

    /// Number of patterns with exactly this many vertices.
    #[must_use]
    pub const fn block_len(self) -> usize {
        match self {
            Self::Three => 4,
            Self::Four => 11,
            Self::Five => 34,
        }
    }

    /// Length of the concatenated count vector for this size.
    #[must_use]
    pub const fn vector_len(self) -> usize {
        match self {
            Self::Three => 4,
            Self::Four => 15,
            Self::Five => 49,
        }
    }

    /// Number of trailing patterns in this size's block that are connected.
    #[must_use]
    pub const fn connected_len(self) -> usize {
        match self {
            Self::Three => 2,
            Self::Four => 6,
            Self::Five => 21,
        }
    }

    /// Sizes whose blocks make up the count vector, smallest first.
    pub fn blocks(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |size| *size <= self)
    }

    /// Position of this size's block inside a concatenated vector.
    #[must_use]
    pub const fn block_range(self) -> Range<usize> {
        let end = self.vector_len();
        end - self.block_len()..end
    }
}

impl TryFrom<usize> for MotifSize {
    type Error = RewireError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            got => Err(RewireError::UnsupportedMotifSize { got }),
        }
    }
}

impl fmt::Display for MotifSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vertices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(MotifSize::Three, 0..4, 1)]
    #[case(MotifSize::Four, 4..15, 2)]
    #[case(MotifSize::Five, 15..49, 3)]
    fn block_layout(#[case] size: MotifSize, #[case] range: Range<usize>, #[case] depth: usize) {
        assert_eq!(size.block_range(), range);
        assert_eq!(size.depth(), depth);
        assert_eq!(size.blocks().map(MotifSize::block_len).sum::<usize>(), size.vector_len());
    }

    #[rstest]
    #[case(2)]
    #[case(6)]
    fn unsupported_sizes_are_rejected(#[case] value: usize) {
        let error = MotifSize::try_from(value).expect_err("size must be rejected");
        assert!(matches!(error, RewireError::UnsupportedMotifSize { got } if got == value));
    }
}
