//! Linear conversion between non-induced and induced pattern counts.
//!
//! For a fixed vertex count, `non_induced = M * induced` where `M[i][j]` is
//! the number of copies of pattern `i` among the edge subsets of pattern `j`.
//! Each `M` is unitriangular, so the inverse always exists; it is still
//! checked when the converter is built.

use nalgebra::{DMatrix, DVector, Dyn, LU};
use tracing::debug;

use super::{MotifCounts, MotifSize, PatternCatalogue};
use crate::error::{Result, RewireError};

/// Conversion matrix for one pattern size with its LU factorisation.
#[derive(Clone, Debug)]
pub struct ConversionMatrix {
    size: MotifSize,
    matrix: DMatrix<f64>,
    lu: LU<f64, Dyn, Dyn>,
}

impl ConversionMatrix {
    /// Derives the matrix from the containment table of `catalogue`.
    ///
    /// # Errors
    /// Returns [`RewireError::SingularConversion`] when the matrix cannot be
    /// inverted.
    pub fn from_catalogue(catalogue: &PatternCatalogue) -> Result<Self> {
        let containment = catalogue.containment();
        let dimension = containment.len();
        let matrix = DMatrix::from_fn(dimension, dimension, |row, column| {
            containment[row][column] as f64
        });
        let lu = matrix.clone().lu();
        if !lu.is_invertible() {
            return Err(RewireError::SingularConversion {
                size: catalogue.size().vertices(),
            });
        }
        Ok(Self {
            size: catalogue.size(),
            matrix,
            lu,
        })
    }

    /// Pattern size the matrix belongs to.
    #[must_use]
    pub fn size(&self) -> MotifSize {
        self.size
    }

    /// Number of rows and columns.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// Entry at `(row, column)`.
    #[must_use]
    pub fn entry(&self, row: usize, column: usize) -> Option<f64> {
        self.matrix.get((row, column)).copied()
    }

    /// Solves `M * induced = non_induced`, rounding to whole counts.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] for a block of the wrong length and
    /// [`RewireError::SingularConversion`] if the factorisation cannot solve.
    pub fn solve(&self, non_induced: &[f64]) -> Result<Vec<f64>> {
        self.check_len(non_induced)?;
        let rhs = DVector::from_column_slice(non_induced);
        let solution = self
            .lu
            .solve(&rhs)
            .ok_or(RewireError::SingularConversion {
                size: self.size.vertices(),
            })?;
        // Exact results are integral; drop float noise and negative zero.
        Ok(solution.iter().map(|value| value.round() + 0.0).collect())
    }

    /// Computes `M * induced`.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] for a block of the wrong length.
    pub fn apply(&self, induced: &[f64]) -> Result<Vec<f64>> {
        self.check_len(induced)?;
        let product = &self.matrix * DVector::from_column_slice(induced);
        Ok(product.iter().copied().collect())
    }

    fn check_len(&self, block: &[f64]) -> Result<()> {
        if block.len() == self.dimension() {
            Ok(())
        } else {
            Err(RewireError::CountLength {
                expected: self.dimension(),
                found: block.len(),
            })
        }
    }
}

/// Converts concatenated count vectors block by block.
///
/// # Examples
/// ```
/// use rewire_core::{InducedCountConverter, MotifCounts, MotifSize};
///
/// let converter = InducedCountConverter::new()?;
/// // A lone triangle holds three edges, three wedges and itself.
/// let non_induced = MotifCounts::new(vec![1.0, 3.0, 3.0, 1.0]);
/// let induced = converter.to_induced(&non_induced, MotifSize::Three)?;
/// assert_eq!(induced.as_slice(), &[0.0, 0.0, 0.0, 1.0]);
/// # Ok::<(), rewire_core::RewireError>(())
/// ```
#[derive(Clone, Debug)]
pub struct InducedCountConverter {
    matrices: [ConversionMatrix; 3],
}

impl InducedCountConverter {
    /// Builds and validates the matrices for every supported size.
    ///
    /// # Errors
    /// Returns [`RewireError::SingularConversion`] when a matrix fails its
    /// invertibility check.
    pub fn new() -> Result<Self> {
        let three = ConversionMatrix::from_catalogue(PatternCatalogue::get(MotifSize::Three))?;
        let four = ConversionMatrix::from_catalogue(PatternCatalogue::get(MotifSize::Four))?;
        let five = ConversionMatrix::from_catalogue(PatternCatalogue::get(MotifSize::Five))?;
        debug!(
            dimensions = ?[three.dimension(), four.dimension(), five.dimension()],
            "conversion matrices validated"
        );
        Ok(Self {
            matrices: [three, four, five],
        })
    }

    /// The matrix for patterns with exactly `size` vertices.
    #[must_use]
    pub fn matrix(&self, size: MotifSize) -> &ConversionMatrix {
        match size {
            MotifSize::Three => &self.matrices[0],
            MotifSize::Four => &self.matrices[1],
            MotifSize::Five => &self.matrices[2],
        }
    }

    /// Converts a concatenated non-induced vector to induced counts.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] when `counts` does not have the
    /// length of a `size` vector.
    pub fn to_induced(&self, counts: &MotifCounts, size: MotifSize) -> Result<MotifCounts> {
        self.convert(counts, size, ConversionMatrix::solve)
    }

    /// Converts a concatenated induced vector to non-induced counts.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] when `counts` does not have the
    /// length of a `size` vector.
    pub fn to_non_induced(&self, counts: &MotifCounts, size: MotifSize) -> Result<MotifCounts> {
        self.convert(counts, size, ConversionMatrix::apply)
    }

    fn convert(
        &self,
        counts: &MotifCounts,
        size: MotifSize,
        op: impl Fn(&ConversionMatrix, &[f64]) -> Result<Vec<f64>>,
    ) -> Result<MotifCounts> {
        if counts.len() != size.vector_len() {
            return Err(RewireError::CountLength {
                expected: size.vector_len(),
                found: counts.len(),
            });
        }
        let mut converted = Vec::with_capacity(counts.len());
        for block in size.blocks() {
            let values = &counts.as_slice()[block.block_range()];
            converted.extend(op(self.matrix(block), values)?);
        }
        Ok(MotifCounts::new(converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    #[fixture]
    fn converter() -> InducedCountConverter {
        InducedCountConverter::new().expect("matrices are invertible")
    }

    #[rstest]
    fn inverse_of_three_vertex_matrix_matches_known_constants(converter: InducedCountConverter) {
        // Columns of the inverse, one per unit vector.
        let expected = [
            [1.0, 0.0, 0.0, 0.0],
            [-1.0, 1.0, 0.0, 0.0],
            [1.0, -2.0, 1.0, 0.0],
            [-1.0, 3.0, -3.0, 1.0],
        ];
        let matrix = converter.matrix(MotifSize::Three);
        for (column, values) in expected.iter().enumerate() {
            let mut unit = [0.0; 4];
            unit[column] = 1.0;
            assert_eq!(matrix.solve(&unit).expect("solvable"), values.to_vec());
        }
    }

    #[rstest]
    fn four_clique_decomposes_into_one_induced_copy(converter: InducedCountConverter) {
        let mut induced = vec![0.0; 15];
        induced[3] = 4.0; // four triangles among the 3-subsets
        induced[14] = 1.0;
        let counts = MotifCounts::new(induced.clone());
        let non_induced = converter
            .to_non_induced(&counts, MotifSize::Four)
            .expect("valid length");
        assert_eq!(non_induced[4 + 1], 6.0, "six edges");
        assert_eq!(non_induced[4 + 8], 3.0, "three four-cycles");
        let back = converter
            .to_induced(&non_induced, MotifSize::Four)
            .expect("valid length");
        assert_eq!(back.as_slice(), induced.as_slice());
    }

    #[rstest]
    #[case(MotifSize::Three, 15)]
    #[case(MotifSize::Four, 4)]
    #[case(MotifSize::Five, 48)]
    fn wrong_lengths_are_rejected(
        converter: InducedCountConverter,
        #[case] size: MotifSize,
        #[case] len: usize,
    ) {
        let error = converter
            .to_induced(&MotifCounts::zeros(len), size)
            .expect_err("length must match");
        assert!(matches!(error, RewireError::CountLength { found, .. } if found == len));
    }

    #[rstest]
    fn rounding_clears_negative_zero(converter: InducedCountConverter) {
        let induced = converter
            .to_induced(&MotifCounts::zeros(49), MotifSize::Five)
            .expect("valid length");
        assert!(induced.iter().all(|value| value == 0.0 && value.is_sign_positive()));
    }
}
