//! Fixed catalogue of 3-, 4- and 5-vertex patterns.
//!
//! Patterns are listed in the order the counting programs report them: the
//! disconnected patterns first, the connected ones last. Each catalogue owns
//! a lookup table from edge mask to pattern index, built once by enumerating
//! every vertex permutation of every pattern, plus the containment matrix
//! used to move between induced and non-induced counts.
//!
//! Edge masks set bit `pair_index(i, j)` for each edge `{i, j}`, where pairs
//! are numbered lexicographically: `(0, 1), (0, 2), ..., (k - 2, k - 1)`.

use std::sync::OnceLock;

use super::MotifSize;

/// Version of the pattern ordering below. Bump it whenever the order or
/// content of any pattern list changes.
pub const CATALOGUE_VERSION: u32 = 1;

/// A named pattern on a fixed number of vertices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pattern {
    name: &'static str,
    vertices: usize,
    edges: &'static [(usize, usize)],
}

impl Pattern {
    const fn new(name: &'static str, vertices: usize, edges: &'static [(usize, usize)]) -> Self {
        Self {
            name,
            vertices,
            edges,
        }
    }

    /// Human-readable pattern name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Number of vertices, isolated ones included.
    #[must_use]
    pub const fn vertices(&self) -> usize {
        self.vertices
    }

    /// One representative edge list.
    #[must_use]
    pub const fn edges(&self) -> &'static [(usize, usize)] {
        self.edges
    }

    /// Returns `true` when every vertex is reachable from vertex zero.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let mut reached = vec![false; self.vertices];
        let mut stack = vec![0_usize];
        while let Some(vertex) = stack.pop() {
            if std::mem::replace(&mut reached[vertex], true) {
                continue;
            }
            for &(a, b) in self.edges {
                if a == vertex && !reached[b] {
                    stack.push(b);
                } else if b == vertex && !reached[a] {
                    stack.push(a);
                }
            }
        }
        reached.into_iter().all(|seen| seen)
    }

    fn mask(&self, permutation: &[usize]) -> usize {
        self.edges.iter().fold(0, |mask, &(a, b)| {
            mask | 1 << pair_index(self.vertices, permutation[a], permutation[b])
        })
    }
}

const THREE: [Pattern; 4] = [
    Pattern::new("empty", 3, &[]),
    Pattern::new("edge", 3, &[(0, 1)]),
    Pattern::new("wedge", 3, &[(0, 1), (0, 2)]),
    Pattern::new("triangle", 3, &[(0, 1), (0, 2), (1, 2)]),
];

const FOUR: [Pattern; 11] = [
    Pattern::new("empty", 4, &[]),
    Pattern::new("edge", 4, &[(0, 1)]),
    Pattern::new("matching", 4, &[(0, 1), (2, 3)]),
    Pattern::new("wedge", 4, &[(0, 1), (0, 2)]),
    Pattern::new("triangle", 4, &[(0, 1), (0, 2), (1, 2)]),
    Pattern::new("three-star", 4, &[(0, 1), (0, 2), (0, 3)]),
    Pattern::new("three-path", 4, &[(0, 1), (1, 2), (2, 3)]),
    Pattern::new("tailed-triangle", 4, &[(0, 1), (0, 2), (1, 2), (0, 3)]),
    Pattern::new("four-cycle", 4, &[(0, 1), (1, 2), (2, 3), (3, 0)]),
    Pattern::new(
        "chordal-four-cycle",
        4,
        &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)],
    ),
    Pattern::new(
        "four-clique",
        4,
        &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
    ),
];

const FIVE: [Pattern; 34] = [
    Pattern::new("empty", 5, &[]),
    Pattern::new("edge", 5, &[(0, 1)]),
    Pattern::new("matching", 5, &[(0, 1), (2, 3)]),
    Pattern::new("wedge", 5, &[(0, 1), (0, 2)]),
    Pattern::new("triangle", 5, &[(0, 1), (0, 2), (1, 2)]),
    Pattern::new("three-star", 5, &[(0, 1), (0, 2), (0, 3)]),
    Pattern::new("three-path", 5, &[(0, 1), (1, 2), (2, 3)]),
    Pattern::new("tailed-triangle", 5, &[(0, 1), (0, 2), (1, 2), (0, 3)]),
    Pattern::new("four-cycle", 5, &[(0, 1), (1, 2), (2, 3), (3, 0)]),
    Pattern::new(
        "chordal-four-cycle",
        5,
        &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)],
    ),
    Pattern::new(
        "four-clique",
        5,
        &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
    ),
    Pattern::new("wedge-edge", 5, &[(0, 1), (0, 2), (3, 4)]),
    Pattern::new("triangle-edge", 5, &[(0, 1), (0, 2), (1, 2), (3, 4)]),
    Pattern::new("four-star", 5, &[(0, 1), (0, 2), (0, 3), (0, 4)]),
    Pattern::new("prong", 5, &[(0, 1), (0, 2), (0, 3), (3, 4)]),
    Pattern::new("four-path", 5, &[(0, 1), (1, 2), (2, 3), (3, 4)]),
    Pattern::new(
        "fork-tailed-triangle",
        5,
        &[(0, 1), (1, 2), (0, 2), (0, 3), (0, 4)],
    ),
    Pattern::new(
        "long-tailed-triangle",
        5,
        &[(0, 1), (1, 2), (0, 2), (0, 3), (3, 4)],
    ),
    Pattern::new(
        "double-tailed-triangle",
        5,
        &[(0, 1), (1, 2), (0, 2), (0, 3), (1, 4)],
    ),
    Pattern::new(
        "tailed-four-cycle",
        5,
        &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)],
    ),
    Pattern::new("five-cycle", 5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]),
    Pattern::new(
        "hourglass",
        5,
        &[(0, 1), (1, 2), (0, 2), (0, 3), (0, 4), (3, 4)],
    ),
    Pattern::new(
        "cobra",
        5,
        &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 4)],
    ),
    Pattern::new(
        "stingray",
        5,
        &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (0, 4)],
    ),
    Pattern::new(
        "hatted-four-cycle",
        5,
        &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4), (1, 4)],
    ),
    Pattern::new(
        "three-wedge-collision",
        5,
        &[(0, 2), (0, 3), (0, 4), (1, 2), (1, 3), (1, 4)],
    ),
    Pattern::new(
        "three-triangle-collision",
        5,
        &[(0, 1), (0, 2), (0, 3), (0, 4), (1, 2), (1, 3), (1, 4)],
    ),
    Pattern::new(
        "tailed-four-clique",
        5,
        &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), (0, 4)],
    ),
    Pattern::new(
        "triangle-strip",
        5,
        &[(0, 1), (0, 2), (1, 2), (1, 3), (2, 3), (2, 4), (3, 4)],
    ),
    Pattern::new(
        "chordal-wedge-collision",
        5,
        &[(0, 2), (0, 3), (0, 4), (1, 2), (1, 3), (1, 4), (2, 3)],
    ),
    Pattern::new(
        "wheel",
        5,
        &[(4, 0), (4, 1), (4, 2), (4, 3), (0, 1), (1, 2), (2, 3), (3, 0)],
    ),
    Pattern::new(
        "hatted-four-clique",
        5,
        &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), (0, 4), (1, 4)],
    ),
    Pattern::new(
        "almost-five-clique",
        5,
        &[
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (1, 2),
            (1, 3),
            (1, 4),
            (2, 3),
            (2, 4),
        ],
    ),
    Pattern::new(
        "five-clique",
        5,
        &[
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (1, 2),
            (1, 3),
            (1, 4),
            (2, 3),
            (2, 4),
            (3, 4),
        ],
    ),
];

/// Index of the unordered pair `{a, b}` among the pairs of `vertices` nodes.
pub(crate) const fn pair_index(vertices: usize, a: usize, b: usize) -> usize {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    low * (2 * vertices - low - 1) / 2 + (high - low - 1)
}

/// Every permutation of `0..count` (Heap's algorithm).
fn permutations(count: usize) -> Vec<Vec<usize>> {
    let mut current: Vec<usize> = (0..count).collect();
    let mut counters = vec![0_usize; count];
    let mut all = vec![current.clone()];
    let mut index = 1;
    while index < count {
        if counters[index] < index {
            let other = if index % 2 == 0 { 0 } else { counters[index] };
            current.swap(other, index);
            all.push(current.clone());
            counters[index] += 1;
            index = 1;
        } else {
            counters[index] = 0;
            index += 1;
        }
    }
    all
}

/// Pattern list, mask classifier and containment matrix for one motif size.
#[derive(Debug)]
pub struct PatternCatalogue {
    size: MotifSize,
    patterns: &'static [Pattern],
    classes: Vec<Option<usize>>,
    containment: Vec<Vec<u64>>,
}

impl PatternCatalogue {
    /// Returns the shared catalogue for `size`, building it on first use.
    #[must_use]
    pub fn get(size: MotifSize) -> &'static Self {
        static THREE_VERTICES: OnceLock<PatternCatalogue> = OnceLock::new();
        static FOUR_VERTICES: OnceLock<PatternCatalogue> = OnceLock::new();
        static FIVE_VERTICES: OnceLock<PatternCatalogue> = OnceLock::new();

        let cell = match size {
            MotifSize::Three => &THREE_VERTICES,
            MotifSize::Four => &FOUR_VERTICES,
            MotifSize::Five => &FIVE_VERTICES,
        };
        cell.get_or_init(|| Self::build(size))
    }

    fn build(size: MotifSize) -> Self {
        let patterns: &'static [Pattern] = match size {
            MotifSize::Three => &THREE,
            MotifSize::Four => &FOUR,
            MotifSize::Five => &FIVE,
        };
        let vertices = size.vertices();
        let pairs = vertices * (vertices - 1) / 2;

        let mut classes = vec![None; 1 << pairs];
        for permutation in permutations(vertices) {
            for (index, pattern) in patterns.iter().enumerate() {
                classes[pattern.mask(&permutation)] = Some(index);
            }
        }

        let identity: Vec<usize> = (0..vertices).collect();
        let mut containment = vec![vec![0_u64; patterns.len()]; patterns.len()];
        for (column, pattern) in patterns.iter().enumerate() {
            let mask = pattern.mask(&identity);
            let mut subset = mask;
            loop {
                if let Some(row) = classes[subset] {
                    containment[row][column] += 1;
                }
                if subset == 0 {
                    break;
                }
                subset = (subset - 1) & mask;
            }
        }

        Self {
            size,
            patterns,
            classes,
            containment,
        }
    }

    /// The motif size this catalogue describes.
    #[must_use]
    pub fn size(&self) -> MotifSize {
        self.size
    }

    /// Patterns in counting order.
    #[must_use]
    pub fn patterns(&self) -> &'static [Pattern] {
        self.patterns
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always `false`; every catalogue holds at least the empty pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Trailing slice of connected patterns.
    #[must_use]
    pub fn connected(&self) -> &'static [Pattern] {
        let patterns = self.patterns;
        &patterns[patterns.len() - self.size.connected_len()..]
    }

    /// Pattern index for an edge mask, or `None` if the mask is out of range.
    #[must_use]
    pub fn classify(&self, mask: usize) -> Option<usize> {
        self.classes.get(mask).copied().flatten()
    }

    /// Returns `true` when every edge mask maps to a pattern.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.classes.iter().all(Option::is_some)
    }

    /// `containment()[i][j]` counts the edge subsets of pattern `j` that are
    /// isomorphic to pattern `i`.
    #[must_use]
    pub fn containment(&self) -> &[Vec<u64>] {
        &self.containment
    }

    /// Names of every entry of a count vector for `size`, in order.
    #[must_use]
    pub fn vector_names(size: MotifSize) -> Vec<&'static str> {
        size.blocks()
            .flat_map(|block| Self::get(block).patterns().iter().map(Pattern::name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(MotifSize::Three)]
    #[case(MotifSize::Four)]
    #[case(MotifSize::Five)]
    fn catalogues_classify_every_mask(#[case] size: MotifSize) {
        let catalogue = PatternCatalogue::get(size);
        assert_eq!(catalogue.len(), size.block_len());
        assert!(catalogue.is_complete());
    }

    #[rstest]
    #[case(MotifSize::Three)]
    #[case(MotifSize::Four)]
    #[case(MotifSize::Five)]
    fn connected_patterns_come_last(#[case] size: MotifSize) {
        let catalogue = PatternCatalogue::get(size);
        let split = catalogue.len() - size.connected_len();
        for (index, pattern) in catalogue.patterns().iter().enumerate() {
            assert_eq!(pattern.is_connected(), index >= split, "{}", pattern.name());
        }
    }

    #[rstest]
    #[case(MotifSize::Three)]
    #[case(MotifSize::Four)]
    #[case(MotifSize::Five)]
    fn patterns_are_pairwise_non_isomorphic(#[case] size: MotifSize) {
        let catalogue = PatternCatalogue::get(size);
        let identity: Vec<usize> = (0..size.vertices()).collect();
        for (index, pattern) in catalogue.patterns().iter().enumerate() {
            assert_eq!(catalogue.classify(pattern.mask(&identity)), Some(index));
        }
    }

    #[test]
    fn containment_is_unitriangular() {
        for size in MotifSize::ALL {
            let matrix = PatternCatalogue::get(size).containment();
            for (row, entries) in matrix.iter().enumerate() {
                assert_eq!(entries[row], 1);
                assert!(entries[..row].iter().all(|&entry| entry == 0));
            }
        }
    }

    #[test]
    fn three_vertex_containment_matches_known_constants() {
        let expected: [[u64; 4]; 4] = [[1, 1, 1, 1], [0, 1, 2, 3], [0, 0, 1, 3], [0, 0, 0, 1]];
        let matrix = PatternCatalogue::get(MotifSize::Three).containment();
        for (row, values) in expected.iter().enumerate() {
            assert_eq!(matrix[row].as_slice(), values.as_slice());
        }
    }

    #[test]
    fn four_clique_column_counts_every_sub_pattern() {
        let matrix = PatternCatalogue::get(MotifSize::Four).containment();
        let column: Vec<u64> = matrix.iter().map(|row| row[10]).collect();
        assert_eq!(column, vec![1, 6, 3, 12, 4, 4, 12, 12, 3, 6, 1]);
    }

    #[rstest]
    #[case("empty", 1)]
    #[case("edge", 10)]
    #[case("triangle", 10)]
    #[case("four-cycle", 15)]
    #[case("four-star", 5)]
    #[case("four-path", 60)]
    #[case("five-cycle", 12)]
    #[case("five-clique", 1)]
    fn five_clique_contains_known_copies(#[case] name: &str, #[case] copies: u64) {
        let catalogue = PatternCatalogue::get(MotifSize::Five);
        let row = catalogue
            .patterns()
            .iter()
            .position(|pattern| pattern.name() == name)
            .expect("pattern is catalogued");
        let clique = catalogue.len() - 1;
        assert_eq!(catalogue.containment()[row][clique], copies);
    }

    #[test]
    fn pair_indices_are_lexicographic() {
        assert_eq!(pair_index(5, 0, 1), 0);
        assert_eq!(pair_index(5, 4, 0), 3);
        assert_eq!(pair_index(5, 1, 2), 4);
        assert_eq!(pair_index(5, 3, 4), 9);
        assert_eq!(pair_index(3, 1, 2), 2);
    }

    #[test]
    fn permutations_cover_the_symmetric_group() {
        let mut all = permutations(4);
        assert_eq!(all.len(), 24);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 24);
    }

    #[test]
    fn vector_names_concatenate_blocks() {
        let names = PatternCatalogue::vector_names(MotifSize::Four);
        assert_eq!(names.len(), 15);
        assert_eq!(names[3], "triangle");
        assert_eq!(names[14], "four-clique");
    }
}
