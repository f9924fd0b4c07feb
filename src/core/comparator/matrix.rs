//! Precomputed pairwise distances.
//!
//! Every pairwise comparison is independent, so rows are computed in
//! parallel. Grouping decisions are then made serially over the finished
//! matrix, which keeps the result dependent only on input order.

use crate::core::record::HashedRecord;
use crate::error::CompareError;
use rayon::prelude::*;

/// Distances between one pair of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairDistance {
    /// Hamming distance of the primary hashes
    pub primary: u32,
    /// Hamming distance of the secondary hashes, when both records have one
    pub secondary: Option<u32>,
}

impl PairDistance {
    /// The larger of the two distances
    pub fn worst(&self) -> u32 {
        self.secondary.map_or(self.primary, |s| s.max(self.primary))
    }

    fn between(a: &HashedRecord<'_>, b: &HashedRecord<'_>) -> Result<Self, CompareError> {
        let primary = a.primary.distance(&b.primary)?;
        let secondary = match (&a.secondary, &b.secondary) {
            (Some(x), Some(y)) => Some(x.distance(y)?),
            _ => None,
        };
        Ok(Self { primary, secondary })
    }
}

/// Upper-triangular matrix of pairwise distances
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    /// `rows[i][k]` holds the distance between `i` and `i + 1 + k`
    rows: Vec<Vec<PairDistance>>,
}

impl DistanceMatrix {
    /// Compute all pairwise distances for a set of records
    pub fn compute(records: &[HashedRecord<'_>]) -> Result<Self, CompareError> {
        let n = records.len();

        let rows = (0..n)
            .into_par_iter()
            .map(|i| {
                records[i + 1..]
                    .iter()
                    .map(|other| PairDistance::between(&records[i], other))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    /// Number of records the matrix covers
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distance between records `i` and `j` (in either order)
    pub fn get(&self, i: usize, j: usize) -> PairDistance {
        if i == j {
            return PairDistance {
                primary: 0,
                secondary: Some(0),
            };
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.rows[lo][hi - lo - 1]
    }

    /// Total number of pairs compared
    pub fn pair_count(&self) -> usize {
        let n = self.len();
        n.saturating_sub(1) * n / 2
    }
}
