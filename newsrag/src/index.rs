//! Exact nearest-neighbour index over corpus embeddings.
//!
//! This module provides the [`VectorIndex`] trait and [`FlatIndex`], a
//! brute-force index that scores every stored vector against the query. It
//! is built once from the full corpus and never mutated afterwards, so a
//! shared reference can serve concurrent searches without locking.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Neighbor;
use crate::error::{RagError, Result};

/// Distance function used to rank neighbours. Lower is always nearer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Sum of squared coordinate differences.
    #[default]
    SquaredEuclidean,
    /// Straight-line (L2) distance.
    Euclidean,
    /// Negated dot product, for vectors trained for inner-product search.
    InnerProduct,
    /// `1 - cosine similarity`; zero vectors have similarity 0.
    Cosine,
}

impl DistanceMetric {
    /// Compute the distance between two vectors of equal length.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredEuclidean => squared_euclidean(a, b),
            Self::Euclidean => squared_euclidean(a, b).sqrt(),
            Self::InnerProduct => -dot(a, b),
            Self::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

/// A read-only similarity index over a fixed, ordered set of vectors.
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` nearest entries, ascending by distance.
    ///
    /// Ties are broken by lower position. `k` larger than [`len`](VectorIndex::len)
    /// returns every entry; an empty index returns an empty result.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the indexed vectors, or `None` for an empty index.
    fn dimensions(&self) -> Option<usize>;
}

/// Brute-force exact index. Position `i` corresponds to the `i`-th input vector.
///
/// # Example
///
/// ```rust,ignore
/// use newsrag::{DistanceMetric, FlatIndex, VectorIndex};
///
/// let index = FlatIndex::build(vec![vec![0.0, 1.0], vec![1.0, 0.0]], DistanceMetric::default())?;
/// let hits = index.search(&[0.9, 0.1], 1)?;
/// assert_eq!(hits[0].position, 1);
/// ```
#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Vec<Vec<f32>>,
    dimensions: Option<usize>,
    metric: DistanceMetric,
}

impl FlatIndex {
    /// Build an index over exactly the given vectors, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Search`] if the vectors do not all share one
    /// dimensionality.
    pub fn build(vectors: Vec<Vec<f32>>, metric: DistanceMetric) -> Result<Self> {
        let dimensions = vectors.first().map(Vec::len);
        if let Some(expected) = dimensions {
            if let Some((position, bad)) =
                vectors.iter().enumerate().find(|(_, v)| v.len() != expected)
            {
                return Err(RagError::Search(format!(
                    "vector {position} has {} dimensions, expected {expected}",
                    bad.len()
                )));
            }
        }

        debug!(vector_count = vectors.len(), ?dimensions, ?metric, "built flat index");
        Ok(Self { vectors, dimensions, metric })
    }

    /// The metric this index ranks by.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let Some(expected) = self.dimensions else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != expected {
            return Err(RagError::Search(format!(
                "query has {} dimensions, index expects {expected}",
                query.len()
            )));
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: self.metric.distance(vector, query),
            })
            .collect();

        scored.sort_by(compare_neighbors);
        scored.truncate(k);
        Ok(scored)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

/// Ascending distance, NaN last, ties by position.
fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    match (a.distance.is_nan(), b.distance.is_nan()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => a.position.cmp(&b.position),
        (false, false) => a
            .distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.position.cmp(&b.position)),
    }
}
