
use serde::{Deserialize, Serialize};

use crate::{RagError, Result};

/// Exact nearest-neighbor index over densely packed vectors.
///
/// Vector `i` occupies `vectors[i * dimension..(i + 1) * dimension]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

/// A search hit: stored position and squared L2 distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

impl FlatIndex {
    #[inline]
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::Index(
                "Vector dimension must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    /// Build an index from vectors, taking the dimension from the first one
    #[inline]
    pub fn from_vectors<I>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<f32>>,
    {
        let mut vectors = vectors.into_iter().peekable();
        let dimension = vectors
            .peek()
            .map(Vec::len)
            .ok_or_else(|| RagError::Index("Cannot build an index from no vectors".to_string()))?;

        let mut index = Self::new(dimension)?;
        for vector in vectors {
            index.add(&vector)?;
        }
        Ok(index)
    }

    /// Append a vector, returning its position
    #[inline]
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimension(vector)?;
        let position = self.len();
        self.vectors.extend_from_slice(vector);
        Ok(position)
    }

    #[inline]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.vectors.chunks_exact(self.dimension).nth(position)
    }

    /// Return up to `k` stored vectors closest to `query`, nearest first.
    ///
    /// Compares against every stored vector. Equal distances keep insertion
    /// order. Never returns more hits than there are vectors.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query)?;

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, stored)| Neighbor {
                position,
                distance: l2_distance_squared(query, stored),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() == self.dimension {
            Ok(())
        } else {
            Err(RagError::Index(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )))
        }
    }

    /// Check the packed buffer after deserialization
    pub(crate) fn validate(&self) -> Result<()> {
        if self.dimension == 0 || self.vectors.len() % self.dimension != 0 {
            return Err(RagError::Index(format!(
                "Corrupted index: {} values do not divide into vectors of dimension {}",
                self.vectors.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
#[inline]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
