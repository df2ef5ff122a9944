use super::RetrievalError;

/// Index returned for result slots that have no stored vector.
pub const NO_MATCH: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: i64,
    pub score: f32,
}

/// Nearest-neighbor search by inner product over unit vectors.
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;

    /// Up to `k` neighbors by descending score. Implementations may pad the
    /// result with [`NO_MATCH`] entries.
    fn nearest(&self, query: &[f32], k: usize) -> Vec<Neighbor>;
}

/// Exact inner-product index. Vector `i` is the `i`-th vector added.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn add(&mut self, vector: Vec<f32>) -> Result<(), RetrievalError> {
        if vector.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.push(vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }
}

impl VectorIndex for FlatIpIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn nearest(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        let mut scored: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| Neighbor {
                index: i as i64,
                score: dot(query, v),
            })
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored.resize(
            k,
            Neighbor {
                index: NO_MATCH,
                score: f32::MIN,
            },
        );
        scored
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scales `v` to unit length so inner product equals cosine similarity.
/// The zero vector is returned unchanged.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
