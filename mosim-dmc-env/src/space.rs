use serde::{Deserialize, Serialize};

/// A box in `R^n` with elementwise bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    /// Lower bounds, flattened.
    pub low: Vec<f32>,

    /// Upper bounds, flattened.
    pub high: Vec<f32>,

    /// Shape of elements of the space.
    pub shape: Vec<usize>,
}

impl BoxSpace {
    /// An unbounded box of the given shape.
    pub fn unbounded(shape: Vec<usize>) -> Self {
        let n = shape.iter().product();
        Self {
            low: vec![f32::NEG_INFINITY; n],
            high: vec![f32::INFINITY; n],
            shape,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.low.len()
    }

    /// `true` for a zero-sized space.
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// `true` if `x` lies in the box.
    pub fn contains(&self, x: &[f32]) -> bool {
        x.len() == self.len()
            && x
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }
}
