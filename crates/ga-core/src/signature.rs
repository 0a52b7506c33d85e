use std::fmt;

use serde::{Deserialize, Serialize};

use crate::basis::{self, low_mask};
use crate::constants::MAX_DIMENSION;
use crate::error::{GaError, Result};

/// Square of a basis vector under the algebra's metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasisSquare {
    Positive,
    Negative,
    Zero,
}

impl BasisSquare {
    /// +1, -1 or 0.
    pub fn sign(self) -> i32 {
        match self {
            BasisSquare::Positive => 1,
            BasisSquare::Negative => -1,
            BasisSquare::Zero => 0,
        }
    }

    pub fn from_sign(sign: i32) -> Result<Self> {
        match sign {
            1 => Ok(BasisSquare::Positive),
            -1 => Ok(BasisSquare::Negative),
            0 => Ok(BasisSquare::Zero),
            other => Err(GaError::invalid(format!(
                "basis vector square must be 1, -1 or 0, got {other}"
            ))),
        }
    }
}

/// Metric signature of a geometric algebra.
///
/// Stores the vector-space dimension and two bitmasks marking the basis
/// vectors that square to -1 and to 0; every other basis vector squares
/// to +1. Serializes as the list of squares, e.g. `[1, 1, -1, 0]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct Signature {
    dimension: u32,
    negative_mask: u64,
    zero_mask: u64,
}

impl Signature {
    /// `p` positive, then `q` negative, then `r` zero-square basis vectors.
    pub fn new(p: u32, q: u32, r: u32) -> Result<Self> {
        let dimension = p
            .checked_add(q)
            .and_then(|d| d.checked_add(r))
            .ok_or_else(|| GaError::invalid("signature dimension overflows"))?;
        basis::validate_dimension(dimension)?;
        let negative_mask = low_mask(q) << p.min(63);
        let zero_mask = low_mask(r) << (p + q).min(63);
        Ok(Self {
            dimension,
            negative_mask: if q == 0 { 0 } else { negative_mask },
            zero_mask: if r == 0 { 0 } else { zero_mask },
        })
    }

    /// All `n` basis vectors square to +1.
    pub fn euclidean(n: u32) -> Result<Self> {
        Self::new(n, 0, 0)
    }

    /// One square per basis vector, in basis order.
    pub fn from_squares(squares: &[BasisSquare]) -> Result<Self> {
        if squares.len() > MAX_DIMENSION as usize {
            return Err(GaError::invalid(format!(
                "dimension {} exceeds the maximum of {MAX_DIMENSION}",
                squares.len()
            )));
        }
        let mut negative_mask = 0;
        let mut zero_mask = 0;
        for (i, square) in squares.iter().enumerate() {
            match square {
                BasisSquare::Positive => {}
                BasisSquare::Negative => negative_mask |= 1u64 << i,
                BasisSquare::Zero => zero_mask |= 1u64 << i,
            }
        }
        Ok(Self {
            dimension: squares.len() as u32,
            negative_mask,
            zero_mask,
        })
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn negative_mask(&self) -> u64 {
        self.negative_mask
    }

    pub fn zero_mask(&self) -> u64 {
        self.zero_mask
    }

    pub fn positive_count(&self) -> u32 {
        self.dimension - self.negative_count() - self.zero_count()
    }

    pub fn negative_count(&self) -> u32 {
        self.negative_mask.count_ones()
    }

    pub fn zero_count(&self) -> u32 {
        self.zero_mask.count_ones()
    }

    /// Square of basis vector `i` (0-based).
    pub fn square(&self, i: u32) -> BasisSquare {
        debug_assert!(i < self.dimension);
        let bit = 1u64 << i;
        if self.zero_mask & bit != 0 {
            BasisSquare::Zero
        } else if self.negative_mask & bit != 0 {
            BasisSquare::Negative
        } else {
            BasisSquare::Positive
        }
    }

    pub fn squares(&self) -> Vec<BasisSquare> {
        (0..self.dimension).map(|i| self.square(i)).collect()
    }

    /// All basis vectors square to +1.
    pub fn is_euclidean(&self) -> bool {
        self.negative_mask == 0 && self.zero_mask == 0
    }

    /// At least one basis vector squares to 0.
    pub fn is_degenerate(&self) -> bool {
        self.zero_mask != 0
    }

    /// Largest valid basis blade ID; equal to the pseudo-scalar ID.
    pub fn max_id(&self) -> u64 {
        low_mask(self.dimension)
    }

    pub fn pseudo_scalar_id(&self) -> u64 {
        self.max_id()
    }

    /// Total number of basis blades, `2^n`.
    pub fn blade_count(&self) -> u128 {
        1u128 << self.dimension
    }

    pub fn contains_id(&self, id: u64) -> bool {
        id & !self.max_id() == 0
    }

    pub fn validate_id(&self, id: u64) -> Result<()> {
        basis::validate_id(self.dimension, id)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cl({},{},{})",
            self.positive_count(),
            self.negative_count(),
            self.zero_count()
        )
    }
}

impl TryFrom<Vec<i32>> for Signature {
    type Error = GaError;

    fn try_from(squares: Vec<i32>) -> Result<Self> {
        let squares = squares
            .into_iter()
            .map(BasisSquare::from_sign)
            .collect::<Result<Vec<_>>>()?;
        Self::from_squares(&squares)
    }
}

impl From<Signature> for Vec<i32> {
    fn from(signature: Signature) -> Self {
        signature.squares().into_iter().map(BasisSquare::sign).collect()
    }
}
