//! Pluggable scalar arithmetic.
//!
//! Algebra code never inspects coefficients directly; it goes through a
//! [`ScalarProcessor`], so the same product and traversal code serves
//! floating-point and symbolic scalars.

use std::fmt::Debug;

use crate::constants::DEFAULT_EPSILON;
use crate::error::{GaError, Result};

/// Arithmetic capability over a scalar type.
///
/// `is_zero` must be consistent with addition: if `a` and `b` are zero then
/// so is `a + b`. Composers rely on it when pruning cancelled terms.
pub trait ScalarProcessor {
    type Scalar: Clone + Debug;

    fn zero(&self) -> Self::Scalar;

    fn one(&self) -> Self::Scalar;

    fn from_i32(&self, value: i32) -> Self::Scalar;

    fn from_f64(&self, value: f64) -> Self::Scalar;

    fn add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    fn subtract(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    fn negative(&self, a: &Self::Scalar) -> Self::Scalar;

    fn times(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// Fails when `b` is zero or the backend cannot divide by it.
    fn divide(&self, a: &Self::Scalar, b: &Self::Scalar) -> Result<Self::Scalar>;

    fn is_zero(&self, a: &Self::Scalar) -> bool;

    fn to_text(&self, a: &Self::Scalar) -> String;

    /// `a * sign` for a product sign in {-1, 0, 1}.
    fn times_sign(&self, a: &Self::Scalar, sign: i32) -> Self::Scalar {
        match sign {
            0 => self.zero(),
            1 => a.clone(),
            -1 => self.negative(a),
            other => self.times(a, &self.from_i32(other)),
        }
    }

    fn is_one(&self, a: &Self::Scalar) -> bool {
        self.is_zero(&self.subtract(a, &self.one()))
    }

    /// Size of `a` for pivot selection, or `None` when scalars are unordered.
    fn magnitude(&self, _a: &Self::Scalar) -> Option<f64> {
        None
    }
}

/// `f64` arithmetic with an epsilon-approximate zero test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatProcessor {
    epsilon: f64,
}

impl FloatProcessor {
    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(GaError::invalid(format!(
                "epsilon must be finite and non-negative, got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for FloatProcessor {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ScalarProcessor for FloatProcessor {
    type Scalar = f64;

    fn zero(&self) -> f64 {
        0.0
    }

    fn one(&self) -> f64 {
        1.0
    }

    fn from_i32(&self, value: i32) -> f64 {
        value as f64
    }

    fn from_f64(&self, value: f64) -> f64 {
        value
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn subtract(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn negative(&self, a: &f64) -> f64 {
        -a
    }

    fn times(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn divide(&self, a: &f64, b: &f64) -> Result<f64> {
        if self.is_zero(b) {
            return Err(GaError::invalid("division by a zero scalar"));
        }
        Ok(a / b)
    }

    fn is_zero(&self, a: &f64) -> bool {
        a.abs() <= self.epsilon
    }

    fn to_text(&self, a: &f64) -> String {
        format_number(*a)
    }

    fn times_sign(&self, a: &f64, sign: i32) -> f64 {
        a * sign as f64
    }

    fn magnitude(&self, a: &f64) -> Option<f64> {
        Some(a.abs())
    }
}

/// Shortest readable rendering: integral values print without a fraction.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // folds -0.0 too
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
