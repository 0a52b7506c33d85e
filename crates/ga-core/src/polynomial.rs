//! Symbolic scalars as canonical polynomials over named atoms.
//!
//! A monomial is a sorted list of atom names (repeats encode powers); a
//! polynomial maps monomials to `f64` coefficients. Canonical form makes the
//! zero test exact for integer-coefficient arithmetic, which is what the
//! generic products produce.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{GaError, Result};
use crate::scalar::{ScalarProcessor, format_number};

type Monomial = Vec<String>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        let mut terms = BTreeMap::new();
        if value != 0.0 {
            terms.insert(Vec::new(), value);
        }
        Self { terms }
    }

    pub fn atom(name: &str) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(vec![name.to_string()], 1.0);
        Self { terms }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// `Some(c)` when the polynomial has no atoms.
    pub fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self.terms.get(&Vec::new()).copied(),
            _ => None,
        }
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Highest monomial degree; 0 for constants.
    pub fn degree(&self) -> usize {
        self.terms.keys().map(Vec::len).max().unwrap_or(0)
    }

    /// Substitutes atom values. Missing atoms fail.
    pub fn evaluate(&self, values: &HashMap<String, f64>) -> Result<f64> {
        let mut total = 0.0;
        for (monomial, coefficient) in &self.terms {
            let mut product = *coefficient;
            for atom in monomial {
                let value = values
                    .get(atom)
                    .ok_or_else(|| GaError::invalid(format!("no value for atom '{atom}'")))?;
                product *= value;
            }
            total += product;
        }
        Ok(total)
    }

    fn accumulate(&mut self, monomial: Monomial, coefficient: f64, epsilon: f64) {
        match self.terms.entry(monomial) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().abs() <= epsilon {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                if coefficient.abs() > epsilon {
                    entry.insert(coefficient);
                }
            }
        }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, (monomial, coefficient)) in self.terms.iter().enumerate() {
            let magnitude = coefficient.abs();
            if i == 0 {
                if *coefficient < 0.0 {
                    f.write_str("-")?;
                }
            } else if *coefficient < 0.0 {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            if monomial.is_empty() {
                f.write_str(&format_number(magnitude))?;
            } else {
                if magnitude != 1.0 {
                    write!(f, "{}*", format_number(magnitude))?;
                }
                f.write_str(&monomial.join("*"))?;
            }
        }
        Ok(())
    }
}

/// Symbolic backend for code-generation style consumers.
#[derive(Clone, Copy, Debug)]
pub struct PolynomialProcessor {
    epsilon: f64,
}

impl PolynomialProcessor {
    pub fn new() -> Self {
        Self { epsilon: 1e-12 }
    }

    pub fn atom(&self, name: &str) -> Polynomial {
        Polynomial::atom(name)
    }
}

impl Default for PolynomialProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarProcessor for PolynomialProcessor {
    type Scalar = Polynomial;

    fn zero(&self) -> Polynomial {
        Polynomial::zero()
    }

    fn one(&self) -> Polynomial {
        Polynomial::constant(1.0)
    }

    fn from_i32(&self, value: i32) -> Polynomial {
        Polynomial::constant(value as f64)
    }

    fn from_f64(&self, value: f64) -> Polynomial {
        Polynomial::constant(value)
    }

    fn add(&self, a: &Polynomial, b: &Polynomial) -> Polynomial {
        let mut result = a.clone();
        for (monomial, coefficient) in &b.terms {
            result.accumulate(monomial.clone(), *coefficient, self.epsilon);
        }
        result
    }

    fn subtract(&self, a: &Polynomial, b: &Polynomial) -> Polynomial {
        let mut result = a.clone();
        for (monomial, coefficient) in &b.terms {
            result.accumulate(monomial.clone(), -coefficient, self.epsilon);
        }
        result
    }

    fn negative(&self, a: &Polynomial) -> Polynomial {
        Polynomial {
            terms: a.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }

    fn times(&self, a: &Polynomial, b: &Polynomial) -> Polynomial {
        let mut result = Polynomial::zero();
        for (m1, c1) in &a.terms {
            for (m2, c2) in &b.terms {
                let mut monomial: Monomial = m1.iter().chain(m2.iter()).cloned().collect();
                monomial.sort();
                result.accumulate(monomial, c1 * c2, self.epsilon);
            }
        }
        result
    }

    fn divide(&self, a: &Polynomial, b: &Polynomial) -> Result<Polynomial> {
        let divisor = b.as_constant().ok_or_else(|| {
            GaError::invalid(format!("cannot divide by non-constant polynomial '{b}'"))
        })?;
        if divisor.abs() <= self.epsilon {
            return Err(GaError::invalid("division by a zero scalar"));
        }
        Ok(Polynomial {
            terms: a.terms.iter().map(|(m, c)| (m.clone(), c / divisor)).collect(),
        })
    }

    fn is_zero(&self, a: &Polynomial) -> bool {
        a.is_zero()
    }

    fn to_text(&self, a: &Polynomial) -> String {
        a.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_exact() {
        let p = PolynomialProcessor::new();
        let ab = p.times(&p.atom("a"), &p.atom("b"));
        let ba = p.times(&p.atom("b"), &p.atom("a"));
        assert!(p.is_zero(&p.subtract(&ab, &ba)));
    }

    #[test]
    fn test_display() {
        let p = PolynomialProcessor::new();
        let a = p.atom("a");
        let b = p.atom("b");
        let expr = p.subtract(&p.times(&p.from_i32(2), &p.times(&a, &b)), &b);
        assert_eq!(expr.to_string(), "2*a*b - b");
        assert_eq!(p.negative(&a).to_string(), "-a");
        assert_eq!(p.add(&p.one(), &a).to_string(), "1 + a");
        assert_eq!(Polynomial::zero().to_string(), "0");
    }

    #[test]
    fn test_powers_and_degree() {
        let p = PolynomialProcessor::new();
        let a = p.atom("a");
        let a2 = p.times(&a, &a);
        assert_eq!(a2.degree(), 2);
        assert_eq!(a2.to_string(), "a*a");
    }

    #[test]
    fn test_divide_only_by_constants() {
        let p = PolynomialProcessor::new();
        let a = p.atom("a");
        let half = p.divide(&a, &p.from_i32(2)).unwrap();
        assert_eq!(half.to_string(), "0.5*a");
        assert!(p.divide(&a, &a).is_err());
        assert!(p.divide(&a, &p.zero()).is_err());
    }

    #[test]
    fn test_evaluate() {
        let p = PolynomialProcessor::new();
        let expr = p.add(&p.times(&p.atom("x"), &p.atom("y")), &p.from_i32(3));
        let values: HashMap<String, f64> =
            [("x".to_string(), 2.0), ("y".to_string(), 5.0)].into_iter().collect();
        assert_eq!(expr.evaluate(&values).unwrap(), 13.0);
        assert!(expr.evaluate(&HashMap::new()).is_err());
    }

    #[test]
    fn test_constant_detection() {
        assert_eq!(Polynomial::constant(4.0).as_constant(), Some(4.0));
        assert_eq!(Polynomial::zero().as_constant(), Some(0.0));
        assert_eq!(Polynomial::atom("a").as_constant(), None);
    }
}
