//! Random `f64` multivectors and linear maps for tests and benchmarks.
//!
//! Coefficients are uniform in `[-1, 1)`.

use rand::Rng;

use crate::basis::{binomial, low_mask, validate_dimension};
use crate::composer::Composer;
use crate::constants::MAX_DENSE_TERMS;
use crate::error::{GaError, Result};
use crate::outermorphism::Outermorphism;
use crate::scalar::FloatProcessor;
use crate::storage::Storage;

pub fn random_scalar(rng: &mut impl Rng) -> f64 {
    rng.random_range(-1.0..1.0)
}

pub fn random_vector(rng: &mut impl Rng, dimension: u32) -> Storage<f64> {
    Storage::vector((0..dimension).map(|_| random_scalar(rng)).collect())
}

/// Dense random k-vector. Fails when the grade has more than
/// [`MAX_DENSE_TERMS`] blades.
pub fn random_kvector(rng: &mut impl Rng, dimension: u32, grade: u32) -> Result<Storage<f64>> {
    validate_dimension(dimension)?;
    if grade > dimension {
        return Err(GaError::invalid(format!(
            "grade {grade} exceeds dimension {dimension}"
        )));
    }
    let count = binomial(dimension, grade);
    if count > MAX_DENSE_TERMS {
        return Err(GaError::invalid(format!(
            "grade-{grade} space of dimension {dimension} has {count} blades, too many to fill"
        )));
    }
    let coefficients = (0..count).map(|_| random_scalar(rng)).collect();
    Ok(Storage::dense_kvector(grade, coefficients))
}

/// Each of the `2^n` blades is present with probability `density`.
pub fn random_multivector(
    rng: &mut impl Rng,
    dimension: u32,
    density: f64,
) -> Result<Storage<f64>> {
    validate_dimension(dimension)?;
    if !(0.0..=1.0).contains(&density) {
        return Err(GaError::invalid(format!("density {density} outside [0, 1]")));
    }
    let blades = 1u128 << dimension;
    if blades > MAX_DENSE_TERMS as u128 {
        return Err(GaError::invalid(format!(
            "{blades} blades in dimension {dimension}, too many to sample densely"
        )));
    }
    let mut terms = Vec::new();
    for id in 0..=low_mask(dimension) {
        if rng.random_bool(density) {
            terms.push((id, random_scalar(rng)));
        }
    }
    Ok(into_compact(terms))
}

/// `terms` blades drawn uniformly from the whole algebra. Duplicate draws
/// merge, so the result may hold fewer terms.
pub fn random_sparse_multivector(
    rng: &mut impl Rng,
    dimension: u32,
    terms: usize,
) -> Result<Storage<f64>> {
    validate_dimension(dimension)?;
    let max_id = low_mask(dimension);
    let terms: Vec<(u64, f64)> = (0..terms)
        .map(|_| (rng.random_range(0..=max_id), random_scalar(rng)))
        .collect();
    Ok(into_compact(terms))
}

pub fn random_outermorphism(
    rng: &mut impl Rng,
    domain_dimension: u32,
    target_dimension: u32,
) -> Result<Outermorphism<f64>> {
    validate_dimension(domain_dimension)?;
    validate_dimension(target_dimension)?;
    let columns = (0..domain_dimension)
        .map(|_| (0..target_dimension).map(|_| random_scalar(rng)).collect())
        .collect();
    Outermorphism::from_columns(&FloatProcessor::default(), target_dimension, columns)
}

fn into_compact(terms: Vec<(u64, f64)>) -> Storage<f64> {
    let processor = FloatProcessor::default();
    Composer::from_terms(&processor, terms.into_iter().collect()).into_storage()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_random_kvector_is_homogeneous() {
        let mut rng = rng();
        let k = random_kvector(&mut rng, 5, 2).unwrap();
        assert_eq!(k.single_grade(), Some(2));
        assert_eq!(k.term_count(), 10);
        assert!(random_kvector(&mut rng, 3, 4).is_err());
        assert!(random_kvector(&mut rng, 64, 32).is_err());
    }

    #[test]
    fn test_random_multivector_density() {
        let mut rng = rng();
        let full = random_multivector(&mut rng, 4, 1.0).unwrap();
        assert_eq!(full.term_count(), 16);
        let empty = random_multivector(&mut rng, 4, 0.0).unwrap();
        assert!(empty.is_empty());
        assert!(random_multivector(&mut rng, 4, 1.5).is_err());
        assert!(random_multivector(&mut rng, 40, 0.1).is_err());
    }

    #[test]
    fn test_random_sparse_stays_in_range() {
        let mut rng = rng();
        let mv = random_sparse_multivector(&mut rng, 40, 50).unwrap();
        assert!(mv.term_count() <= 50);
        assert!(mv.validate(40).is_ok());
        let wide = random_sparse_multivector(&mut rng, 64, 10).unwrap();
        assert!(wide.validate(64).is_ok());
    }

    #[test]
    fn test_random_outermorphism_shape() {
        let mut rng = rng();
        let f = random_outermorphism(&mut rng, 3, 4).unwrap();
        assert_eq!(f.domain_dimension(), 3);
        assert_eq!(f.target_dimension(), 4);
        assert_eq!(f.image(0).unwrap().single_grade(), Some(1));
    }
}
