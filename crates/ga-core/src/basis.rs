//! Basis-blade index algebra.
//!
//! A basis blade is identified by a `u64` whose set bits name the basis
//! vectors it is built from (bit `i` ⇔ `e(i+1)`). Within a grade, blades are
//! ranked in ascending numeric order of their IDs; that rank is the blade's
//! index. Ranking uses the combinatorial number system, so every mapping here
//! is closed form and allocation free.

use crate::constants::MAX_DIMENSION;
use crate::error::{GaError, Result};

/// Grade of a basis blade: the number of basis vectors in it.
#[inline]
pub fn grade(id: u64) -> u32 {
    id.count_ones()
}

/// ID of the single basis vector `i` (0-based).
#[inline]
pub fn basis_vector_id(i: u32) -> u64 {
    debug_assert!(i < MAX_DIMENSION);
    1u64 << i
}

/// Mask with the low `bits` bits set. Saturates at 64.
#[inline]
pub fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Number of basis vectors needed to hold `id` (position of its highest bit + 1).
#[inline]
pub fn required_dimension(id: u64) -> u32 {
    64 - id.leading_zeros()
}

/// Exact binomial coefficient C(n, k). Zero when `k > n`.
pub fn binomial(n: u32, k: u32) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u128;
    let n = n as u128;
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: the running value is C(n, i + 1).
        result = result * (n - i) / (i + 1);
    }
    result as u64
}

/// Number of grade-`k` basis blades in an `n`-dimensional algebra.
#[inline]
pub fn kvector_space_dimension(n: u32, k: u32) -> u64 {
    binomial(n, k)
}

/// Rank of `id` among all IDs of the same grade, ascending.
///
/// For set bits `c1 < c2 < … < ck` this is `Σ C(cj, j)`.
pub fn id_to_index(id: u64) -> u64 {
    let mut index = 0;
    let mut rest = id;
    let mut j = 1;
    while rest != 0 {
        index += binomial(rest.trailing_zeros(), j);
        rest &= rest - 1;
        j += 1;
    }
    index
}

/// Inverse of [`id_to_index`]: the `index`-th ID of the given grade.
///
/// Greedy unranking: for `j = grade … 1`, take the largest bit position `c`
/// with `C(c, j) <= remaining`. The caller guarantees
/// `index < C(64, grade)`; use [`checked_index_to_id`] otherwise.
pub fn index_to_id(grade: u32, index: u64) -> u64 {
    debug_assert!(grade <= MAX_DIMENSION);
    let mut id = 0u64;
    let mut remaining = index;
    for j in (1..=grade).rev() {
        let mut c = j - 1;
        while c + 1 < MAX_DIMENSION && binomial(c + 1, j) <= remaining {
            c += 1;
        }
        id |= 1u64 << c;
        remaining -= binomial(c, j);
    }
    id
}

/// `(grade, index)` of a basis blade.
#[inline]
pub fn id_to_grade_index(id: u64) -> (u32, u64) {
    (grade(id), id_to_index(id))
}

/// Basis blade ID from `(grade, index)`.
#[inline]
pub fn grade_index_to_id(grade: u32, index: u64) -> u64 {
    index_to_id(grade, index)
}

/// [`index_to_id`] with range checks against an `dimension`-dimensional algebra.
pub fn checked_index_to_id(dimension: u32, grade: u32, index: u64) -> Result<u64> {
    validate_dimension(dimension)?;
    if grade > dimension {
        return Err(GaError::invalid(format!(
            "grade {grade} exceeds dimension {dimension}"
        )));
    }
    let count = binomial(dimension, grade);
    if index >= count {
        return Err(GaError::invalid(format!(
            "index {index} out of range for grade {grade} (count {count})"
        )));
    }
    Ok(index_to_id(grade, index))
}

/// Linear index of the bivector `e(i) ^ e(j)` among all bivectors.
///
/// `C(max, 2) + min`. `i == j` is a contract violation.
#[inline]
pub fn basis_bivector_index(i: u32, j: u32) -> u64 {
    debug_assert!(i != j, "basis bivector needs two distinct vectors");
    let (lo, hi) = if i < j { (i as u64, j as u64) } else { (j as u64, i as u64) };
    hi * (hi - 1) / 2 + lo
}

/// [`basis_bivector_index`] with the contract checked.
pub fn checked_basis_bivector_index(dimension: u32, i: u32, j: u32) -> Result<u64> {
    validate_dimension(dimension)?;
    if i == j {
        return Err(GaError::invalid(format!(
            "basis bivector needs two distinct vectors, got {i} twice"
        )));
    }
    if i >= dimension || j >= dimension {
        return Err(GaError::invalid(format!(
            "basis vector indices ({i}, {j}) out of range for dimension {dimension}"
        )));
    }
    Ok(basis_bivector_index(i, j))
}

/// Inverse of [`basis_bivector_index`]: `(i, j)` with `i < j`.
///
/// Solves `C(j, 2) <= index < C(j + 1, 2)` with the quadratic formula and
/// corrects for floating-point rounding.
pub fn basis_bivector_indices(index: u64) -> (u32, u32) {
    let mut hi = ((1.0 + (1.0 + 8.0 * index as f64).sqrt()) / 2.0).floor() as u64;
    while hi * (hi - 1) / 2 > index {
        hi -= 1;
    }
    while (hi + 1) * hi / 2 <= index {
        hi += 1;
    }
    let lo = index - hi * (hi - 1) / 2;
    (lo as u32, hi as u32)
}

/// [`basis_bivector_indices`] for an index that must name a bivector of a
/// `dimension`-dimensional algebra.
pub fn checked_basis_bivector_indices(dimension: u32, index: u64) -> Result<(u32, u32)> {
    validate_dimension(dimension)?;
    let count = binomial(dimension, 2);
    if index >= count {
        return Err(GaError::invalid(format!(
            "bivector index {index} out of range for dimension {dimension} (count {count})"
        )));
    }
    Ok(basis_bivector_indices(index))
}

/// All IDs of grade `k` in an `n`-dimensional algebra, ascending.
pub fn ids_of_grade(n: u32, k: u32) -> impl Iterator<Item = u64> {
    (0..binomial(n, k)).map(move |index| index_to_id(k, index))
}

/// Display name of a basis blade: `"1"`, `"e1"`, `"e1^e3"` (1-based).
pub fn blade_name(id: u64) -> String {
    if id == 0 {
        return "1".to_string();
    }
    let mut parts = Vec::with_capacity(grade(id) as usize);
    let mut rest = id;
    while rest != 0 {
        parts.push(format!("e{}", rest.trailing_zeros() + 1));
        rest &= rest - 1;
    }
    parts.join("^")
}

pub fn validate_dimension(dimension: u32) -> Result<()> {
    if dimension > MAX_DIMENSION {
        return Err(GaError::invalid(format!(
            "dimension {dimension} exceeds the maximum of {MAX_DIMENSION}"
        )));
    }
    Ok(())
}

/// Fails when `id` uses a basis vector outside an `dimension`-dimensional algebra.
pub fn validate_id(dimension: u32, id: u64) -> Result<()> {
    validate_dimension(dimension)?;
    if id & !low_mask(dimension) != 0 {
        return Err(GaError::invalid(format!(
            "basis blade {id:#b} out of range for dimension {dimension}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_small() {
        assert_eq!(binomial(0, 0), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(5, 6), 0);
        assert_eq!(binomial(10, 10), 1);
    }

    #[test]
    fn test_binomial_largest() {
        assert_eq!(binomial(64, 32), 1_832_624_140_942_590_534);
        assert_eq!(binomial(64, 1), 64);
    }

    #[test]
    fn test_index_matches_enumeration() {
        for n in 0..=10 {
            for k in 0..=n {
                let mut expected = 0;
                for id in 0..(1u64 << n) {
                    if grade(id) == k {
                        assert_eq!(id_to_index(id), expected, "id {id:#b}");
                        assert_eq!(index_to_id(k, expected), id);
                        expected += 1;
                    }
                }
                assert_eq!(expected, binomial(n, k));
            }
        }
    }

    #[test]
    fn test_unrank_high_bits() {
        let id = (1u64 << 63) | (1u64 << 40) | 1;
        assert_eq!(index_to_id(3, id_to_index(id)), id);
        assert_eq!(index_to_id(64, 0), u64::MAX);
    }

    #[test]
    fn test_bivector_index_closed_form() {
        assert_eq!(basis_bivector_index(0, 1), 0);
        assert_eq!(basis_bivector_index(1, 0), 0);
        assert_eq!(basis_bivector_index(0, 2), 1);
        assert_eq!(basis_bivector_index(1, 2), 2);
        assert_eq!(basis_bivector_index(0, 3), 3);
        for i in 0..20 {
            for j in (i + 1)..20 {
                let id = (1u64 << i) | (1u64 << j);
                assert_eq!(basis_bivector_index(i, j), id_to_index(id));
            }
        }
    }

    #[test]
    fn test_bivector_indices_inverse() {
        for index in 0..binomial(64, 2) {
            let (i, j) = basis_bivector_indices(index);
            assert!(i < j, "index {index} gave ({i}, {j})");
            assert_eq!(basis_bivector_index(i, j), index);
        }
    }

    #[test]
    fn test_checked_bivector_rejects_equal_pair() {
        assert!(checked_basis_bivector_index(4, 2, 2).is_err());
        assert!(checked_basis_bivector_index(4, 1, 4).is_err());
        assert_eq!(checked_basis_bivector_index(4, 3, 1).unwrap(), 4);
    }

    #[test]
    fn test_checked_bivector_indices_rejects_out_of_range() {
        assert_eq!(checked_basis_bivector_indices(4, 5).unwrap(), (2, 3));
        assert!(matches!(
            checked_basis_bivector_indices(4, 6),
            Err(GaError::InvalidArgument(_))
        ));
        assert!(checked_basis_bivector_indices(64, u64::MAX).is_err());
        assert!(checked_basis_bivector_indices(65, 0).is_err());
        assert!(checked_basis_bivector_indices(1, 0).is_err());
    }

    #[test]
    fn test_checked_index_to_id_ranges() {
        assert_eq!(checked_index_to_id(3, 2, 2).unwrap(), 0b110);
        assert!(checked_index_to_id(3, 2, 3).is_err());
        assert!(checked_index_to_id(3, 4, 0).is_err());
        assert!(checked_index_to_id(65, 1, 0).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id(3, 0b111).is_ok());
        assert!(validate_id(3, 0b1000).is_err());
        assert!(validate_id(64, u64::MAX).is_ok());
        assert!(validate_id(0, 0).is_ok());
        assert!(validate_id(0, 1).is_err());
    }

    #[test]
    fn test_blade_names() {
        assert_eq!(blade_name(0), "1");
        assert_eq!(blade_name(0b1), "e1");
        assert_eq!(blade_name(0b101), "e1^e3");
        assert_eq!(blade_name(1u64 << 11), "e12");
    }

    #[test]
    fn test_ids_of_grade() {
        let ids: Vec<u64> = ids_of_grade(4, 2).collect();
        assert_eq!(ids, vec![0b0011, 0b0101, 0b0110, 0b1001, 0b1010, 0b1100]);
    }

    #[test]
    fn test_low_mask_and_required_dimension() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(3), 0b111);
        assert_eq!(low_mask(64), u64::MAX);
        assert_eq!(required_dimension(0), 0);
        assert_eq!(required_dimension(0b100), 3);
        assert_eq!(required_dimension(u64::MAX), 64);
    }
}
