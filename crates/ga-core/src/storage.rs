//! Immutable multivector storage.
//!
//! A closed set of representations behind one coefficient view: iterate
//! `(id, &scalar)` pairs, query grades, test and look up terms. Storages are
//! never mutated after construction; build new ones through a
//! [`Composer`](crate::composer::Composer).

use std::collections::{BTreeMap, BTreeSet, btree_map};

use serde::{Deserialize, Serialize};

use crate::basis::{self, binomial, grade, id_to_index, index_to_id, required_dimension};
use crate::constants::MAX_DIMENSION;
use crate::error::{GaError, Result};

/// Single-grade coefficients keyed by index within the grade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KVectorStorage<T> {
    grade: u32,
    terms: BTreeMap<u64, T>,
}

impl<T> KVectorStorage<T> {
    pub fn grade(&self) -> u32 {
        self.grade
    }

    /// `index → scalar` map.
    pub fn indexed_terms(&self) -> &BTreeMap<u64, T> {
        &self.terms
    }
}

/// Per-grade coefficient maps, for multivectors with several well-populated grades.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradedStorage<T> {
    grades: BTreeMap<u32, BTreeMap<u64, T>>,
}

impl<T> GradedStorage<T> {
    pub fn grade_terms(&self, grade: u32) -> Option<&BTreeMap<u64, T>> {
        self.grades.get(&grade)
    }
}

/// Coefficients keyed directly by basis blade ID.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseStorage<T> {
    terms: BTreeMap<u64, T>,
}

impl<T> SparseStorage<T> {
    pub fn id_terms(&self) -> &BTreeMap<u64, T> {
        &self.terms
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Scalar,
    KVector,
    Graded,
    Sparse,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage<T> {
    Scalar(T),
    KVector(KVectorStorage<T>),
    Graded(GradedStorage<T>),
    Sparse(SparseStorage<T>),
}

impl<T> Storage<T> {
    /// The zero multivector (no terms).
    pub fn zero() -> Self {
        Storage::Sparse(SparseStorage {
            terms: BTreeMap::new(),
        })
    }

    pub fn scalar(value: T) -> Self {
        Storage::Scalar(value)
    }

    /// Dense vector: coefficient `i` belongs to basis vector `i`.
    pub fn vector(coefficients: Vec<T>) -> Self {
        Self::dense_kvector(1, coefficients)
    }

    /// Dense bivector in [`basis_bivector_index`](crate::basis::basis_bivector_index) order.
    pub fn bivector(coefficients: Vec<T>) -> Self {
        Self::dense_kvector(2, coefficients)
    }

    /// Dense k-vector: coefficient `i` belongs to the `i`-th grade-`k` blade.
    pub fn dense_kvector(grade: u32, coefficients: Vec<T>) -> Self {
        Self::kvector(grade, coefficients.into_iter().enumerate().map(|(i, c)| (i as u64, c)))
    }

    /// Single-grade storage from `(index, scalar)` pairs. Later duplicates win.
    pub fn kvector(grade: u32, terms: impl IntoIterator<Item = (u64, T)>) -> Self {
        Storage::KVector(KVectorStorage {
            grade,
            terms: terms.into_iter().collect(),
        })
    }

    /// Graded storage from `(grade, index, scalar)` triples.
    pub fn graded(terms: impl IntoIterator<Item = (u32, u64, T)>) -> Self {
        let mut grades: BTreeMap<u32, BTreeMap<u64, T>> = BTreeMap::new();
        for (g, index, value) in terms {
            grades.entry(g).or_default().insert(index, value);
        }
        Storage::Graded(GradedStorage { grades })
    }

    /// Sparse storage from `(id, scalar)` pairs. Later duplicates win.
    pub fn sparse(terms: impl IntoIterator<Item = (u64, T)>) -> Self {
        Storage::Sparse(SparseStorage {
            terms: terms.into_iter().collect(),
        })
    }

    /// `value * e_id`.
    pub fn basis_blade(id: u64, value: T) -> Self {
        if id == 0 {
            return Storage::Scalar(value);
        }
        Self::kvector(grade(id), [(id_to_index(id), value)])
    }

    /// [`Storage::sparse`] rejecting IDs outside an `dimension`-dimensional algebra.
    pub fn sparse_checked(
        dimension: u32,
        terms: impl IntoIterator<Item = (u64, T)>,
    ) -> Result<Self> {
        let storage = Self::sparse(terms);
        storage.validate(dimension)?;
        Ok(storage)
    }

    /// [`Storage::kvector`] rejecting indices outside the grade's range.
    pub fn kvector_checked(
        dimension: u32,
        grade: u32,
        terms: impl IntoIterator<Item = (u64, T)>,
    ) -> Result<Self> {
        let storage = Self::kvector(grade, terms);
        storage.validate(dimension)?;
        Ok(storage)
    }

    /// Dense vector with exactly `dimension` coefficients.
    pub fn vector_checked(dimension: u32, coefficients: Vec<T>) -> Result<Self> {
        if coefficients.len() != dimension as usize {
            return Err(GaError::invalid(format!(
                "vector needs {dimension} coefficients, got {}",
                coefficients.len()
            )));
        }
        let storage = Self::vector(coefficients);
        storage.validate(dimension)?;
        Ok(storage)
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Storage::Scalar(_) => StorageKind::Scalar,
            Storage::KVector(_) => StorageKind::KVector,
            Storage::Graded(_) => StorageKind::Graded,
            Storage::Sparse(_) => StorageKind::Sparse,
        }
    }

    /// `(id, &scalar)` pairs. Order is ascending by ID for sparse storage and
    /// by `(grade, index)` for the grade-keyed variants.
    pub fn terms(&self) -> Terms<'_, T> {
        match self {
            Storage::Scalar(value) => Terms::Scalar(Some(value)),
            Storage::KVector(k) => Terms::KVector {
                grade: k.grade,
                inner: k.terms.iter(),
            },
            Storage::Graded(g) => Terms::Graded {
                outer: g.grades.iter(),
                current: None,
            },
            Storage::Sparse(s) => Terms::Sparse(s.terms.iter()),
        }
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        match self {
            Storage::Scalar(value) => (id == 0).then_some(value),
            Storage::KVector(k) => {
                if grade(id) == k.grade {
                    k.terms.get(&id_to_index(id))
                } else {
                    None
                }
            }
            Storage::Graded(g) => g.grades.get(&grade(id))?.get(&id_to_index(id)),
            Storage::Sparse(s) => s.terms.get(&id),
        }
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    pub fn term_count(&self) -> usize {
        match self {
            Storage::Scalar(_) => 1,
            Storage::KVector(k) => k.terms.len(),
            Storage::Graded(g) => g.grades.values().map(BTreeMap::len).sum(),
            Storage::Sparse(s) => s.terms.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term_count() == 0
    }

    /// Grades with at least one stored term.
    pub fn grades(&self) -> BTreeSet<u32> {
        match self {
            Storage::Scalar(_) => BTreeSet::from([0]),
            Storage::KVector(k) if k.terms.is_empty() => BTreeSet::new(),
            Storage::KVector(k) => BTreeSet::from([k.grade]),
            Storage::Graded(g) => g
                .grades
                .iter()
                .filter(|(_, terms)| !terms.is_empty())
                .map(|(g, _)| *g)
                .collect(),
            Storage::Sparse(s) => s.terms.keys().map(|id| grade(*id)).collect(),
        }
    }

    pub fn max_grade(&self) -> Option<u32> {
        self.grades().last().copied()
    }

    /// Single populated grade, if any.
    pub fn single_grade(&self) -> Option<u32> {
        let grades = self.grades();
        if grades.len() == 1 { grades.first().copied() } else { None }
    }

    /// Largest stored basis blade ID (0 when empty).
    pub fn max_id(&self) -> u64 {
        self.terms().map(|(id, _)| id).max().unwrap_or(0)
    }

    /// Number of basis vectors the stored IDs require.
    pub fn required_dimension(&self) -> u32 {
        required_dimension(self.max_id())
    }

    /// Fails when any term lies outside an `dimension`-dimensional algebra.
    ///
    /// Grade-keyed indices are range-checked before they are unranked.
    pub fn validate(&self, dimension: u32) -> Result<()> {
        basis::validate_dimension(dimension)?;
        let check_indices = |g: u32, terms: &BTreeMap<u64, T>| -> Result<()> {
            match terms.keys().next_back() {
                Some(&last) if last >= binomial(dimension, g) => {
                    if g > MAX_DIMENSION || last >= binomial(MAX_DIMENSION, g) {
                        return Err(GaError::invalid(format!(
                            "grade-{g} index {last} out of range for any dimension"
                        )));
                    }
                    Err(GaError::DimensionMismatch {
                        expected: dimension,
                        found: required_dimension(index_to_id(g, last)),
                    })
                }
                _ => Ok(()),
            }
        };
        match self {
            Storage::Scalar(_) => Ok(()),
            Storage::KVector(k) => check_indices(k.grade, &k.terms),
            Storage::Graded(g) => g
                .grades
                .iter()
                .try_for_each(|(g, terms)| check_indices(*g, terms)),
            Storage::Sparse(s) => match s.terms.keys().next_back() {
                Some(&id) if required_dimension(id) > dimension => {
                    Err(GaError::DimensionMismatch {
                        expected: dimension,
                        found: required_dimension(id),
                    })
                }
                _ => Ok(()),
            },
        }
    }
}

impl<T: Clone> Storage<T> {
    /// Owned `id → scalar` map of all terms.
    pub fn to_sparse_map(&self) -> BTreeMap<u64, T> {
        self.terms().map(|(id, v)| (id, v.clone())).collect()
    }

    /// Same terms in sparse representation.
    pub fn to_sparse(&self) -> Self {
        match self {
            Storage::Sparse(_) => self.clone(),
            _ => Storage::Sparse(SparseStorage {
                terms: self.to_sparse_map(),
            }),
        }
    }
}

/// Iterator over the `(id, &scalar)` pairs of a [`Storage`].
pub enum Terms<'a, T> {
    Scalar(Option<&'a T>),
    KVector {
        grade: u32,
        inner: btree_map::Iter<'a, u64, T>,
    },
    Graded {
        outer: btree_map::Iter<'a, u32, BTreeMap<u64, T>>,
        current: Option<(u32, btree_map::Iter<'a, u64, T>)>,
    },
    Sparse(btree_map::Iter<'a, u64, T>),
}

impl<'a, T> Iterator for Terms<'a, T> {
    type Item = (u64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Terms::Scalar(value) => value.take().map(|v| (0, v)),
            Terms::KVector { grade, inner } => inner
                .next()
                .map(|(index, v)| (index_to_id(*grade, *index), v)),
            Terms::Graded { outer, current } => loop {
                if let Some((g, inner)) = current
                    && let Some((index, v)) = inner.next()
                {
                    return Some((index_to_id(*g, *index), v));
                }
                let (g, terms) = outer.next()?;
                *current = Some((*g, terms.iter()));
            },
            Terms::Sparse(inner) => inner.next().map(|(id, v)| (*id, v)),
        }
    }
}
