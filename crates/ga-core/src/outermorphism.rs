//! Outermorphisms: linear maps on vectors extended to every grade.
//!
//! A map is stored as the images of the domain basis vectors. The image of a
//! blade `e_i ^ e_j ^ ...` is `f(e_i) ^ f(e_j) ^ ...`; multivectors map term
//! by term through [`GbtOutermorphism`].

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::basis::{grade, low_mask, validate_dimension, validate_id};
use crate::composer::Composer;
use crate::error::{GaError, Result};
use crate::gbt::{GbtOutermorphism, wedge_terms};
use crate::scalar::ScalarProcessor;
use crate::storage::Storage;

#[derive(Clone, Debug, PartialEq)]
pub struct Outermorphism<T> {
    domain_dimension: u32,
    target_dimension: u32,
    /// Image of basis vector `i`, keyed by target blade ID (grade 1 only).
    images: Vec<BTreeMap<u64, T>>,
}

impl<T: Clone + Debug> Outermorphism<T> {
    /// Map with `images[i]` as the image of basis vector `i`.
    ///
    /// Needs exactly `domain_dimension` images, each a vector (or zero) of the
    /// target space.
    pub fn new(
        domain_dimension: u32,
        target_dimension: u32,
        images: Vec<Storage<T>>,
    ) -> Result<Self> {
        validate_dimension(domain_dimension)?;
        validate_dimension(target_dimension)?;
        if images.len() != domain_dimension as usize {
            return Err(GaError::invalid(format!(
                "outermorphism needs {domain_dimension} basis vector images, got {}",
                images.len()
            )));
        }
        for (i, image) in images.iter().enumerate() {
            image.validate(target_dimension)?;
            if let Some(g) = image.grades().into_iter().find(|g| *g != 1) {
                return Err(GaError::invalid(format!(
                    "image of e{} has a grade-{g} part; images must be vectors",
                    i + 1
                )));
            }
        }
        Ok(Self {
            domain_dimension,
            target_dimension,
            images: images.iter().map(Storage::to_sparse_map).collect(),
        })
    }

    pub fn identity<P: ScalarProcessor<Scalar = T>>(processor: &P, dimension: u32) -> Result<Self> {
        validate_dimension(dimension)?;
        let images = (0..dimension)
            .map(|i| BTreeMap::from([(1u64 << i, processor.one())]))
            .collect();
        Ok(Self {
            domain_dimension: dimension,
            target_dimension: dimension,
            images,
        })
    }

    /// Map whose matrix has `columns[i]` as the coordinates of the image of
    /// basis vector `i`. Zero coordinates are dropped.
    pub fn from_columns<P: ScalarProcessor<Scalar = T>>(
        processor: &P,
        target_dimension: u32,
        columns: Vec<Vec<T>>,
    ) -> Result<Self> {
        let domain_dimension = columns.len() as u32;
        let images = columns
            .into_iter()
            .map(|column| {
                let storage = Storage::vector_checked(target_dimension, column)?;
                let mut composer = Composer::from_storage(processor, &storage);
                composer.remove_zero_terms();
                composer.into_kvector_storage(1)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(domain_dimension, target_dimension, images)
    }

    pub fn domain_dimension(&self) -> u32 {
        self.domain_dimension
    }

    pub fn target_dimension(&self) -> u32 {
        self.target_dimension
    }

    /// Image of basis vector `i` as a vector storage.
    pub fn image(&self, i: u32) -> Result<Storage<T>> {
        let terms = self.images.get(i as usize).ok_or_else(|| {
            GaError::invalid(format!(
                "basis vector {i} out of range for domain dimension {}",
                self.domain_dimension
            ))
        })?;
        Ok(Storage::sparse(terms.clone()))
    }

    /// Row-major `target × domain` matrix.
    pub fn matrix<P: ScalarProcessor<Scalar = T>>(&self, processor: &P) -> Vec<Vec<T>> {
        (0..self.target_dimension)
            .map(|row| {
                self.images
                    .iter()
                    .map(|image| {
                        image
                            .get(&(1u64 << row))
                            .cloned()
                            .unwrap_or_else(|| processor.zero())
                    })
                    .collect()
            })
            .collect()
    }

    fn blade_image<P: ScalarProcessor<Scalar = T>>(
        &self,
        processor: &P,
        id: u64,
    ) -> BTreeMap<u64, T> {
        let mut running = BTreeMap::from([(0u64, processor.one())]);
        let mut rest = id;
        while rest != 0 && !running.is_empty() {
            let i = rest.trailing_zeros() as usize;
            running = wedge_terms(processor, &running, &self.images[i]);
            rest &= rest - 1;
        }
        running
    }

    pub fn map_basis_blade<P: ScalarProcessor<Scalar = T>>(
        &self,
        processor: &P,
        id: u64,
    ) -> Result<Storage<T>> {
        validate_id(self.domain_dimension, id)?;
        Ok(Composer::from_terms(processor, self.blade_image(processor, id)).into_storage())
    }

    /// Image of a vector: `sum v_i f(e_i)`. Fails for non-vector input.
    pub fn map_vector<P: ScalarProcessor<Scalar = T>>(
        &self,
        processor: &P,
        vector: &Storage<T>,
    ) -> Result<Storage<T>> {
        vector.validate(self.domain_dimension)?;
        let mut composer = Composer::new(processor);
        for (id, value) in vector.terms() {
            if grade(id) != 1 {
                return Err(GaError::invalid(format!(
                    "map_vector given a grade-{} term",
                    grade(id)
                )));
            }
            let i = id.trailing_zeros() as usize;
            composer.add_scaled_map(&self.images[i], value);
        }
        Ok(composer.into_storage())
    }

    /// Image of an arbitrary multivector.
    pub fn map<P: ScalarProcessor<Scalar = T>>(
        &self,
        processor: &P,
        mv: &Storage<T>,
    ) -> Result<Storage<T>> {
        mv.validate(self.domain_dimension)?;
        let (composer, _) = GbtOutermorphism::new(processor, &self.images, mv).run();
        Ok(composer.into_storage())
    }

    /// Image of a grade-`k` multivector, returned as a k-vector storage.
    pub fn map_kvector<P: ScalarProcessor<Scalar = T>>(
        &self,
        processor: &P,
        kvector: &Storage<T>,
        grade_k: u32,
    ) -> Result<Storage<T>> {
        if let Some(g) = kvector.grades().into_iter().find(|g| *g != grade_k) {
            return Err(GaError::invalid(format!(
                "map_kvector expected grade {grade_k}, found a grade-{g} term"
            )));
        }
        kvector.validate(self.domain_dimension)?;
        let (composer, _) = GbtOutermorphism::new(processor, &self.images, kvector).run();
        composer.into_kvector_storage(grade_k)
    }

    /// `self ∘ inner`: applies `inner` first.
    pub fn compose<P: ScalarProcessor<Scalar = T>>(
        &self,
        processor: &P,
        inner: &Self,
    ) -> Result<Self> {
        if inner.target_dimension != self.domain_dimension {
            return Err(GaError::DimensionMismatch {
                expected: self.domain_dimension,
                found: inner.target_dimension,
            });
        }
        let images = inner
            .images
            .iter()
            .map(|image| self.map_vector(processor, &Storage::sparse(image.clone())))
            .collect::<Result<Vec<_>>>()?;
        Self::new(inner.domain_dimension, self.target_dimension, images)
    }

    /// Coefficient of the image of the domain pseudoscalar. Square maps only.
    pub fn determinant<P: ScalarProcessor<Scalar = T>>(&self, processor: &P) -> Result<T> {
        self.require_square()?;
        let pseudo = low_mask(self.domain_dimension);
        Ok(self
            .blade_image(processor, pseudo)
            .remove(&pseudo)
            .unwrap_or_else(|| processor.zero()))
    }

    /// Inverse map by Gauss-Jordan elimination. Fails for singular maps.
    pub fn inverse<P: ScalarProcessor<Scalar = T>>(&self, processor: &P) -> Result<Self> {
        self.require_square()?;
        let inverse = invert_matrix(processor, self.matrix(processor))?;
        let n = self.domain_dimension as usize;
        let columns = (0..n)
            .map(|col| inverse.iter().map(|row| row[col].clone()).collect())
            .collect();
        tracing::debug!(dimension = self.domain_dimension, "inverted outermorphism");
        Self::from_columns(processor, self.target_dimension, columns)
    }

    fn require_square(&self) -> Result<()> {
        if self.domain_dimension != self.target_dimension {
            return Err(GaError::DimensionMismatch {
                expected: self.domain_dimension,
                found: self.target_dimension,
            });
        }
        Ok(())
    }
}

/// Inverse of a square row-major matrix.
///
/// Pivots on the largest entry of each column when the processor reports
/// magnitudes, otherwise on the first nonzero entry.
pub fn invert_matrix<P: ScalarProcessor>(
    processor: &P,
    matrix: Vec<Vec<P::Scalar>>,
) -> Result<Vec<Vec<P::Scalar>>> {
    let n = matrix.len();
    if matrix.iter().any(|row| row.len() != n) {
        return Err(GaError::invalid("matrix is not square"));
    }
    let p = processor;
    let mut a = matrix;
    let mut inv: Vec<Vec<P::Scalar>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { p.one() } else { p.zero() }).collect())
        .collect();

    for col in 0..n {
        let pivot = select_pivot(p, &a, col)
            .ok_or_else(|| GaError::Singular(format!("no pivot in column {col}")))?;
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let factor = a[col][col].clone();
        for j in 0..n {
            a[col][j] = p.divide(&a[col][j], &factor)?;
            inv[col][j] = p.divide(&inv[col][j], &factor)?;
        }
        for r in 0..n {
            if r == col || p.is_zero(&a[r][col]) {
                continue;
            }
            let f = a[r][col].clone();
            for j in 0..n {
                a[r][j] = p.subtract(&a[r][j], &p.times(&f, &a[col][j]));
                inv[r][j] = p.subtract(&inv[r][j], &p.times(&f, &inv[col][j]));
            }
        }
    }
    Ok(inv)
}

fn select_pivot<P: ScalarProcessor>(p: &P, a: &[Vec<P::Scalar>], col: usize) -> Option<usize> {
    let mut nonzero = (col..a.len()).filter(|r| !p.is_zero(&a[*r][col]));
    let first = nonzero.next()?;
    let Some(mut best) = p.magnitude(&a[first][col]) else {
        return Some(first);
    };
    let mut pivot = first;
    for r in nonzero {
        if let Some(m) = p.magnitude(&a[r][col])
            && m > best
        {
            best = m;
            pivot = r;
        }
    }
    Some(pivot)
}
